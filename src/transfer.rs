use core::cell::{Ref, RefCell};

use atomic::{Atomic, Ordering};
use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

use crate::Event;

pub const EVENTS_HISTORY_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::NoUninit)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferState {
    Idle,
    Open,
}

/// Per-instance record of whether a bus transaction is currently open, plus
/// the last few events handed to the callback.
pub struct TransferTracker {
    state: Atomic<TransferState>,
    history: Mutex<RefCell<Deque<Event, EVENTS_HISTORY_SIZE>>>,
}

impl TransferTracker {
    pub const fn new() -> Self {
        Self {
            state: Atomic::new(TransferState::Idle),
            history: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub fn get_state(&self) -> TransferState {
        self.state.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.get_state(), TransferState::Open)
    }

    pub fn open(&self) {
        self.state.store(TransferState::Open, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.state.store(TransferState::Idle, Ordering::SeqCst);
    }

    /// Back to the unbound state: idle, empty history.
    pub fn reset(&self) {
        self.close();
        critical_section::with(|cs| self.history.borrow_ref_mut(cs).clear());
    }

    pub fn record(&self, event: Event) {
        critical_section::with(|cs| {
            let mut h = self.history.borrow_ref_mut(cs);
            if h.is_full() {
                h.pop_front();
            }
            // Cannot fail, a slot was just freed.
            let _ = h.push_back(event);
        });
    }

    pub fn get_history<'cs>(
        &'cs self,
        cs: CriticalSection<'cs>,
    ) -> Ref<'cs, Deque<Event, EVENTS_HISTORY_SIZE>> {
        self.history.borrow_ref(cs)
    }
}

impl Default for TransferTracker {
    fn default() -> Self {
        Self::new()
    }
}
