use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::{
    hal::BusController,
    interrupts::{handle_interrupt, EventHandler},
    transfer::{TransferTracker, EVENTS_HISTORY_SIZE},
    Error, Event, InstanceId, INSTANCE_COUNT,
};

struct Binding<'h, B> {
    bus: B,
    handler: &'h dyn EventHandler<B>,
}

struct Slot<'h, B> {
    binding: Mutex<RefCell<Option<Binding<'h, B>>>>,
    tracker: TransferTracker,
}

impl<'h, B> Slot<'h, B> {
    const fn new() -> Self {
        Self {
            binding: Mutex::new(RefCell::new(None)),
            tracker: TransferTracker::new(),
        }
    }
}

/// A bus controller refused by [`Registry::bind`], handed back to the caller.
#[derive(Debug)]
pub struct Rejected<B> {
    pub error: Error,
    pub bus: B,
}

/// One slot per bus controller instance, each binding the controller to its
/// transfer tracker and its event handler.
///
/// Meant to live in a `static` shared by the interrupt entry points and the
/// setup code. The interrupt of an instance must only be enabled while its
/// slot is bound.
pub struct Registry<'h, B: BusController> {
    slots: [Slot<'h, B>; INSTANCE_COUNT],
}

impl<'h, B: BusController> Registry<'h, B> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::new(), Slot::new()],
        }
    }

    fn slot(&self, id: InstanceId) -> &Slot<'h, B> {
        &self.slots[id.index()]
    }

    pub fn bind(
        &self,
        id: InstanceId,
        bus: B,
        handler: &'h dyn EventHandler<B>,
    ) -> Result<(), Rejected<B>> {
        let slot = self.slot(id);

        critical_section::with(|cs| {
            let mut binding = slot.binding.borrow_ref_mut(cs);
            if binding.is_some() {
                return Err(Rejected {
                    error: Error::AlreadyBound,
                    bus,
                });
            }

            slot.tracker.reset();
            *binding = Some(Binding { bus, handler });
            Ok(())
        })
    }

    /// Returns the bus controller of a bound slot and leaves it unbound.
    pub fn unbind(&self, id: InstanceId) -> Result<B, Error> {
        let slot = self.slot(id);

        critical_section::with(|cs| {
            let binding = slot.binding.borrow_ref_mut(cs).take();
            slot.tracker.reset();
            binding.map(|b| b.bus).ok_or(Error::NotBound)
        })
    }

    pub fn is_bound(&self, id: InstanceId) -> bool {
        critical_section::with(|cs| self.slot(id).binding.borrow_ref(cs).is_some())
    }

    pub fn is_transfer_open(&self, id: InstanceId) -> bool {
        self.slot(id).tracker.is_open()
    }

    /// Runs `f` on the bus controller of a bound slot, with interrupts held off.
    pub fn with_bus<R>(&self, id: InstanceId, f: impl FnOnce(&mut B) -> R) -> Result<R, Error> {
        critical_section::with(|cs| {
            let mut binding = self.slot(id).binding.borrow_ref_mut(cs);
            binding
                .as_mut()
                .map(|b| f(&mut b.bus))
                .ok_or(Error::NotBound)
        })
    }

    /// Events handed to the handler of `id` since it was bound, oldest first.
    pub fn recent_events(&self, id: InstanceId) -> Vec<Event, EVENTS_HISTORY_SIZE> {
        critical_section::with(|cs| {
            self.slot(id)
                .tracker
                .get_history(cs)
                .iter()
                .copied()
                .collect()
        })
    }

    /// Interrupt service entry point of instance `id`.
    ///
    /// # Panics
    ///
    /// If the slot is unbound: the interrupt must never be enabled before
    /// binding.
    pub fn dispatch(&self, id: InstanceId) {
        let slot = self.slot(id);

        critical_section::with(|cs| {
            let mut binding = slot.binding.borrow_ref_mut(cs);
            match binding.as_mut() {
                Some(Binding { bus, handler }) => handle_interrupt(bus, *handler, &slot.tracker),
                None => panic!("Interrupt dispatched on unbound {:?}", id),
            }
        })
    }
}

impl<'h, B: BusController> Default for Registry<'h, B> {
    fn default() -> Self {
        Self::new()
    }
}
