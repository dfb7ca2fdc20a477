use atomic::{Atomic, Ordering};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

use crate::{context::IrqContext, hal::BusController, interrupts::EventHandler, Event};

/// Number of bytes sent in answer to a read request.
pub const MEASUREMENT_FRAME_LEN: usize = 2;

/// Device group and item addressed by the master, packed in one byte: group in
/// the high nibble, item in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::NoUninit)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Selection(u8);

impl Selection {
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub const fn new(group: u8, item: u8) -> Self {
        Self(((group & 0xf) << 4) | (item & 0xf))
    }

    pub const fn group(self) -> u8 {
        (self.0 >> 4) & 0xf
    }

    pub const fn item(self) -> u8 {
        self.0 & 0xf
    }

    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

/// Response frame for `measurement`: high nibble of the low byte first, then
/// the low nibble. Only 8 of the 16 bits reach the master.
pub const fn encode_measurement(measurement: u16) -> [u8; MEASUREMENT_FRAME_LEN] {
    [
        ((measurement >> 4) & 0xf) as u8,
        (measurement & 0xf) as u8,
    ]
}

/// A selection handed to the application, to be answered through
/// [`Mailbox::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Work {
    selection: Selection,
    sequence: u16,
}

impl Work {
    pub const fn selection(self) -> Selection {
        self.selection
    }

    pub const fn group(self) -> u8 {
        self.selection.group()
    }

    pub const fn item(self) -> u8 {
        self.selection.item()
    }
}

/// State shared between the I2C interrupt and the application loop.
///
/// Every field has exactly one writer:
///
/// | field          | written by                               | read by     |
/// |----------------|------------------------------------------|-------------|
/// | selection      | interrupt (`Receive`)                    | application |
/// | sequence       | interrupt (`Receive`)                    | application |
/// | measurement    | application (interrupt resets it to 0)   | interrupt (`Request`) |
/// | work pending   | set by interrupt, cleared by application | application |
///
/// The pending flag is stored with release ordering after the data it
/// guards and loaded with acquire ordering before that data is read, on
/// both sides. The application only clears it through [`Mailbox::complete`],
/// which drops the answer if a newer selection arrived in the meantime.
pub struct Mailbox {
    selection: Atomic<Selection>,
    sequence: Atomic<u16>,
    measurement: Atomic<u16>,
    work_pending: Atomic<bool>,
    work_signal: Signal<CriticalSectionRawMutex, Selection>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            selection: Atomic::new(Selection(0)),
            sequence: Atomic::new(0),
            measurement: Atomic::new(0),
            work_pending: Atomic::new(false),
            work_signal: Signal::new(),
        }
    }

    /// Publishes a new selection received from the master and asks the
    /// application for a fresh measurement.
    pub fn record_selection(&self, _cx: &IrqContext, byte: u8) -> Selection {
        let selection = Selection::from_byte(byte);

        // Single writer, so no read-modify-write is needed.
        let sequence = self.sequence.load(Ordering::Relaxed).wrapping_add(1);
        self.selection.store(selection, Ordering::Relaxed);
        self.sequence.store(sequence, Ordering::Relaxed);
        self.measurement.store(0, Ordering::Relaxed);
        self.work_pending.store(true, Ordering::Release);
        self.work_signal.signal(selection);

        selection
    }

    /// Bytes to answer a read request with. A request arriving before the
    /// application produced a measurement answers zero.
    pub fn measurement_frame(&self, _cx: &IrqContext) -> [u8; MEASUREMENT_FRAME_LEN] {
        encode_measurement(self.measurement.load(Ordering::Acquire))
    }

    pub fn work_pending(&self) -> bool {
        self.work_pending.load(Ordering::Acquire)
    }

    pub fn selection(&self) -> Selection {
        self.selection.load(Ordering::Acquire)
    }

    pub fn selected_group(&self) -> u8 {
        self.selection().group()
    }

    pub fn selected_item(&self) -> u8 {
        self.selection().item()
    }

    pub fn measurement(&self) -> u16 {
        self.measurement.load(Ordering::Acquire)
    }

    /// Overwrites the measurement without touching the pending flag. The
    /// next received selection resets it to 0.
    pub fn set_measurement(&self, measurement: u16) {
        self.measurement.store(measurement, Ordering::Release);
    }

    /// The selection waiting for a measurement, if any. The flag stays set
    /// until the returned work is completed.
    pub fn pending_work(&self) -> Option<Work> {
        critical_section::with(|_| {
            if self.work_pending() {
                Some(Work {
                    selection: self.selection.load(Ordering::Relaxed),
                    sequence: self.sequence.load(Ordering::Relaxed),
                })
            } else {
                None
            }
        })
    }

    /// Publishes `measurement` as the answer to `work` and clears the pending
    /// flag.
    ///
    /// Returns `false` and changes nothing if the master sent another
    /// selection since `work` was handed out, including a repeat of the same
    /// byte. That selection stays pending.
    pub fn complete(&self, work: Work, measurement: u16) -> bool {
        let current = critical_section::with(|_| {
            if !self.work_pending() || self.sequence.load(Ordering::Relaxed) != work.sequence {
                return false;
            }

            self.measurement.store(measurement, Ordering::Release);
            self.work_pending.store(false, Ordering::Release);
            self.work_signal.reset();
            true
        });

        if !current {
            debug!("dropping stale measurement for {}", work.selection);
        }

        current
    }

    /// Waits until a selection is pending and returns it.
    pub async fn wait_work(&self) -> Work {
        loop {
            if let Some(work) = self.pending_work() {
                return work;
            }
            self.work_signal.wait().await;
        }
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BusController> EventHandler<B> for Mailbox {
    fn on_event(&self, cx: &IrqContext, bus: &mut B, event: Event) {
        match event {
            Event::Receive => {
                let selection = self.record_selection(cx, bus.read_byte());
                trace!(
                    "selected group {} item {}",
                    selection.group(),
                    selection.item()
                );
            }
            Event::Request => {
                for byte in self.measurement_frame(cx) {
                    bus.write_byte(byte);
                }
            }
            Event::Finish => {}
        }
    }
}
