//! Interrupt-driven I2C slave engine for parts with two DesignWare-style bus
//! controllers.
//!
//! Each controller interrupt is decoded into [`Event::Receive`],
//! [`Event::Request`] and [`Event::Finish`] and handed to an
//! [`EventHandler`]. The [`Mailbox`] handler implements a one-byte
//! selection / two-byte measurement exchange between the interrupt and the
//! application loop. The interrupt side never takes a lock.
//!
//! ```ignore
//! static MAILBOX: Mailbox = Mailbox::new();
//! static REGISTRY: Registry<'static, Board> = Registry::new();
//!
//! let mut slave = I2cSlave::new(&REGISTRY, nvic, entry_points!(REGISTRY));
//! slave.start(InstanceId::I2c0, i2c0, &SlaveConfig::new(0x42), &MAILBOX);
//!
//! loop {
//!     if let Some(work) = MAILBOX.pending_work() {
//!         // Dropped if the master sent a newer selection meanwhile.
//!         MAILBOX.complete(work, measure(work.group(), work.item()));
//!     }
//! }
//! ```
//!
//! # Targets
//!
//! Shared state lives in [`atomic::Atomic`] cells, which need native 8 and
//! 16-bit atomic compare-and-swap. Supported targets are Armv7-M and later
//! (`thumbv7m`, `thumbv7em`, `thumbv8m.main`) and the host. Armv6-M parts such
//! as the RP2040's Cortex-M0+ only have atomic load/store and are rejected at
//! compile time. [`I2C0_IRQ`] and [`INTR_MASK_RESET`] follow the RP2040
//! register map, so a board on another DesignWare part maps its own interrupt
//! lines in its [`InterruptController`].
#![cfg_attr(not(test), no_std)]

#[cfg(all(target_arch = "arm", not(target_has_atomic = "8")))]
compile_error!("irq-i2c-slave needs atomic compare-and-swap: build for Armv7-M or later");

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod context;
mod hal;
mod interrupts;
mod mailbox;
mod registry;
mod slave;
mod status;
mod transfer;

#[cfg(test)]
mod test_support;

pub use context::IrqContext;
pub use hal::{BusController, EntryPoint, InterruptController, IrqLine, I2C0_IRQ};
pub use interrupts::{handle_interrupt, EventHandler};
pub use mailbox::{encode_measurement, Mailbox, Selection, Work, MEASUREMENT_FRAME_LEN};
pub use registry::{Registry, Rejected};
pub use slave::{is_reserved_address, I2cSlave, SlaveConfig, DEFAULT_FREQUENCY, MAX_ADDRESS};
pub use status::{InterruptStatus, FINISH_CONDITIONS, INTR_MASK_RESET, SLAVE_INTERRUPTS};
pub use transfer::{TransferState, TransferTracker, EVENTS_HISTORY_SIZE};

/// Number of bus controllers on the part.
pub const INSTANCE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstanceId {
    I2c0,
    I2c1,
}

impl InstanceId {
    pub const ALL: [InstanceId; INSTANCE_COUNT] = [InstanceId::I2c0, InstanceId::I2c1];

    pub const fn index(self) -> usize {
        match self {
            InstanceId::I2c0 => 0,
            InstanceId::I2c1 => 1,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(InstanceId::I2c0),
            1 => Some(InstanceId::I2c1),
            _ => None,
        }
    }

    pub const fn irq_line(self) -> IrqLine {
        IrqLine::of(self)
    }
}

/// Protocol event handed to the [`EventHandler`] of a bus instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A data byte written by the master is waiting in the receive FIFO.
    Receive,
    /// The master reads from us; the clock is stretched until bytes are
    /// written to the transmit FIFO.
    Request,
    /// The open transaction ended (stop, restart or transmit abort).
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    AlreadyBound,
    NotBound,
}
