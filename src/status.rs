use bitflags::bitflags;

bitflags! {
    /// Interrupt status / mask bits of the bus controller (`IC_INTR_STAT`,
    /// `IC_INTR_MASK` and `IC_RAW_INTR_STAT` share this layout).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptStatus: u32 {
        const RX_UNDER = 1 << 0;
        const RX_OVER = 1 << 1;
        /// Receive FIFO reached its threshold, a data byte is available.
        const RX_FULL = 1 << 2;
        const TX_OVER = 1 << 3;
        const TX_EMPTY = 1 << 4;
        /// A master wants to read from this slave.
        const RD_REQ = 1 << 5;
        const TX_ABRT = 1 << 6;
        const RX_DONE = 1 << 7;
        const ACTIVITY = 1 << 8;
        const STOP_DET = 1 << 9;
        const START_DET = 1 << 10;
        const GEN_CALL = 1 << 11;
        const RESTART_DET = 1 << 12;
    }
}

/// Conditions unmasked while a slave is running. TX_EMPTY and GEN_CALL stay
/// masked, nothing consumes them.
pub const SLAVE_INTERRUPTS: InterruptStatus = InterruptStatus::RX_FULL
    .union(InterruptStatus::RD_REQ)
    .union(InterruptStatus::TX_ABRT)
    .union(InterruptStatus::STOP_DET)
    .union(InterruptStatus::START_DET);

/// Conditions that close an open transfer.
pub const FINISH_CONDITIONS: InterruptStatus = InterruptStatus::TX_ABRT
    .union(InterruptStatus::START_DET)
    .union(InterruptStatus::STOP_DET);

/// Power-on value of the interrupt mask register.
pub const INTR_MASK_RESET: InterruptStatus = InterruptStatus::from_bits_retain(0x8ff);

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptStatus({=u32:#x})", self.bits())
    }
}
