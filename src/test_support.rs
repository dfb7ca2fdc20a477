use std::collections::VecDeque;

use crate::{
    context::IrqContext, hal::BusController, interrupts::EventHandler, status::InterruptStatus,
    Event,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Setup(u32),
    ClearTxAbort,
    ClearStartDetected,
    ClearStopDetected,
    ClearReadRequest,
    ReadByte(u8),
    WriteByte(u8),
    SlaveMode(Option<u8>),
    Mask(InterruptStatus),
    Handled(Event),
}

/// Bus controller double recording every register operation in order.
#[derive(Debug)]
pub struct FakeBus {
    pub status: InterruptStatus,
    pub rx: VecDeque<u8>,
    pub ops: Vec<Op>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            status: InterruptStatus::empty(),
            rx: VecDeque::new(),
            ops: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: InterruptStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_rx(mut self, bytes: &[u8]) -> Self {
        self.push_rx(bytes);
        self
    }

    pub fn set_status(&mut self, status: InterruptStatus) {
        self.status = status;
    }

    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|o| **o == op).count()
    }

    fn clear(&mut self, flag: InterruptStatus, op: Op) {
        self.status.remove(flag);
        self.ops.push(op);
    }
}

impl BusController for FakeBus {
    fn setup(&mut self, frequency: u32) {
        self.ops.push(Op::Setup(frequency));
    }

    fn interrupt_status(&self) -> InterruptStatus {
        self.status
    }

    fn clear_tx_abort(&mut self) {
        self.clear(InterruptStatus::TX_ABRT, Op::ClearTxAbort);
    }

    fn clear_start_detected(&mut self) {
        self.clear(InterruptStatus::START_DET, Op::ClearStartDetected);
    }

    fn clear_stop_detected(&mut self) {
        self.clear(InterruptStatus::STOP_DET, Op::ClearStopDetected);
    }

    fn clear_read_request(&mut self) {
        self.clear(InterruptStatus::RD_REQ, Op::ClearReadRequest);
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.rx.pop_front().unwrap_or(0);
        if self.rx.is_empty() {
            self.status.remove(InterruptStatus::RX_FULL);
        }
        self.ops.push(Op::ReadByte(byte));
        byte
    }

    fn write_byte(&mut self, byte: u8) {
        self.ops.push(Op::WriteByte(byte));
    }

    fn set_slave_mode(&mut self, address: Option<u8>) {
        self.ops.push(Op::SlaveMode(address));
    }

    fn set_interrupt_mask(&mut self, mask: InterruptStatus) {
        self.ops.push(Op::Mask(mask));
    }
}

/// Logs each event into the bus and drains one byte on `Receive`.
pub struct Recorder;

impl EventHandler<FakeBus> for Recorder {
    fn on_event(&self, _cx: &IrqContext, bus: &mut FakeBus, event: Event) {
        bus.ops.push(Op::Handled(event));
        if event == Event::Receive {
            bus.read_byte();
        }
    }
}
