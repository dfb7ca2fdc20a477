#![allow(dead_code)]

use std::collections::VecDeque;

use irq_i2c_slave::{BusController, EntryPoint, InterruptController, InterruptStatus, IrqLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Setup(u32),
    ClearTxAbort,
    ClearStartDetected,
    ClearStopDetected,
    ClearReadRequest,
    ReadByte(u8),
    WriteByte(u8),
    SlaveMode(Option<u8>),
    Mask(InterruptStatus),
}

/// Register-level double of a bus controller. Clearing a condition drops its
/// status bit, draining the receive FIFO drops RX_FULL.
#[derive(Debug)]
pub struct FakeBus {
    status: InterruptStatus,
    rx: VecDeque<u8>,
    pub ops: Vec<BusOp>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            status: InterruptStatus::empty(),
            rx: VecDeque::new(),
            ops: Vec::new(),
        }
    }

    /// Latches `status`, plus RX_FULL when `bytes` is not empty.
    pub fn raise(&mut self, status: InterruptStatus, bytes: &[u8]) {
        self.status |= status;
        self.rx.extend(bytes.iter().copied());
        if !self.rx.is_empty() {
            self.status |= InterruptStatus::RX_FULL;
        }
    }

    pub fn status(&self) -> InterruptStatus {
        self.status
    }

    pub fn written(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::WriteByte(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    fn clear(&mut self, flag: InterruptStatus, op: BusOp) {
        self.status.remove(flag);
        self.ops.push(op);
    }
}

impl BusController for FakeBus {
    fn setup(&mut self, frequency: u32) {
        self.ops.push(BusOp::Setup(frequency));
    }

    fn interrupt_status(&self) -> InterruptStatus {
        self.status
    }

    fn clear_tx_abort(&mut self) {
        self.clear(InterruptStatus::TX_ABRT, BusOp::ClearTxAbort);
    }

    fn clear_start_detected(&mut self) {
        self.clear(InterruptStatus::START_DET, BusOp::ClearStartDetected);
    }

    fn clear_stop_detected(&mut self) {
        self.clear(InterruptStatus::STOP_DET, BusOp::ClearStopDetected);
    }

    fn clear_read_request(&mut self) {
        self.clear(InterruptStatus::RD_REQ, BusOp::ClearReadRequest);
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.rx.pop_front().unwrap_or(0);
        if self.rx.is_empty() {
            self.status.remove(InterruptStatus::RX_FULL);
        }
        self.ops.push(BusOp::ReadByte(byte));
        byte
    }

    fn write_byte(&mut self, byte: u8) {
        self.ops.push(BusOp::WriteByte(byte));
    }

    fn set_slave_mode(&mut self, address: Option<u8>) {
        self.ops.push(BusOp::SlaveMode(address));
    }

    fn set_interrupt_mask(&mut self, mask: InterruptStatus) {
        self.ops.push(BusOp::Mask(mask));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOp {
    Install(IrqLine),
    Remove(IrqLine),
    Enable(IrqLine),
    Disable(IrqLine),
}

#[derive(Default)]
struct Line {
    entry: Option<EntryPoint>,
    enabled: bool,
}

/// Interrupt controller double; [`FakeIrq::fire`] plays the hardware.
pub struct FakeIrq {
    lines: [Line; 2],
    pub ops: Vec<IrqOp>,
}

impl FakeIrq {
    pub fn new() -> Self {
        Self {
            lines: Default::default(),
            ops: Vec::new(),
        }
    }

    fn index(line: IrqLine) -> usize {
        usize::from(line.0 - irq_i2c_slave::I2C0_IRQ)
    }

    /// Runs the installed entry point of `line` if the line is enabled.
    /// Returns whether anything ran.
    pub fn fire(&self, line: IrqLine) -> bool {
        let l = &self.lines[Self::index(line)];

        match l.entry.filter(|_| l.enabled) {
            Some(entry) => {
                entry();
                true
            }
            None => false,
        }
    }
}

impl InterruptController for FakeIrq {
    fn install(&mut self, line: IrqLine, entry: EntryPoint) {
        self.lines[Self::index(line)].entry = Some(entry);
        self.ops.push(IrqOp::Install(line));
    }

    fn remove(&mut self, line: IrqLine) {
        self.lines[Self::index(line)].entry = None;
        self.ops.push(IrqOp::Remove(line));
    }

    fn enable(&mut self, line: IrqLine) {
        self.lines[Self::index(line)].enabled = true;
        self.ops.push(IrqOp::Enable(line));
    }

    fn disable(&mut self, line: IrqLine) {
        self.lines[Self::index(line)].enabled = false;
        self.ops.push(IrqOp::Disable(line));
    }
}
