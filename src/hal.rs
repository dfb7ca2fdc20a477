use crate::{status::InterruptStatus, InstanceId};

/// NVIC line of the first bus controller, the second one follows it.
pub const I2C0_IRQ: u8 = 23;

/// Function installed as the interrupt service routine of one instance.
pub type EntryPoint = fn();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqLine(pub u8);

impl IrqLine {
    pub const fn of(id: InstanceId) -> Self {
        Self(I2C0_IRQ + id.index() as u8)
    }
}

/// Register-level access to one bus controller.
///
/// Every method is a single register operation with no side effect beyond the
/// documented one. Implementations must not block: they run in interrupt
/// context.
pub trait BusController {
    /// Electrical and clock setup done once before the controller enters
    /// slave mode (pin multiplexing, pull-ups, bus frequency).
    fn setup(&mut self, frequency: u32);

    fn interrupt_status(&self) -> InterruptStatus;

    fn clear_tx_abort(&mut self);

    fn clear_start_detected(&mut self);

    fn clear_stop_detected(&mut self);

    /// Acknowledges a read request. The hardware keeps stretching the clock
    /// until the transmit FIFO gets data.
    fn clear_read_request(&mut self);

    fn read_byte(&mut self) -> u8;

    fn write_byte(&mut self, byte: u8);

    /// `Some(address)` puts the controller in addressed-slave mode, `None`
    /// takes it out.
    fn set_slave_mode(&mut self, address: Option<u8>);

    fn set_interrupt_mask(&mut self, mask: InterruptStatus);
}

pub trait InterruptController {
    fn install(&mut self, line: IrqLine, entry: EntryPoint);

    fn remove(&mut self, line: IrqLine);

    fn enable(&mut self, line: IrqLine);

    fn disable(&mut self, line: IrqLine);
}

/// Builds the per-instance entry points of a `static` [`Registry`](crate::Registry).
///
/// ```ignore
/// static REGISTRY: Registry<'static, MyBus> = Registry::new();
/// let slave = I2cSlave::new(&REGISTRY, nvic, entry_points!(REGISTRY));
/// ```
#[macro_export]
macro_rules! entry_points {
    ($registry:expr) => {
        [
            (|| $registry.dispatch($crate::InstanceId::I2c0)) as $crate::EntryPoint,
            (|| $registry.dispatch($crate::InstanceId::I2c1)) as $crate::EntryPoint,
        ]
    };
}
