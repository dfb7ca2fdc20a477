use crate::{
    hal::{BusController, EntryPoint, InterruptController},
    interrupts::EventHandler,
    registry::Registry,
    status::{INTR_MASK_RESET, SLAVE_INTERRUPTS},
    InstanceId, INSTANCE_COUNT,
};

/// Bus clock the controllers are set up for.
pub const DEFAULT_FREQUENCY: u32 = 400_000;

pub const MAX_ADDRESS: u8 = 0x7f;

/// Addresses 0x00-0x07 and 0x78-0x7f are reserved by the bus protocol.
pub const fn is_reserved_address(address: u8) -> bool {
    (address & 0x78) == 0 || (address & 0x78) == 0x78
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveConfig {
    /// 7-bit own address.
    pub address: u8,
    /// Bus frequency in Hz.
    pub frequency: u32,
}

impl SlaveConfig {
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            frequency: DEFAULT_FREQUENCY,
        }
    }

    pub const fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }
}

/// Brings bus instances up as addressed slaves and back down.
///
/// Both transitions are expected to be driven once per lifecycle by trusted
/// setup code, so precondition violations panic.
pub struct I2cSlave<'r, 'h, B: BusController, I: InterruptController> {
    registry: &'r Registry<'h, B>,
    interrupts: I,
    entry_points: [EntryPoint; INSTANCE_COUNT],
}

impl<'r, 'h, B: BusController, I: InterruptController> I2cSlave<'r, 'h, B, I> {
    /// `entry_points[n]` must dispatch instance `n` of `registry`, see
    /// [`entry_points!`](crate::entry_points).
    pub fn new(
        registry: &'r Registry<'h, B>,
        interrupts: I,
        entry_points: [EntryPoint; INSTANCE_COUNT],
    ) -> Self {
        Self {
            registry,
            interrupts,
            entry_points,
        }
    }

    /// # Panics
    ///
    /// If `config.address` is not a usable 7-bit address or `id` is already
    /// running.
    pub fn start(
        &mut self,
        id: InstanceId,
        mut bus: B,
        config: &SlaveConfig,
        handler: &'h dyn EventHandler<B>,
    ) {
        assert!(
            config.address <= MAX_ADDRESS,
            "Own address is out of range. 10-bit addresses are not supported."
        );
        assert!(
            !is_reserved_address(config.address),
            "Own address is reserved"
        );
        assert!(!self.registry.is_bound(id), "{:?} is already running", id);

        info!(
            "Starting I2C slave {} at {=u8:#x}, {} Hz",
            id, config.address, config.frequency
        );

        bus.setup(config.frequency);

        // The controller stretches the clock on its own after a read request
        // while the transmit FIFO is empty.
        bus.set_slave_mode(Some(config.address));
        bus.set_interrupt_mask(SLAVE_INTERRUPTS);

        if let Err(rejected) = self.registry.bind(id, bus, handler) {
            panic!("Cannot bind {:?}: {:?}", id, rejected.error);
        }

        let line = id.irq_line();
        self.interrupts.install(line, self.entry_points[id.index()]);
        self.interrupts.enable(line);

        debug!("I2C slave {} running", id);
    }

    /// Stops a running instance and hands its bus controller back.
    ///
    /// # Panics
    ///
    /// If `id` is not running.
    pub fn stop(&mut self, id: InstanceId) -> B {
        assert!(self.registry.is_bound(id), "{:?} is not running", id);

        let line = id.irq_line();
        self.interrupts.disable(line);
        self.interrupts.remove(line);

        let mut bus = match self.registry.unbind(id) {
            Ok(bus) => bus,
            Err(err) => panic!("Cannot unbind {:?}: {:?}", id, err),
        };

        bus.set_interrupt_mask(INTR_MASK_RESET);
        bus.set_slave_mode(None);

        info!("Stopped I2C slave {}", id);

        bus
    }

    pub fn is_running(&self, id: InstanceId) -> bool {
        self.registry.is_bound(id)
    }

    pub fn registry(&self) -> &'r Registry<'h, B> {
        self.registry
    }

    pub fn interrupts(&self) -> &I {
        &self.interrupts
    }

    pub fn release(self) -> I {
        self.interrupts
    }
}
