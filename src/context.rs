use core::marker::PhantomData;

/// Proof that the code holding it runs inside the I2C interrupt handler.
///
/// Only the dispatcher creates one and lends it to each callback. It is
/// `!Send` and `!Sync`, so it cannot be smuggled out to application code.
/// Interrupt-side mailbox writers take it as an argument for that reason.
///
/// Code holding an `IrqContext` must not block, sleep or allocate.
pub struct IrqContext {
    _marker: PhantomData<*const ()>,
}

impl IrqContext {
    pub(crate) const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}
