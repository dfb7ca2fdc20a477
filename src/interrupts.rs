use crate::{
    context::IrqContext,
    hal::BusController,
    status::InterruptStatus,
    transfer::TransferTracker,
    Event,
};

/// Application callback invoked synchronously from interrupt context.
///
/// `on_event` must return promptly: after a `Request` the bus clock is held
/// low until the response bytes are written.
pub trait EventHandler<B: BusController>: Sync {
    fn on_event(&self, cx: &IrqContext, bus: &mut B, event: Event);
}

impl<B, F> EventHandler<B> for F
where
    B: BusController,
    F: Fn(&IrqContext, &mut B, Event) + Sync,
{
    fn on_event(&self, cx: &IrqContext, bus: &mut B, event: Event) {
        self(cx, bus, event)
    }
}

fn notify<B, H>(
    cx: &IrqContext,
    bus: &mut B,
    handler: &H,
    tracker: &TransferTracker,
    event: Event,
) where
    B: BusController,
    H: EventHandler<B> + ?Sized,
{
    tracker.record(event);
    handler.on_event(cx, bus, event);
}

fn finish_transfer<B, H>(cx: &IrqContext, bus: &mut B, handler: &H, tracker: &TransferTracker)
where
    B: BusController,
    H: EventHandler<B> + ?Sized,
{
    if tracker.is_open() {
        notify(cx, bus, handler, tracker, Event::Finish);
        tracker.close();
    }
}

/// Decodes one interrupt of a bound instance into protocol events.
///
/// Finish conditions (abort, start, stop) are handled before the conditions
/// that open a transfer, so a stale transfer is closed before the next one is
/// reported. Each hardware flag is cleared before its callback runs.
pub fn handle_interrupt<B, H>(bus: &mut B, handler: &H, tracker: &TransferTracker)
where
    B: BusController,
    H: EventHandler<B> + ?Sized,
{
    let status = bus.interrupt_status();

    if status.is_empty() {
        return;
    }

    trace!("i2c interrupt status {=u32:#x}", status.bits());

    let cx = IrqContext::new();

    macro_rules! finish_on {
        ([$(($flag:ident, $clear_func:ident)),*]) => {
            $(
                if status.contains(InterruptStatus::$flag) {
                    bus.$clear_func();
                    finish_transfer(&cx, bus, handler, tracker);
                }
            )*
        };
    }

    finish_on!([
        (TX_ABRT, clear_tx_abort),
        (START_DET, clear_start_detected),
        (STOP_DET, clear_stop_detected)
    ]);

    // RX_FULL clears itself once the callback drains the FIFO.
    if status.contains(InterruptStatus::RX_FULL) {
        tracker.open();
        notify(&cx, bus, handler, tracker, Event::Receive);
    }

    if status.contains(InterruptStatus::RD_REQ) {
        bus.clear_read_request();
        tracker.open();
        notify(&cx, bus, handler, tracker, Event::Request);
    }
}
