//! Terminal fatal trap.
//!
//! When the appliance cannot run at all (engine claim failed, card
//! unreachable at boot), it stops pretending: log the reason once, then
//! blink the error LED at 1 Hz forever while feeding the watchdog so the
//! trap itself is not reset. Recovery is a human power-cycling the box.

use embassy_time::{block_for, Duration};
use embedded_hal::digital::OutputPin;

use platform::config::{FAULT_BLINK_MS, FAULT_FEED_SLICE_MS};
use platform::Liveness;

/// Watchdog feed slices per blink phase.
const SLICES_PER_PHASE: u64 = FAULT_BLINK_MS / FAULT_FEED_SLICE_MS;

/// Trap forever, blinking `indicator` at 1 Hz (500 ms on, 500 ms off).
///
/// The liveness seam is fed every [`FAULT_FEED_SLICE_MS`] so an armed
/// watchdog does not reset the box out of its blink code. Pin errors are
/// ignored: there is nothing left to do about them.
pub fn halt(mut indicator: impl OutputPin, mut liveness: impl Liveness, reason: &str) -> ! {
    #[cfg(feature = "defmt")]
    defmt::error!("fatal: {=str}", reason);
    #[cfg(not(feature = "defmt"))]
    let _ = reason;
    loop {
        blink_phase(&mut indicator, true, &mut liveness);
        blink_phase(&mut indicator, false, &mut liveness);
    }
}

/// One blink phase: latch the LED level, then feed the liveness seam every
/// slice until [`FAULT_BLINK_MS`] has passed.
pub fn blink_phase(indicator: &mut impl OutputPin, lit: bool, liveness: &mut impl Liveness) {
    let _ = if lit {
        indicator.set_high()
    } else {
        indicator.set_low()
    };
    for _ in 0..SLICES_PER_PHASE {
        liveness.feed();
        block_for(Duration::from_millis(FAULT_FEED_SLICE_MS));
    }
}
