//! Power management abstraction
//!
//! The appliance has one power path: when the power switch reads off, the
//! firmware requests deep sleep and stays there until the switch wakes the
//! chip again. [`Liveness`] is the watchdog-feed seam used by long-running
//! loops, including the fatal trap.

/// Deep-sleep entry point.
pub trait PowerControl {
    /// Error type
    type Error: core::fmt::Debug;

    /// Enter the lowest-power state with the power switch as wake source.
    ///
    /// On hardware this does not return; wake goes through reset and the
    /// firmware boots fresh. Mock implementations return `Ok(())` so tests
    /// can observe that sleep was requested.
    fn deep_sleep(&mut self) -> Result<(), Self::Error>;
}

/// Watchdog feed seam.
///
/// Anything that loops for long stretches takes a `Liveness` and feeds it
/// often enough to hold off the hardware watchdog.
pub trait Liveness {
    /// Reset the watchdog countdown.
    fn feed(&mut self);
}

/// A [`Liveness`] that does nothing, for hosts without a watchdog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLiveness;

impl Liveness for NoopLiveness {
    fn feed(&mut self) {}
}
