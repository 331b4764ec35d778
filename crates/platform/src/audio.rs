//! Audio output abstraction
//!
//! Playback is a fixed-rate stream of 8-bit unsigned PCM levels: a
//! [`SampleClock`] fires at the sample rate while armed, and each firing
//! writes exactly one level to a [`MonoDac`]. Both traits are called from
//! the clock context, so implementations must be brief and non-blocking.

/// Mono 8-bit DAC output.
pub trait MonoDac {
    /// Latch one unsigned PCM level (`0x80` is the zero line).
    ///
    /// Called once per sample period while the clock is armed. The level
    /// holds on the output until the next call.
    fn write_level(&mut self, level: u8);
}

/// Gate for the fixed-rate sample clock.
///
/// Handles are shared between the control surface and the clock task, so
/// the methods take `&self` and implementations are `Clone`.
pub trait SampleClock: Clone {
    /// Start delivering ticks at the sample rate.
    ///
    /// Arming resets the tick origin: the first tick lands one full period
    /// after `arm`, never as a burst of catch-up ticks.
    fn arm(&self);

    /// Stop delivering ticks.
    fn disarm(&self);
}
