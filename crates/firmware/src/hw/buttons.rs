//! Debounced button watchers.
//!
//! One task per button (active-low, internal pull-up). A press is a
//! falling edge that is still low after the debounce interval; it lands in
//! the shared [`LatestEvent`] slot, where a later press overwrites an
//! unconsumed one. Releases are not reported — the jukebox acts on
//! presses alone.

use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::AnyPin;
use embassy_time::Timer;

use platform::config::BUTTON_DEBOUNCE_MS;
use platform::{ButtonEvent, LatestEvent};

/// Watch one button pin and record presses into `slot`.
///
/// `pool_size = 3`: previous, play/pause, next.
#[embassy_executor::task(pool_size = 3)]
pub async fn button_task(
    mut pin: ExtiInput<'static, AnyPin>,
    event: ButtonEvent,
    slot: &'static LatestEvent,
) {
    loop {
        pin.wait_for_falling_edge().await;
        Timer::after_millis(BUTTON_DEBOUNCE_MS).await; // debounce
        if pin.is_low() {
            defmt::debug!("button press: {}", event);
            slot.record(event);
            pin.wait_for_rising_edge().await;
        }
    }
}
