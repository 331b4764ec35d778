//! Power switch and watchdog plumbing.
//!
//! The power switch is an SPDT slide switch that drives PA0 directly:
//! high in the ON position, low in OFF. [`power_watch_task`] polls it and
//! drops the board into standby once OFF has held through the debounce
//! interval. PA0 doubles as WKUP1, so flipping the switch back to ON
//! wakes the MCU through a full reset and a clean boot.

use cortex_m::peripheral::SCB;
use embassy_stm32::gpio::{AnyPin, Input};
use embassy_stm32::pac::PWR;
use embassy_stm32::peripherals::IWDG1;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::Timer;

use platform::config::{POWER_DEBOUNCE_MS, POWER_POLL_MS};
use platform::{Liveness, PowerControl};

/// The independent watchdog as a [`Liveness`] feed point.
pub struct IwdgLiveness {
    wdg: IndependentWatchdog<'static, IWDG1>,
}

impl IwdgLiveness {
    /// Wrap an already-unleashed watchdog.
    pub fn new(wdg: IndependentWatchdog<'static, IWDG1>) -> Self {
        Self { wdg }
    }
}

impl Liveness for IwdgLiveness {
    fn feed(&mut self) {
        self.wdg.pet();
    }
}

/// Standby entry via the PWR block.
///
/// Standby powers down all three domains; SRAM and register state are
/// lost and wake-up is a reset. The IWDG stops counting in standby, so
/// the watchdog cannot fire while the appliance is off.
pub struct StandbyControl {
    scb: SCB,
}

impl StandbyControl {
    /// Take ownership of the SCB for the SLEEPDEEP bit.
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }
}

impl PowerControl for StandbyControl {
    type Error = core::convert::Infallible;

    fn deep_sleep(&mut self) -> Result<(), Self::Error> {
        // Register fields per RM0433 §7.7 (PWR register map).
        // PWR_WKUPCR[5:0] WKUPC: clear stale wakeup flags so a pending one
        // cannot bounce the MCU straight back out of standby.
        PWR.wkupcr().modify(|w| w.0 |= 0x0000_003F);
        // PWR_WKUPEPR[0] WKUPEN1: enable WKUP1 (PA0), rising edge
        // (WKUPP1 left 0) — the switch returning to ON wakes us.
        PWR.wkupepr().modify(|w| w.0 |= 0x0000_0001);
        // PWR_CPUCR[2:0] PDDS_D1/D2/D3: all domains select standby when
        // the core enters deepsleep.
        PWR.cpucr().modify(|w| w.0 |= 0x0000_0007);

        self.scb.set_sleepdeep();
        cortex_m::asm::dsb();
        // Wake-up from standby is a system reset; execution never resumes
        // past the WFI. The loop guards against a spurious early wake.
        loop {
            cortex_m::asm::wfi();
        }
    }
}

/// Poll the power switch and enter standby once OFF has settled.
#[embassy_executor::task]
pub async fn power_watch_task(switch: Input<'static, AnyPin>, mut power: StandbyControl) {
    loop {
        if switch.is_low() {
            Timer::after_millis(POWER_DEBOUNCE_MS).await;
            if switch.is_low() {
                defmt::info!("power switch off, entering standby");
                let _ = power.deep_sleep();
            }
        }
        Timer::after_millis(POWER_POLL_MS).await;
    }
}
