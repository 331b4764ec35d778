//! Clock tree and watchdog policy for the STM32H743 board.

/// IWDG timeout in milliseconds.
///
/// The IWDG runs from the 32 kHz LSI and keeps counting through every low
/// power mode except standby, which is exactly the behaviour the power
/// switch path relies on. Once unleashed it cannot be stopped — something
/// must call `pet()` at least this often:
///
/// - the jukebox loop feeds every dispatch pass (100 ms),
/// - the fault trap feeds every 10 ms slice while blinking.
///
/// 8 s leaves ample margin for SD mount and the first directory scan,
/// which happen before the jukebox loop starts feeding.
pub const WATCHDOG_TIMEOUT_MS: u32 = 8_000;

/// [`WATCHDOG_TIMEOUT_MS`] in the microseconds the HAL constructor takes.
pub const WATCHDOG_TIMEOUT_US: u32 = WATCHDOG_TIMEOUT_MS * 1_000;

/// Build the `embassy_stm32::Config` with correct RCC settings.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz
///
/// Nothing on this board needs a second PLL: the SD card hangs off SPI1 at
/// 400 kHz, the speaker is the on-chip DAC, and the sample clock is TIM2.
///
/// # Sample clock
///
/// The embassy time driver runs on TIM2 (APB1) with a 1 MHz tick, so the
/// 125 µs sample period is an exact eight ticks. Keep the APB1 prescaler
/// and the `tick-hz-1_000_000` feature in sync if either ever changes.
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // HSI: 64 MHz internal oscillator (no prescaler). No crystal on the
    // board; the DAC output tolerance is far looser than HSI drift.
    config.rcc.hsi = Some(HSIPrescaler::DIV1);

    // PLL1: HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz → system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}
