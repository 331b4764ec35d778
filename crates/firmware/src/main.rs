//! Driftbox firmware — main entry point.
//!
//! Hardware-only entry point for STM32H743.

#![no_std]
#![no_main]

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::dac::DacCh1;
use embassy_stm32::dma::NoDma;
use embassy_stm32::exti::{Channel, ExtiInput};
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;

use platform::config::{APP_NAME, APP_VERSION};
use platform::{ButtonEvent, LatestEvent};
use playback::engine::{EngineShared, Player, Refill};

use firmware::hw::{
    board, button_task, power_watch_task, sample_feed_task, BoardDac, GateState, IwdgLiveness,
    SdFile, SdMount, SdState, SdStorage, StandbyControl, TickerGate,
};
use firmware::{fault, Jukebox, StartError};

// Logger and panic handler
use defmt_rtt as _;
use panic_probe as _;

/// Engine shared state: sample ring, session slot, playback flags.
static ENGINE: EngineShared<SdFile> = EngineShared::new();
/// Last-wins button slot shared by the three button tasks.
static LATEST: LatestEvent = LatestEvent::new();
/// Sample-clock gate between the control surface and the tick task.
static GATE: GateState = GateState::new();
/// The shared SD stack, initialised once during bring-up.
static SD_STATE: StaticCell<SdState> = StaticCell::new();
/// High-priority executor for the 125 µs sample feed.
static EXECUTOR_TICK: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART5() {
    // SAFETY: this handler fires only for the interrupt `EXECUTOR_TICK`
    // was started on, which is the contract `on_interrupt` requires.
    unsafe { EXECUTOR_TICK.on_interrupt() }
}

/// Thread-mode wrapper around the refill worker.
#[embassy_executor::task]
async fn refill_task(mut refill: Refill<'static, SdFile, TickerGate>) {
    refill.run().await;
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    defmt::info!("Initializing STM32H743 — Cortex-M7 @ 400 MHz");

    let p = embassy_stm32::init(board::build_embassy_config());

    // Watchdog first: everything that follows must keep feeding it. Once
    // unleashed it cannot be stopped; the jukebox loop and the fatal trap
    // are the two feed points.
    let mut watchdog = IndependentWatchdog::new(p.IWDG1, board::WATCHDOG_TIMEOUT_US);
    watchdog.unleash();
    let mut liveness = IwdgLiveness::new(watchdog);
    defmt::info!("IWDG armed: timeout={=u32}ms", board::WATCHDOG_TIMEOUT_MS);

    // Fault indicator, held dark unless the fatal trap takes over.
    let led = Output::new(p.PB14, Level::Low, Speed::Low);

    let Some(core) = cortex_m::Peripherals::take() else {
        fault::halt(led, liveness, "core peripherals already taken");
    };

    // SD card on SPI1. 400 kHz is init-safe for every card and still ~6x
    // the 64 kbit/s an 8 kHz 8-bit stream needs, so it stays there.
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(400_000);
    let spi = Spi::new(
        p.SPI1, p.PA5, // SCK
        p.PA7, // MOSI
        p.PA6, // MISO
        NoDma, NoDma, spi_config,
    );
    let cs = Output::new(p.PB6, Level::High, Speed::VeryHigh).degrade();
    let Ok(sd_device) = ExclusiveDevice::new(spi, cs, Delay) else {
        fault::halt(led, liveness, "sd chip-select setup failed");
    };
    let sd: &'static SdState = SD_STATE.init(SdState::new(sd_device));
    defmt::info!("SD stack ready on SPI1 @ 400 kHz");

    // Speaker on DAC1_OUT1 (PA4), 8-bit right-aligned.
    let dac = BoardDac::new(DacCh1::new(p.DAC1, NoDma, p.PA4));

    // Split the engine into its three halves.
    let (player, refill, feed) =
        match Player::setup(&ENGINE, SdStorage::new(sd), TickerGate::new(&GATE), dac) {
            Ok(parts) => parts,
            Err(_) => fault::halt(led, liveness, "engine state already claimed"),
        };

    // Sample feed on its own interrupt executor so ticks preempt SD reads
    // on the thread executor. UART5 is unused by the board; its vector
    // hosts the executor.
    interrupt::UART5.set_priority(Priority::P6);
    let tick_spawner = EXECUTOR_TICK.start(interrupt::UART5);
    if tick_spawner.spawn(sample_feed_task(&GATE, feed)).is_err() {
        fault::halt(led, liveness, "sample feed task failed to spawn");
    }
    defmt::info!("sample feed armed on UART5 executor (P6)");

    if spawner.spawn(refill_task(refill)).is_err() {
        fault::halt(led, liveness, "refill task failed to spawn");
    }

    // Buttons: active-low with internal pull-ups, one watcher task each.
    let prev = ExtiInput::new(Input::new(p.PC6, Pull::Up).degrade(), p.EXTI6.degrade());
    let pause = ExtiInput::new(Input::new(p.PC7, Pull::Up).degrade(), p.EXTI7.degrade());
    let next = ExtiInput::new(Input::new(p.PC8, Pull::Up).degrade(), p.EXTI8.degrade());
    let buttons = [
        (prev, ButtonEvent::Previous),
        (pause, ButtonEvent::PauseToggle),
        (next, ButtonEvent::Next),
    ];
    for (pin, event) in buttons {
        if spawner.spawn(button_task(pin, event, &LATEST)).is_err() {
            fault::halt(led, liveness, "button task failed to spawn");
        }
    }

    // Power switch on PA0 (WKUP1). The switch drives the line in both
    // positions, so no pull is needed.
    let switch = Input::new(p.PA0, Pull::None).degrade();
    if spawner
        .spawn(power_watch_task(switch, StandbyControl::new(core.SCB)))
        .is_err()
    {
        fault::halt(led, liveness, "power task failed to spawn");
    }

    // Mount, scan the root directory, auto-play the first track.
    match Jukebox::start(player, SdMount::new(sd), &LATEST).await {
        Ok(mut jukebox) => {
            defmt::info!("jukebox up: {=usize} tracks", jukebox.state().len());
            jukebox.run(&mut liveness).await;
        }
        Err(StartError::Mount(e)) => {
            defmt::error!("mount failed: {}", e);
            fault::halt(led, liveness, "sd card failed to mount");
        }
        Err(StartError::List(e)) => {
            defmt::error!("directory listing failed: {}", e);
            fault::halt(led, liveness, "music directory unreadable");
        }
    }
}
