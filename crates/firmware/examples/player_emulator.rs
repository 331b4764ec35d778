//! Driftbox Player Emulator
//!
//! Drives the real engine and orchestrator against a local directory of
//! raw 8 kHz 8-bit unsigned PCM tracks, with a mock sample clock and a
//! recording DAC standing in for the hardware.
//! Run with: DRIFTBOX_MUSIC=~/music cargo run --example player_emulator --features emulator

use std::time::Duration;

use tokio::io::AsyncBufReadExt;

use platform::config::{self, DISPATCH_PERIOD_MS};
use platform::mocks::{MockClock, MockDac};
use platform::storage_local::{LocalFile, LocalFileStorage, LocalMount};
use platform::{ButtonEvent, LatestEvent, NoopLiveness};
use playback::engine::{EngineShared, Player, SAMPLE_RATE_HZ};
use playback::state::PlayerStatus;

use firmware::Jukebox;

/// Host timers cannot do 125 µs; 80 ticks every 10 ms is the same rate.
const TICKS_PER_BURST: u32 = SAMPLE_RATE_HZ / 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("{} - Player Emulator", config::APP_NAME);

    let root = std::env::var("DRIFTBOX_MUSIC")
        .map_err(|_| "set DRIFTBOX_MUSIC to a directory of raw 8 kHz 8-bit PCM tracks")?;
    println!("Music directory: {root}");
    println!("Controls: n=next  p=previous  empty line=pause/resume  Ctrl-C=exit\n");

    // The engine halves want a 'static shared block; leaking one is the
    // emulator's stand-in for the firmware statics.
    let shared: &'static EngineShared<LocalFile> = Box::leak(Box::new(EngineShared::new()));
    let latest: &'static LatestEvent = Box::leak(Box::new(LatestEvent::new()));

    let clock = MockClock::new();
    let dac = MockDac::new();
    let (player, mut refill, mut feed) = Player::setup(
        shared,
        LocalFileStorage::new(&root),
        clock.clone(),
        dac.clone(),
    )?;

    tokio::spawn(async move { refill.run().await });

    // Sample clock: tick in bursts while the engine keeps the gate armed.
    let tick_clock = clock.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(10));
        loop {
            interval.tick().await;
            if tick_clock.is_armed() {
                for _ in 0..TICKS_PER_BURST {
                    feed.tick();
                }
            }
        }
    });

    // Keyboard stand-in for the three buttons.
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let event = match line.trim() {
                "n" => Some(ButtonEvent::Next),
                "p" => Some(ButtonEvent::Previous),
                "" => Some(ButtonEvent::PauseToggle),
                _ => None,
            };
            if let Some(event) = event {
                latest.record(event);
            }
        }
    });

    let mut jukebox = Jukebox::start(player, LocalMount::new(&root), &*latest).await?;
    tracing::info!(tracks = jukebox.state().len(), "jukebox started");
    println!("✓ Jukebox up: {} tracks\n", jukebox.state().len());

    let mut liveness = NoopLiveness;
    let mut since_report: u32 = 0;
    loop {
        jukebox.dispatch(&mut liveness).await;
        since_report = since_report.wrapping_add(1);
        if since_report >= 10 {
            since_report = 0;
            let status = match jukebox.state().status() {
                PlayerStatus::Stopped => "stopped",
                PlayerStatus::Playing => "playing",
                PlayerStatus::Paused => "paused",
            };
            let track = jukebox.state().current_track().unwrap_or("-");
            println!("[{status}] {track} — {} samples out", dac.levels().len());
        }
        tokio::time::sleep(Duration::from_millis(DISPATCH_PERIOD_MS)).await;
    }
}
