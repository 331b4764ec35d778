//! Orchestrator tests — boot, dispatch table, auto-advance, and failure
//! routing over the real engine with mock storage, clock, and DAC.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::cast_possible_truncation
)]
//!
//! The input source is a leaked [`LatestEvent`] slot, the same shape the
//! firmware shares between the button tasks and the jukebox, so tests can
//! record presses mid-flight.
//!
//! Run with: cargo test -p firmware --test jukebox_dispatch

use std::time::Duration;

use platform::mocks::{
    FeedCounter, MockClock, MockDac, MockFile, MockMount, MockStorage, MockStorageError,
};
use platform::{ButtonEvent, LatestEvent, NoopLiveness};
use playback::engine::{EngineShared, Player, SampleFeed};
use playback::state::PlayerStatus;

use firmware::{Jukebox, StartError};

type TestPlayer = Player<'static, MockStorage, MockClock>;
type TestFeed = SampleFeed<'static, MockFile, MockDac>;
type TestJukebox = Jukebox<'static, MockStorage, MockClock, MockMount, &'static LatestEvent>;

/// Deterministic non-repeating sample pattern.
fn pcm_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Claim a fresh engine over `storage` and spawn its refill worker.
fn spawn_engine(storage: MockStorage) -> (TestPlayer, TestFeed, MockClock, MockDac) {
    let shared: &'static EngineShared<MockFile> = Box::leak(Box::new(EngineShared::new()));
    let clock = MockClock::new();
    let dac = MockDac::new();
    let (player, mut refill, feed) = Player::setup(shared, storage, clock.clone(), dac.clone())
        .expect("fresh engine state splits once");
    tokio::spawn(async move { refill.run().await });
    (player, feed, clock, dac)
}

/// Boot a jukebox over `storage` with a healthy mount.
async fn start_jukebox(
    storage: MockStorage,
) -> (TestJukebox, TestFeed, MockClock, MockDac, &'static LatestEvent) {
    let (player, feed, clock, dac) = spawn_engine(storage);
    let latest: &'static LatestEvent = Box::leak(Box::new(LatestEvent::new()));
    let jukebox = Jukebox::start(player, MockMount::new(), &*latest)
        .await
        .expect("mount and listing succeed");
    (jukebox, feed, clock, dac, latest)
}

/// Tick one sample per poll until the DAC has seen `n` levels. Exact: the
/// loop exits the iteration the count is reached, never overshooting.
async fn tick_until_output(feed: &mut TestFeed, dac: &MockDac, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while dac.levels().len() < n {
            feed.tick();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("output should reach the requested length");
}

/// Record one press and run one dispatch pass.
async fn press(jukebox: &mut TestJukebox, latest: &LatestEvent, event: ButtonEvent) {
    latest.record(event);
    jukebox.dispatch(&mut NoopLiveness).await;
}

/// A mount failure at boot is terminal and touches nothing else.
#[tokio::test]
async fn test_start_mount_failure_is_terminal() {
    let (player, _feed, clock, _dac) = spawn_engine(MockStorage::new());
    let latest: &'static LatestEvent = Box::leak(Box::new(LatestEvent::new()));

    let result = Jukebox::start(player, MockMount::failing(), &*latest).await;

    assert!(matches!(
        result,
        Err(StartError::Mount(MockStorageError::MountFault))
    ));
    assert_eq!(clock.arm_count(), 0);
}

/// A listing failure at boot is terminal.
#[tokio::test]
async fn test_start_listing_failure_is_terminal() {
    let mut storage = MockStorage::new();
    storage.insert("a.pcm", &[0x80]);
    storage.fail_listing();
    let (player, _feed, clock, _dac) = spawn_engine(storage);
    let latest: &'static LatestEvent = Box::leak(Box::new(LatestEvent::new()));

    let result = Jukebox::start(player, MockMount::new(), &*latest).await;

    assert!(matches!(
        result,
        Err(StartError::List(MockStorageError::ListFault))
    ));
    assert_eq!(clock.arm_count(), 0);
}

/// Boot auto-plays the first listed track.
#[tokio::test]
async fn test_start_autoplays_first_track() {
    let mut storage = MockStorage::new();
    storage.insert("a.pcm", &pcm_bytes(512));
    storage.insert("b.pcm", &pcm_bytes(512));
    let (jukebox, _feed, clock, _dac, _latest) = start_jukebox(storage).await;

    assert_eq!(jukebox.state().current_track(), Some("a.pcm"));
    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    assert!(clock.is_armed());
    assert_eq!(clock.arm_count(), 1);
}

/// An empty music directory boots to a stopped idle that buttons cannot
/// disturb.
#[tokio::test]
async fn test_start_with_empty_directory_idles() {
    let (mut jukebox, _feed, clock, dac, latest) = start_jukebox(MockStorage::new()).await;

    assert_eq!(jukebox.state().current_track(), None);
    assert_eq!(jukebox.state().status(), PlayerStatus::Stopped);

    press(&mut jukebox, latest, ButtonEvent::Next).await;
    press(&mut jukebox, latest, ButtonEvent::PauseToggle).await;
    press(&mut jukebox, latest, ButtonEvent::Previous).await;

    assert_eq!(jukebox.state().current_track(), None);
    assert_eq!(jukebox.state().status(), PlayerStatus::Stopped);
    assert_eq!(clock.arm_count(), 0);
    assert!(dac.levels().is_empty());
}

/// Next and Previous wrap around both ends of the track list, starting a
/// fresh session each time.
#[tokio::test]
async fn test_next_previous_wrap_through_dispatch() {
    let mut storage = MockStorage::new();
    storage.insert("a.pcm", &pcm_bytes(256));
    storage.insert("b.pcm", &pcm_bytes(256));
    storage.insert("c.pcm", &pcm_bytes(256));
    let (mut jukebox, _feed, clock, _dac, latest) = start_jukebox(storage).await;

    assert_eq!(jukebox.state().current_track(), Some("a.pcm"));

    press(&mut jukebox, latest, ButtonEvent::Next).await;
    assert_eq!(jukebox.state().current_track(), Some("b.pcm"));
    press(&mut jukebox, latest, ButtonEvent::Next).await;
    assert_eq!(jukebox.state().current_track(), Some("c.pcm"));
    press(&mut jukebox, latest, ButtonEvent::Next).await;
    assert_eq!(jukebox.state().current_track(), Some("a.pcm")); // wrap forward

    press(&mut jukebox, latest, ButtonEvent::Previous).await;
    assert_eq!(jukebox.state().current_track(), Some("c.pcm")); // wrap backward

    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    assert_eq!(clock.arm_count(), 5); // boot + four skips
}

/// Pause freezes the output where it stands; resume continues from the
/// same sample.
#[tokio::test]
async fn test_pause_toggle_freezes_and_resumes() {
    let mut storage = MockStorage::new();
    storage.insert("long.pcm", &pcm_bytes(4000));
    let (mut jukebox, mut feed, _clock, dac, latest) = start_jukebox(storage).await;

    tick_until_output(&mut feed, &dac, 100).await;

    press(&mut jukebox, latest, ButtonEvent::PauseToggle).await;
    assert_eq!(jukebox.state().status(), PlayerStatus::Paused);
    for _ in 0..50 {
        feed.tick();
    }
    assert_eq!(dac.levels().len(), 100, "paused output must not advance");

    press(&mut jukebox, latest, ButtonEvent::PauseToggle).await;
    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    tick_until_output(&mut feed, &dac, 150).await;
    assert_eq!(dac.levels(), pcm_bytes(4000)[..150]);
}

/// A track that fails to open leaves the appliance stopped; the next
/// valid selection plays normally.
#[tokio::test]
async fn test_missing_track_stops_until_next_selection() {
    let mut storage = MockStorage::new();
    storage.insert_phantom("ghost.pcm");
    storage.insert("real.pcm", &pcm_bytes(256));
    let (mut jukebox, _feed, clock, _dac, latest) = start_jukebox(storage).await;

    // Boot selected the phantom; auto-play failed and left us stopped.
    assert_eq!(jukebox.state().current_track(), Some("ghost.pcm"));
    assert_eq!(jukebox.state().status(), PlayerStatus::Stopped);
    assert_eq!(clock.arm_count(), 0);

    press(&mut jukebox, latest, ButtonEvent::Next).await;
    assert_eq!(jukebox.state().current_track(), Some("real.pcm"));
    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    assert_eq!(clock.arm_count(), 1);
}

/// Pause/resume from a stopped appliance retries the current selection
/// rather than doing nothing.
#[tokio::test]
async fn test_pause_toggle_from_stopped_retries_selection() {
    let mut storage = MockStorage::new();
    storage.insert_phantom("ghost.pcm");
    let (mut jukebox, _feed, clock, _dac, latest) = start_jukebox(storage).await;

    assert_eq!(jukebox.state().status(), PlayerStatus::Stopped);
    press(&mut jukebox, latest, ButtonEvent::PauseToggle).await;
    // The retry hit the same unopenable entry: still stopped, never armed.
    assert_eq!(jukebox.state().status(), PlayerStatus::Stopped);
    assert_eq!(jukebox.state().current_track(), Some("ghost.pcm"));
    assert_eq!(clock.arm_count(), 0);
}

/// A finished playout advances to the next track on the following
/// dispatch pass, and the dispatch loop keeps feeding the watchdog seam.
#[tokio::test]
async fn test_finished_playout_advances_to_next_track() {
    let first = pcm_bytes(300);
    let mut storage = MockStorage::new();
    storage.insert("a.pcm", &first);
    storage.insert("b.pcm", &[0x42; 600]);
    let (mut jukebox, mut feed, clock, dac, _latest) = start_jukebox(storage).await;

    let mut liveness = FeedCounter::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            for _ in 0..64 {
                feed.tick();
            }
            jukebox.dispatch(&mut liveness).await;
            if jukebox.state().current_track() == Some("b.pcm") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("playout should advance to the next track");

    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    assert_eq!(clock.arm_count(), 2);
    assert_eq!(&dac.levels()[..300], &first[..], "first track played out");
    assert!(liveness.count() > 0, "dispatch must feed liveness");
}

/// The last track wraps to the first on auto-advance, so playback loops
/// through the directory forever.
#[tokio::test]
async fn test_auto_advance_wraps_single_track() {
    let data = pcm_bytes(200);
    let mut storage = MockStorage::new();
    storage.insert("only.pcm", &data);
    let (mut jukebox, mut feed, clock, dac, _latest) = start_jukebox(storage).await;

    let mut liveness = NoopLiveness;
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            for _ in 0..64 {
                feed.tick();
            }
            jukebox.dispatch(&mut liveness).await;
            // A second session on the same single track means we wrapped.
            if clock.arm_count() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("single-track list should replay itself");

    assert_eq!(jukebox.state().current_track(), Some("only.pcm"));
    assert_eq!(jukebox.state().status(), PlayerStatus::Playing);
    assert_eq!(&dac.levels()[..200], &data[..]);
}

/// Two presses before a dispatch pass: only the newest is applied.
#[tokio::test]
async fn test_unconsumed_press_is_replaced_by_newer_one() {
    let mut storage = MockStorage::new();
    storage.insert("a.pcm", &pcm_bytes(256));
    storage.insert("b.pcm", &pcm_bytes(256));
    storage.insert("c.pcm", &pcm_bytes(256));
    let (mut jukebox, _feed, _clock, _dac, latest) = start_jukebox(storage).await;

    latest.record(ButtonEvent::Next);
    latest.record(ButtonEvent::Previous); // replaces the unconsumed Next
    jukebox.dispatch(&mut NoopLiveness).await;
    assert_eq!(jukebox.state().current_track(), Some("c.pcm"));

    // The slot is drained: another dispatch pass moves nothing.
    jukebox.dispatch(&mut NoopLiveness).await;
    assert_eq!(jukebox.state().current_track(), Some("c.pcm"));
}

/// Every dispatch pass feeds the liveness seam exactly once.
#[tokio::test]
async fn test_dispatch_feeds_liveness_every_pass() {
    let (mut jukebox, _feed, _clock, _dac, _latest) = start_jukebox(MockStorage::new()).await;

    let mut liveness = FeedCounter::new();
    for _ in 0..3 {
        jukebox.dispatch(&mut liveness).await;
    }
    assert_eq!(liveness.count(), 3);
}
