//! Track orchestration — buttons in, engine control out.
//!
//! [`Jukebox`] owns the engine control surface, the mount manager, the
//! last-wins input source, and the track selection state. One dispatch
//! iteration folds a finished playout into auto-advance and applies at most
//! one button event; the run loop repeats that every
//! [`DISPATCH_PERIOD_MS`](platform::config::DISPATCH_PERIOD_MS) and feeds
//! the liveness seam so a wedged dispatch trips the watchdog.

use embassy_time::Timer;

use platform::config::DISPATCH_PERIOD_MS;
use platform::{join_path, ButtonEvent, InputSource, Liveness, MountManager, SampleClock, Storage};
use playback::engine::Player;
use playback::state::{PlayerState, PlayerStatus};

/// Boot-sequence failures that leave the appliance unable to play anything.
///
/// `main` routes these to the fatal trap; an appliance that cannot reach
/// its music blinks instead of sitting silent.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError<M, L> {
    /// The card did not mount.
    Mount(M),
    /// The music directory could not be listed.
    List(L),
}

impl<M, L> core::fmt::Display for StartError<M, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Mount(_) => write!(f, "card mount failed"),
            Self::List(_) => write!(f, "music directory listing failed"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl<M, L> std::error::Error for StartError<M, L>
where
    M: std::error::Error + 'static,
    L: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mount(e) => Some(e),
            Self::List(e) => Some(e),
        }
    }
}

/// The appliance orchestrator.
pub struct Jukebox<'a, S: Storage, K: SampleClock, M: MountManager, I: InputSource> {
    player: Player<'a, S, K>,
    mount: M,
    input: I,
    state: PlayerState,
}

impl<'a, S, K, M, I> Jukebox<'a, S, K, M, I>
where
    S: Storage,
    K: SampleClock,
    M: MountManager,
    I: InputSource,
{
    /// Boot: mount the card, list the music directory, auto-play the first
    /// track.
    ///
    /// An empty directory is not an error — the appliance idles until a
    /// track appears after the next power cycle. Mount and listing failures
    /// are terminal; the caller routes them to the fatal trap.
    ///
    /// # Errors
    ///
    /// [`StartError::Mount`] when the card does not mount,
    /// [`StartError::List`] when the music directory cannot be listed.
    pub async fn start(
        mut player: Player<'a, S, K>,
        mut mount: M,
        input: I,
    ) -> Result<Self, StartError<M::Error, S::Error>> {
        mount.mount().await.map_err(StartError::Mount)?;
        let tracks = {
            let dir = mount.mount_point();
            player
                .storage_mut()
                .list_dir(dir)
                .await
                .map_err(StartError::List)?
        };
        if tracks.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::warn!("music directory is empty, idling");
        }
        let mut jukebox = Self {
            player,
            mount,
            input,
            state: PlayerState::from_tracks(tracks),
        };
        jukebox.play_current().await;
        Ok(jukebox)
    }

    /// Stop whatever is live, then start the currently selected track.
    ///
    /// No-op on an empty track list. A track that fails to open (pulled
    /// card, corrupt entry) leaves the appliance stopped; the next valid
    /// selection plays normally.
    pub async fn play_current(&mut self) {
        let Some(name) = self.state.current_track() else {
            return;
        };
        self.player.stop().await;
        let path = match join_path(self.mount.mount_point(), name) {
            Ok(path) => path,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("track path overflowed, staying stopped");
                self.state.set_status(PlayerStatus::Stopped);
                return;
            }
        };
        match self.player.play(&path).await {
            Ok(()) => self.state.set_status(PlayerStatus::Playing),
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("track failed to start: {}", defmt::Debug2Format(&_err));
                self.state.set_status(PlayerStatus::Stopped);
            }
        }
    }

    /// Apply one button event.
    pub async fn handle_event(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Next => {
                self.state.next();
                self.play_current().await;
            }
            ButtonEvent::Previous => {
                self.state.prev();
                self.play_current().await;
            }
            ButtonEvent::PauseToggle => self.toggle_pause().await,
        }
    }

    /// One dispatch iteration: feed the liveness seam, fold a finished
    /// playout into auto-advance, apply at most one pending button event.
    pub async fn dispatch(&mut self, liveness: &mut impl Liveness) {
        liveness.feed();
        if self.player.has_finished() {
            self.state.next();
            self.play_current().await;
        }
        if let Some(event) = self.input.take_last() {
            self.handle_event(event).await;
        }
    }

    /// Dispatch loop. Never returns; the control task lives here.
    pub async fn run(&mut self, liveness: &mut impl Liveness) {
        loop {
            self.dispatch(liveness).await;
            Timer::after_millis(DISPATCH_PERIOD_MS).await;
        }
    }

    /// Track selection and status, for status surfaces and tests.
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    async fn toggle_pause(&mut self) {
        match self.state.status() {
            PlayerStatus::Playing => {
                if self.player.pause().is_ok() {
                    self.state.set_status(PlayerStatus::Paused);
                } else {
                    // The session ended between dispatch polls.
                    self.state.set_status(PlayerStatus::Stopped);
                }
            }
            PlayerStatus::Paused => {
                if self.player.resume().is_ok() {
                    self.state.set_status(PlayerStatus::Playing);
                } else {
                    self.state.set_status(PlayerStatus::Stopped);
                }
            }
            PlayerStatus::Stopped => self.play_current().await,
        }
    }
}
