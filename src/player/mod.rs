//! Per-guild playback.
//!
//! A [`Player`] owns one FIFO queue and at most one playback loop. The loop
//! pulls tracks one at a time, hands them to the guild's voice connection and
//! waits for each to end. After the idle timeout with nothing queued it leaves
//! the voice channel and exits; the next `enqueue` starts a fresh loop.
//!
//! Every state change happens under the player's state lock, so `enqueue`,
//! `stop` and the loop are linearized. A loop belongs to one session, which is
//! identified by its cancellation token. `stop` cancels the session, and a
//! loop whose token is cancelled never touches player state again. A new
//! session's loop waits for the previous loop task to finish before doing
//! anything, so two loops never overlap.

mod registry;
#[cfg(test)]
pub(crate) mod testing;

pub(crate) use registry::PlayerRegistry;

use crate::track::Track;
use crate::voice::{PlaybackEnd, PlaybackFinished, VoiceConnection, VoiceError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use twilight_model::id::{marker::GuildMarker, Id};

#[derive(Debug, Clone, Copy)]
pub(crate) struct PlayerSettings {
    /// How long the loop waits on an empty queue before leaving voice.
    pub(crate) idle_timeout: Duration,
    /// How often the loop checks whether the voice connection is still playing.
    pub(crate) poll_interval: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Default)]
struct PlayerState {
    queue: VecDeque<Track>,
    now_playing: Option<Track>,
    running: bool,
    session: CancellationToken,
    /// Cancelled once the session's loop task has returned.
    finished: CancellationToken,
    task: Option<JoinHandle<()>>,
}

enum Next {
    Track(Track),
    Stopped,
    Idle,
}

#[derive(Debug)]
enum Exit {
    Stopped,
    IdleTimeout,
}

pub(crate) struct Player {
    guild_id: Id<GuildMarker>,
    voice: Arc<dyn VoiceConnection>,
    settings: PlayerSettings,
    state: Mutex<PlayerState>,
    track_added: Notify,
}

impl Player {
    pub(crate) fn new(
        guild_id: Id<GuildMarker>,
        voice: Arc<dyn VoiceConnection>,
        settings: PlayerSettings,
    ) -> Self {
        Self {
            guild_id,
            voice,
            settings,
            state: Mutex::new(PlayerState::default()),
            track_added: Notify::new(),
        }
    }

    /// Appends `track` to the queue and makes sure a loop is running.
    pub(crate) fn enqueue(self: &Arc<Self>, track: Track) {
        {
            let mut state = self.state.lock();
            debug!(guild_id = %self.guild_id, title = %track.title, position = state.queue.len(), "enqueue");
            state.queue.push_back(track);
            self.start_locked(&mut state);
        }
        self.track_added.notify_one();
    }

    /// Starts the playback loop unless one is already running.
    pub(crate) fn start(self: &Arc<Self>) {
        let mut state = self.state.lock();
        self.start_locked(&mut state);
    }

    fn start_locked(self: &Arc<Self>, state: &mut PlayerState) {
        if state.running {
            return;
        }
        state.running = true;
        state.session = CancellationToken::new();
        state.finished = CancellationToken::new();

        let session = state.session.clone();
        let finished = state.finished.clone();
        let previous = state.task.take();
        let player = Arc::clone(self);
        state.task = Some(tokio::spawn(async move {
            let _finished = finished.drop_guard();
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            info!(guild_id = %player.guild_id, "playback loop started");
            let exit = player.run(&session).await;
            info!(guild_id = %player.guild_id, ?exit, "playback loop ended");
        }));
    }

    /// Ends the current session and discards the queue. Returns once the
    /// session's loop has halted its track.
    pub(crate) async fn stop(&self) {
        let finished = {
            let mut state = self.state.lock();
            let was_running = state.running;
            state.session.cancel();
            state.running = false;
            state.now_playing = None;
            let dropped = state.queue.len();
            state.queue.clear();
            if !was_running {
                return;
            }
            info!(guild_id = %self.guild_id, dropped, "stopping playback");
            state.finished.clone()
        };
        // only the loop halts audio; a track started by a later session is not ours to stop
        finished.cancelled().await;
    }

    /// Ends the current track; the loop moves on to the next one.
    pub(crate) async fn skip(&self) -> bool {
        if self.now_playing().is_none() {
            return false;
        }
        self.voice.stop().await;
        true
    }

    pub(crate) async fn pause(&self) -> Result<(), VoiceError> {
        if self.now_playing().is_none() || !self.voice.is_playing().await {
            return Err(VoiceError::NothingPlaying);
        }
        self.voice.pause().await
    }

    pub(crate) async fn resume(&self) -> Result<(), VoiceError> {
        if !self.voice.is_paused().await {
            return Err(VoiceError::NothingPlaying);
        }
        self.voice.resume().await
    }

    pub(crate) fn current_queue(&self) -> Vec<Track> {
        self.state.lock().queue.iter().cloned().collect()
    }

    pub(crate) fn now_playing(&self) -> Option<Track> {
        self.state.lock().now_playing.clone()
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state.lock().running
    }

    async fn run(&self, session: &CancellationToken) -> Exit {
        loop {
            let track = match self.next_track(session).await {
                Next::Track(track) => track,
                Next::Stopped => return Exit::Stopped,
                Next::Idle => match self.leave_idle(session).await {
                    Some(exit) => return exit,
                    None => continue,
                },
            };

            if !self.voice.is_connected().await {
                debug!(guild_id = %self.guild_id, title = %track.title, "no voice connection, dropping track");
                continue;
            }

            {
                let mut state = self.state.lock();
                if session.is_cancelled() {
                    return Exit::Stopped;
                }
                state.now_playing = Some(track.clone());
            }

            if !self.play(&track, session).await {
                return Exit::Stopped;
            }

            let mut state = self.state.lock();
            if session.is_cancelled() {
                return Exit::Stopped;
            }
            state.now_playing = None;
        }
    }

    async fn next_track(&self, session: &CancellationToken) -> Next {
        let deadline = Instant::now() + self.settings.idle_timeout;
        loop {
            {
                let mut state = self.state.lock();
                if session.is_cancelled() {
                    return Next::Stopped;
                }
                if let Some(track) = state.queue.pop_front() {
                    return Next::Track(track);
                }
            }

            tokio::select! {
                biased;
                _ = session.cancelled() => return Next::Stopped,
                _ = self.track_added.notified() => {}
                _ = sleep_until(deadline) => {
                    let mut state = self.state.lock();
                    if session.is_cancelled() {
                        return Next::Stopped;
                    }
                    if let Some(track) = state.queue.pop_front() {
                        return Next::Track(track);
                    }
                    return Next::Idle;
                }
            }
        }
    }

    /// Handles an idle timeout. The session stays running until the decision
    /// is made, so tracks enqueued meanwhile land in this loop; `None` means
    /// such a track arrived and the loop should carry on.
    async fn leave_idle(&self, session: &CancellationToken) -> Option<Exit> {
        let connected = self.voice.is_connected().await;
        let audible =
            connected && (self.voice.is_playing().await || self.voice.is_paused().await);
        {
            let mut state = self.state.lock();
            if session.is_cancelled() {
                return Some(Exit::Stopped);
            }
            if !state.queue.is_empty() {
                return None;
            }
            if !connected || audible {
                state.running = false;
                return Some(Exit::IdleTimeout);
            }
        }

        info!(guild_id = %self.guild_id, "idle timeout, leaving voice channel");
        if let Err(error) = self.voice.disconnect().await {
            warn!(guild_id = %self.guild_id, %error, "could not leave voice channel");
        }

        let mut state = self.state.lock();
        if session.is_cancelled() {
            return Some(Exit::Stopped);
        }
        if !state.queue.is_empty() {
            return None;
        }
        state.running = false;
        Some(Exit::IdleTimeout)
    }

    /// Plays one track to its end. Returns `false` if the session was stopped.
    async fn play(&self, track: &Track, session: &CancellationToken) -> bool {
        let (on_finish, mut finished) = PlaybackFinished::channel();
        if let Err(error) = self.voice.play(&track.stream_url, on_finish).await {
            warn!(guild_id = %self.guild_id, title = %track.title, %error, "playback failed to start");
            return !session.is_cancelled();
        }
        info!(guild_id = %self.guild_id, title = %track.title, url = %track.url, "now playing");

        let period = self.settings.poll_interval;
        let mut poll = interval_at(Instant::now() + period, period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = session.cancelled() => {
                    self.voice.stop().await;
                    return false;
                }
                end = &mut finished => {
                    match end {
                        Ok(PlaybackEnd::Errored(reason)) => {
                            warn!(guild_id = %self.guild_id, title = %track.title, %reason, "playback interrupted");
                        }
                        _ => debug!(guild_id = %self.guild_id, title = %track.title, "track finished"),
                    }
                    return true;
                }
                _ = poll.tick() => {
                    if !self.voice.is_playing().await && !self.voice.is_paused().await {
                        debug!(guild_id = %self.guild_id, title = %track.title, "voice connection went quiet");
                        return true;
                    }
                }
            }
        }
    }
}
