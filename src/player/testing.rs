//! In-memory voice connection for player tests.

use crate::track::Track;
use crate::voice::{PlaybackEnd, PlaybackFinished, VoiceConnection, VoiceError, VoiceProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use twilight_model::id::{marker::GuildMarker, Id};

pub(crate) fn track(title: &str) -> Track {
    Track::new(
        title,
        format!("https://example.com/watch/{title}"),
        format!("https://cdn.example.com/{title}"),
        Id::new(7),
    )
}

#[derive(Default)]
struct Inner {
    connected: bool,
    playing: bool,
    paused: bool,
    reject_next: bool,
    pending: Option<PlaybackFinished>,
    played: Vec<String>,
    stops: usize,
    disconnects: usize,
    active: usize,
    max_active: usize,
    stop_delay: Option<Duration>,
    connected_check_delay: Option<Duration>,
}

/// Records every call. In instant mode each track ends as soon as it starts;
/// otherwise a track plays until the test finishes, fails or stops it.
pub(crate) struct FakeVoice {
    instant: bool,
    inner: Mutex<Inner>,
}

impl FakeVoice {
    fn build(instant: bool, connected: bool) -> Arc<Self> {
        Arc::new(Self {
            instant,
            inner: Mutex::new(Inner {
                connected,
                ..Default::default()
            }),
        })
    }

    pub(crate) fn instant() -> Arc<Self> {
        Self::build(true, true)
    }

    pub(crate) fn held() -> Arc<Self> {
        Self::build(false, true)
    }

    pub(crate) fn disconnected() -> Arc<Self> {
        Self::build(true, false)
    }

    pub(crate) fn connect(&self) {
        self.inner.lock().connected = true;
    }

    pub(crate) fn reject_next_play(&self) {
        self.inner.lock().reject_next = true;
    }

    /// The next `stop` call suspends for `delay` before it takes effect.
    pub(crate) fn slow_next_stop(&self, delay: Duration) {
        self.inner.lock().stop_delay = Some(delay);
    }

    /// Every `is_connected` call suspends for `delay` before answering.
    pub(crate) fn slow_connected_checks(&self, delay: Duration) {
        self.inner.lock().connected_check_delay = Some(delay);
    }

    /// Reports paused audio that no player session owns.
    pub(crate) fn report_paused(&self) {
        let mut inner = self.inner.lock();
        inner.playing = false;
        inner.paused = true;
    }

    pub(crate) fn finish_current(&self) {
        self.end_current(PlaybackEnd::Finished);
    }

    pub(crate) fn fail_current(&self, reason: &str) {
        self.end_current(PlaybackEnd::Errored(reason.to_string()));
    }

    /// Stops reporting playback without sending the completion signal.
    pub(crate) fn go_quiet(&self) {
        let mut inner = self.inner.lock();
        inner.playing = false;
        inner.paused = false;
    }

    fn end_current(&self, end: PlaybackEnd) {
        let pending = {
            let mut inner = self.inner.lock();
            inner.playing = false;
            inner.paused = false;
            inner.pending.take()
        };
        if let Some(pending) = pending {
            pending.notify(end);
        }
    }

    pub(crate) fn played(&self) -> Vec<String> {
        self.inner.lock().played.clone()
    }

    pub(crate) fn is_playing_now(&self) -> bool {
        self.inner.lock().playing
    }

    pub(crate) fn stops(&self) -> usize {
        self.inner.lock().stops
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.inner.lock().disconnects
    }

    pub(crate) fn max_concurrent_plays(&self) -> usize {
        self.inner.lock().max_active
    }
}

#[async_trait]
impl VoiceConnection for FakeVoice {
    async fn is_connected(&self) -> bool {
        let delay = self.inner.lock().connected_check_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock().connected
    }

    async fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    async fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    async fn play(&self, stream_url: &str, on_finish: PlaybackFinished) -> Result<(), VoiceError> {
        {
            let mut inner = self.inner.lock();
            if !inner.connected {
                return Err(VoiceError::NotConnected);
            }
            if inner.reject_next {
                inner.reject_next = false;
                return Err(VoiceError::NotConnected);
            }
            inner.active += 1;
            inner.max_active = inner.max_active.max(inner.active);
            let title = stream_url.rsplit('/').next().unwrap_or(stream_url);
            inner.played.push(title.to_string());
        }
        tokio::task::yield_now().await;

        let mut inner = self.inner.lock();
        inner.active -= 1;
        if self.instant {
            drop(inner);
            on_finish.notify(PlaybackEnd::Finished);
        } else {
            inner.playing = true;
            inner.paused = false;
            inner.pending = Some(on_finish);
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), VoiceError> {
        let mut inner = self.inner.lock();
        if !inner.playing {
            return Err(VoiceError::NothingPlaying);
        }
        inner.playing = false;
        inner.paused = true;
        Ok(())
    }

    async fn resume(&self) -> Result<(), VoiceError> {
        let mut inner = self.inner.lock();
        if !inner.paused {
            return Err(VoiceError::NothingPlaying);
        }
        inner.playing = true;
        inner.paused = false;
        Ok(())
    }

    async fn stop(&self) {
        let delay = self.inner.lock().stop_delay.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock().stops += 1;
        self.end_current(PlaybackEnd::Finished);
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        let mut inner = self.inner.lock();
        inner.connected = false;
        inner.playing = false;
        inner.disconnects += 1;
        Ok(())
    }
}

/// Hands out instant-finishing fakes and counts how many were created.
#[derive(Default)]
pub(crate) struct FakeVoices {
    created: AtomicUsize,
}

impl FakeVoices {
    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl VoiceProvider for FakeVoices {
    fn connection(&self, _guild_id: Id<GuildMarker>) -> Arc<dyn VoiceConnection> {
        self.created.fetch_add(1, Ordering::SeqCst);
        FakeVoice::instant()
    }
}
