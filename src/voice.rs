use async_trait::async_trait;
use parking_lot::Mutex;
use songbird::error::JoinError;
use songbird::input::{HttpRequest, Input};
use songbird::tracks::{ControlError, PlayMode, TrackHandle};
use songbird::{Event, EventContext, EventHandler, Songbird, TrackEvent};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;
use twilight_model::id::{marker::GuildMarker, Id};

#[derive(Debug, thiserror::Error)]
pub(crate) enum VoiceError {
    #[error("not connected to a voice channel")]
    NotConnected,
    #[error("nothing is playing")]
    NothingPlaying,
    #[error("track control failed: {0}")]
    Control(#[from] ControlError),
    #[error("voice connection failed: {0}")]
    Join(#[from] JoinError),
}

/// How a track left the voice connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlaybackEnd {
    Finished,
    Errored(String),
}

/// One-shot completion signal handed to [`VoiceConnection::play`].
///
/// The voice side may call [`PlaybackFinished::notify`] from any context and
/// any number of times; only the first call is delivered. The playback loop
/// awaits the paired receiver and performs the state transition itself.
pub(crate) struct PlaybackFinished {
    tx: Mutex<Option<oneshot::Sender<PlaybackEnd>>>,
}

impl PlaybackFinished {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<PlaybackEnd>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub(crate) fn notify(&self, end: PlaybackEnd) {
        if let Some(tx) = self.tx.lock().take() {
            // the loop may already have moved on
            let _ = tx.send(end);
        }
    }
}

/// The per-guild voice capability set the player depends on.
#[async_trait]
pub(crate) trait VoiceConnection: Send + Sync {
    async fn is_connected(&self) -> bool;
    async fn is_playing(&self) -> bool;
    async fn is_paused(&self) -> bool;
    async fn play(&self, stream_url: &str, on_finish: PlaybackFinished) -> Result<(), VoiceError>;
    async fn pause(&self) -> Result<(), VoiceError>;
    async fn resume(&self) -> Result<(), VoiceError>;
    /// Halts the current track, if any.
    async fn stop(&self);
    async fn disconnect(&self) -> Result<(), VoiceError>;
}

/// Hands out the voice connection object for a guild.
pub(crate) trait VoiceProvider: Send + Sync {
    fn connection(&self, guild_id: Id<GuildMarker>) -> Arc<dyn VoiceConnection>;
}

pub(crate) struct SongbirdVoices {
    songbird: Arc<Songbird>,
    client: reqwest::Client,
}

impl SongbirdVoices {
    pub(crate) fn new(songbird: Arc<Songbird>, client: reqwest::Client) -> Self {
        Self { songbird, client }
    }
}

impl VoiceProvider for SongbirdVoices {
    fn connection(&self, guild_id: Id<GuildMarker>) -> Arc<dyn VoiceConnection> {
        Arc::new(SongbirdVoice {
            guild_id,
            songbird: Arc::clone(&self.songbird),
            client: self.client.clone(),
            current: Mutex::new(None),
        })
    }
}

pub(crate) struct SongbirdVoice {
    guild_id: Id<GuildMarker>,
    songbird: Arc<Songbird>,
    client: reqwest::Client,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdVoice {
    async fn play_mode(&self) -> Option<PlayMode> {
        let handle = self.current.lock().clone()?;
        handle.get_info().await.ok().map(|info| info.playing)
    }

    fn current(&self) -> Result<TrackHandle, VoiceError> {
        self.current.lock().clone().ok_or(VoiceError::NothingPlaying)
    }
}

#[async_trait]
impl VoiceConnection for SongbirdVoice {
    async fn is_connected(&self) -> bool {
        match self.songbird.get(self.guild_id) {
            Some(call_lock) => call_lock.lock().await.current_connection().is_some(),
            None => false,
        }
    }

    async fn is_playing(&self) -> bool {
        matches!(self.play_mode().await, Some(PlayMode::Play))
    }

    async fn is_paused(&self) -> bool {
        matches!(self.play_mode().await, Some(PlayMode::Pause))
    }

    async fn play(&self, stream_url: &str, on_finish: PlaybackFinished) -> Result<(), VoiceError> {
        let call_lock = self
            .songbird
            .get(self.guild_id)
            .ok_or(VoiceError::NotConnected)?;
        let input: Input = HttpRequest::new(self.client.clone(), stream_url.to_string()).into();
        let handle = {
            let mut call = call_lock.lock().await;
            call.play_input(input)
        };

        let on_finish = Arc::new(on_finish);
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle.add_event(
                Event::Track(event),
                TrackEndNotifier {
                    on_finish: Arc::clone(&on_finish),
                },
            )?;
        }
        *self.current.lock() = Some(handle);
        Ok(())
    }

    async fn pause(&self) -> Result<(), VoiceError> {
        self.current()?.pause()?;
        Ok(())
    }

    async fn resume(&self) -> Result<(), VoiceError> {
        self.current()?.play()?;
        Ok(())
    }

    async fn stop(&self) {
        let handle = self.current.lock().take();
        if let Some(handle) = handle {
            if let Err(error) = handle.stop() {
                debug!(guild_id = %self.guild_id, ?error, "track already gone");
            }
        }
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        self.stop().await;
        self.songbird.leave(self.guild_id).await?;
        Ok(())
    }
}

struct TrackEndNotifier {
    on_finish: Arc<PlaybackFinished>,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let EventContext::Track(track_list) = ctx else {
            return None;
        };
        let end = match track_list.first() {
            Some((state, _)) => match &state.playing {
                PlayMode::Errored(error) => PlaybackEnd::Errored(format!("{error:?}")),
                _ => PlaybackEnd::Finished,
            },
            None => PlaybackEnd::Finished,
        };
        self.on_finish.notify(end);
        None
    }
}
