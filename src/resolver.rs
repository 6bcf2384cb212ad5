use crate::track::Track;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};
use twilight_model::id::{marker::UserMarker, Id};
use url::Url;

const UNKNOWN_TITLE: &str = "Unknown title";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ResolveError {
    #[error("could not run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
    #[error("No results found.")]
    NoResults,
    #[error("No audio stream found.")]
    NoAudioStream,
    #[error("That doesn't look like a playlist.")]
    NotAPlaylist,
    #[error("unexpected yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Turns user queries into playable tracks.
#[async_trait]
pub(crate) trait Resolver: Send + Sync {
    /// Resolves a URL or a free-text search to a single track.
    async fn resolve(&self, query: &str, requester: Id<UserMarker>) -> Result<Track, ResolveError>;

    /// Resolves every entry of a playlist, in playlist order.
    async fn resolve_playlist(
        &self,
        url: &str,
        requester: Id<UserMarker>,
    ) -> Result<Vec<Track>, ResolveError>;
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    #[serde(default)]
    formats: Vec<Format>,
}

#[derive(Debug, Deserialize)]
struct Format {
    url: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    abr: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    #[serde(rename = "_type")]
    kind: Option<String>,
    title: Option<String>,
    webpage_url: Option<String>,
    url: Option<String>,
    vcodec: Option<String>,
}

/// Resolver backed by the `yt-dlp` executable.
pub(crate) struct YtDlp {
    program: String,
    max_playlist_size: usize,
}

impl YtDlp {
    pub(crate) fn new(program: impl Into<String>, max_playlist_size: usize) -> Self {
        Self {
            program: program.into(),
            max_playlist_size,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, ResolveError> {
        debug!("running {} {:?}", self.program, args);
        let output = Command::new(&self.program).args(args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::Failed(failure_reason(&stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Resolver for YtDlp {
    async fn resolve(&self, query: &str, requester: Id<UserMarker>) -> Result<Track, ResolveError> {
        let target = search_target(query);
        let stdout = self
            .run(&["-j", "--no-playlist", "-f", "bestaudio/best", &target])
            .await?;
        parse_track(&stdout, requester)
    }

    async fn resolve_playlist(
        &self,
        url: &str,
        requester: Id<UserMarker>,
    ) -> Result<Vec<Track>, ResolveError> {
        let stdout = self.run(&["--flat-playlist", "-j", url]).await?;
        let entries = parse_playlist(&stdout);
        if entries.is_empty() {
            return Err(ResolveError::NotAPlaylist);
        }

        let mut tracks = Vec::new();
        for entry in entries.into_iter().take(self.max_playlist_size) {
            let page_url = entry.webpage_url.or_else(|| entry.url.clone());
            let title = entry.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());

            // flat entries that already point at an audio stream need no second lookup
            if let (Some(stream_url), Some("none")) = (&entry.url, entry.vcodec.as_deref()) {
                let url = page_url.unwrap_or_else(|| stream_url.clone());
                tracks.push(Track::new(title, url, stream_url.clone(), requester));
                continue;
            }

            let Some(page_url) = page_url else {
                continue;
            };
            match self.resolve(&page_url, requester).await {
                Ok(track) => tracks.push(Track::new(title, page_url, track.stream_url, requester)),
                Err(error) => warn!(%page_url, %error, "skipping playlist entry"),
            }
        }

        if tracks.is_empty() {
            return Err(ResolveError::NoResults);
        }
        Ok(tracks)
    }
}

fn search_target(query: &str) -> String {
    if Url::parse(query).is_err() {
        format!("ytsearch:{query}")
    } else {
        query.to_string()
    }
}

fn failure_reason(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "yt-dlp failed".to_string())
}

fn parse_track(stdout: &str, requester: Id<UserMarker>) -> Result<Track, ResolveError> {
    let line = stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(ResolveError::NoResults)?;
    let info: VideoInfo = serde_json::from_str(line)?;

    let stream_url = match info.url.clone() {
        Some(url) => url,
        None => best_audio_format(&info.formats).ok_or(ResolveError::NoAudioStream)?,
    };
    let url = info
        .webpage_url
        .or(info.url)
        .unwrap_or_else(|| stream_url.clone());
    let title = info.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    Ok(Track::new(title, url, stream_url, requester))
}

fn best_audio_format(formats: &[Format]) -> Option<String> {
    formats
        .iter()
        .filter(|format| {
            format.acodec.as_deref().is_some_and(|codec| codec != "none")
                && format.vcodec.as_deref() == Some("none")
        })
        .filter_map(|format| Some((format.url.as_ref()?, format.abr.unwrap_or(0.0))))
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(url, _)| url.clone())
}

/// Flat playlist entries only; a plain video URL yields none.
fn parse_playlist(stdout: &str) -> Vec<PlaylistEntry> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<PlaylistEntry>(line) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(%error, "skipping unparsable playlist entry");
                None
            }
        })
        .filter(|entry| matches!(entry.kind.as_deref(), Some("url" | "url_transparent")))
        .collect()
}
