use twilight_model::id::{marker::UserMarker, Id};

/// A resolved, playable unit. Created once by the resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Track {
    pub(crate) title: String,
    /// Canonical page URL, used for display.
    pub(crate) url: String,
    /// Direct media URL handed to the voice connection. May expire.
    pub(crate) stream_url: String,
    pub(crate) requester: Id<UserMarker>,
}

impl Track {
    pub(crate) fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        stream_url: impl Into<String>,
        requester: Id<UserMarker>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            stream_url: stream_url.into(),
            requester,
        }
    }
}
