use super::{defer, ensure_voice, follow_up};
use crate::resolver::ResolveError;
use crate::state::State;
use anyhow::Context;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn playlist(
    interaction: Box<InteractionCreate>,
    state: State,
    url: String,
) -> anyhow::Result<()> {
    tracing::debug!(
        "playlist command in guild {:?} in channel {:?} by {:?}: {}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
        url,
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };
    let requester = interaction.author_id().context("interaction has no author")?;

    defer(&state, &interaction).await?;

    if let Some(refusal) = ensure_voice(&interaction, &state).await?.refusal() {
        return follow_up(&state, &interaction, refusal).await;
    }

    let tracks = match state.resolver.resolve_playlist(&url, requester).await {
        Ok(tracks) => tracks,
        Err(error @ ResolveError::NotAPlaylist) => {
            return follow_up(&state, &interaction, &error.to_string()).await;
        }
        Err(error) => {
            let message = format!("Couldn't fetch playlist: {error}");
            return follow_up(&state, &interaction, &message).await;
        }
    };

    let added = tracks.len();
    let player = state.players.get_or_create(guild_id);
    for track in tracks {
        player.enqueue(track);
    }

    let message = format!("Queued **{added}** tracks from the playlist.");
    follow_up(&state, &interaction, &message).await
}
