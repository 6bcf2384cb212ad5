use super::{defer, ensure_voice, follow_up};
use crate::state::State;
use anyhow::Context;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn play(
    interaction: Box<InteractionCreate>,
    state: State,
    query: String,
) -> anyhow::Result<()> {
    tracing::debug!(
        "play command in guild {:?} in channel {:?} by {:?}: {}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
        query,
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };
    let requester = interaction.author_id().context("interaction has no author")?;

    defer(&state, &interaction).await?;

    if let Some(refusal) = ensure_voice(&interaction, &state).await?.refusal() {
        return follow_up(&state, &interaction, refusal).await;
    }

    let track = match state.resolver.resolve(&query, requester).await {
        Ok(track) => track,
        Err(error) => {
            let message = format!("Couldn't resolve that track: {error}");
            return follow_up(&state, &interaction, &message).await;
        }
    };

    let message = format!("Queued **{}** — <{}>", track.title, track.url);
    state.players.enqueue(guild_id, track);

    follow_up(&state, &interaction, &message).await
}
