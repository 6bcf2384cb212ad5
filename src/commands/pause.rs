use super::reply;
use crate::state::State;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn pause(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "pause command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let paused = match state.players.get(guild_id) {
        Some(player) => player.pause().await.is_ok(),
        None => false,
    };
    let message = if paused { "Paused." } else { "Nothing is playing." };
    reply(&state, &interaction, message).await
}
