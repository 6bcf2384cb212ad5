use super::reply;
use crate::state::State;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn resume(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "resume command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let resumed = match state.players.get(guild_id) {
        Some(player) => player.resume().await.is_ok(),
        None => false,
    };
    let message = if resumed { "Resumed." } else { "Nothing is paused." };
    reply(&state, &interaction, message).await
}
