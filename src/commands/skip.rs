use super::reply;
use crate::state::State;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn skip(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "skip command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let skipped = match state.players.get(guild_id) {
        Some(player) => player.skip().await,
        None => false,
    };
    let message = if skipped { "Skipped." } else { "Nothing to skip." };
    reply(&state, &interaction, message).await
}
