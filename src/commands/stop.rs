use super::reply;
use crate::state::State;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub(crate) async fn stop(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "stop command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    state.players.stop(guild_id).await;

    reply(&state, &interaction, "Stopped and cleared the queue.").await
}
