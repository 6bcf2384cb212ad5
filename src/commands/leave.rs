use super::reply;
use crate::state::State;
use anyhow::Context;
use twilight_model::{
    gateway::payload::incoming::InteractionCreate,
    id::{marker::GuildMarker, Id},
};

/// Leaves voice when the bot is the last member of its channel.
pub(crate) async fn leave_if_alone(guild_id: Id<GuildMarker>, state: State) -> anyhow::Result<()> {
    let count = {
        let user = state
            .cache
            .current_user()
            .context("Cannot get current user")?;
        let Some(user_voice_state) = state.cache.voice_state(user.id, guild_id) else {
            return Ok(());
        };
        state
            .cache
            .voice_channel_states(user_voice_state.channel_id())
            .context("Cannot get voice channel")?
            .count()
    };

    // count is 1 if the bot is the only one in the channel
    if count == 1 {
        tracing::info!(%guild_id, "alone in voice channel, leaving");
        leave_channel(guild_id, &state).await?;
    }
    Ok(())
}

/// Stops the guild's player and leaves voice. Returns whether the bot was connected.
pub(crate) async fn leave_channel(guild_id: Id<GuildMarker>, state: &State) -> anyhow::Result<bool> {
    state.players.stop(guild_id).await;
    if state.songbird.get(guild_id).is_none() {
        return Ok(false);
    }
    state.songbird.leave(guild_id).await?;
    Ok(true)
}

pub(crate) async fn leave(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "leave command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let message = if leave_channel(guild_id, &state).await? {
        "Left the voice channel."
    } else {
        "I'm not in a voice channel."
    };
    reply(&state, &interaction, message).await
}
