use super::reply;
use crate::state::State;
use tracing::{debug, warn};
use twilight_model::{
    application::interaction::Interaction,
    gateway::payload::incoming::InteractionCreate,
    id::{marker::ChannelMarker, Id},
};

/// Outcome of making sure the bot sits in the caller's voice channel.
pub(crate) enum VoiceCheck {
    Connected(Id<ChannelMarker>),
    NotInVoice,
    JoinFailed,
}

impl VoiceCheck {
    pub(crate) fn refusal(&self) -> Option<&'static str> {
        match self {
            VoiceCheck::Connected(_) => None,
            VoiceCheck::NotInVoice => Some("You need to be in a voice channel first."),
            VoiceCheck::JoinFailed => Some("I couldn't connect to the voice channel."),
        }
    }
}

pub(crate) async fn ensure_voice(
    interaction: &Interaction,
    state: &State,
) -> anyhow::Result<VoiceCheck> {
    let (Some(guild_id), Some(user_id)) = (interaction.guild_id, interaction.author_id()) else {
        return Ok(VoiceCheck::NotInVoice);
    };
    let Some(channel_id) = state
        .cache
        .voice_state(user_id, guild_id)
        .map(|voice_state| voice_state.channel_id())
    else {
        return Ok(VoiceCheck::NotInVoice);
    };

    if let Some(call_lock) = state.songbird.get(guild_id) {
        let call = call_lock.lock().await;
        if call.current_connection().is_some()
            && call.current_channel() == Some(channel_id.into_nonzero().into())
        {
            return Ok(VoiceCheck::Connected(channel_id));
        }
    }

    debug!("joining voice channel {} in guild {}", channel_id, guild_id);
    let call_lock = match state.songbird.join(guild_id, channel_id.into_nonzero()).await {
        Ok(call_lock) => call_lock,
        Err(error) => {
            warn!(%guild_id, %channel_id, %error, "could not join voice channel");
            return Ok(VoiceCheck::JoinFailed);
        }
    };

    // signal that we are not listening
    let mut call = call_lock.lock().await;
    call.deafen(true).await?;

    Ok(VoiceCheck::Connected(channel_id))
}

pub(crate) async fn join(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "join command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );

    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let channel_id = match ensure_voice(&interaction, &state).await? {
        VoiceCheck::Connected(channel_id) => channel_id,
        check => {
            let refusal = check.refusal().unwrap_or_default();
            return reply(&state, &interaction, refusal).await;
        }
    };

    let name = state
        .cache
        .channel(channel_id)
        .and_then(|channel| channel.name.clone())
        .unwrap_or_else(|| "the voice channel".to_string());
    state.players.get_or_create(guild_id).start();

    reply(&state, &interaction, format!("Joined **{name}**.")).await
}
