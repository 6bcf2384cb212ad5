mod join;
pub(crate) use join::{ensure_voice, join};

mod leave;
pub(crate) use leave::{leave, leave_if_alone};

mod pause;
pub(crate) use pause::pause;

mod skip;
pub(crate) use skip::skip;

mod play;
pub(crate) use play::play;

mod playlist;
pub(crate) use playlist::playlist;

mod queue;
pub(crate) use queue::{now_playing, queue};

mod resume;
pub(crate) use resume::resume;

mod stop;
pub(crate) use stop::stop;

use crate::state::State;
use twilight_model::application::command::CommandType;
use twilight_model::application::interaction::Interaction;
use twilight_model::channel::message::Embed;
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_util::builder::command::{CommandBuilder, StringBuilder};
use twilight_util::builder::InteractionResponseDataBuilder;

pub(crate) fn get_chat_commands() -> Vec<twilight_model::application::command::Command> {
    vec![
        CommandBuilder::new("join", "Join your voice channel", CommandType::ChatInput).build(),
        CommandBuilder::new("leave", "Leave the voice channel", CommandType::ChatInput).build(),
        CommandBuilder::new("skip", "Skip the current track", CommandType::ChatInput).build(),
        CommandBuilder::new("queue", "Show queued tracks", CommandType::ChatInput).build(),
        CommandBuilder::new("np", "Show the track that is playing", CommandType::ChatInput)
            .build(),
        CommandBuilder::new("stop", "Stop and clear the queue", CommandType::ChatInput).build(),
        CommandBuilder::new("pause", "Pause playback", CommandType::ChatInput).build(),
        CommandBuilder::new("resume", "Resume playback", CommandType::ChatInput).build(),
        CommandBuilder::new("play", "Queue a song", CommandType::ChatInput)
            .option(StringBuilder::new("query", "URL or search terms").required(true))
            .build(),
        CommandBuilder::new("playlist", "Queue an entire playlist", CommandType::ChatInput)
            .option(StringBuilder::new("url", "URL of a playlist").required(true))
            .build(),
    ]
}

async fn respond(
    state: &State,
    interaction: &Interaction,
    kind: InteractionResponseType,
    data: Option<InteractionResponseData>,
) -> anyhow::Result<()> {
    let response = InteractionResponse { kind, data };
    state
        .http
        .interaction(interaction.application_id)
        .create_response(interaction.id, &interaction.token, &response)
        .await?;
    Ok(())
}

pub(crate) async fn reply(
    state: &State,
    interaction: &Interaction,
    content: impl Into<String>,
) -> anyhow::Result<()> {
    let data = InteractionResponseDataBuilder::new().content(content).build();
    respond(
        state,
        interaction,
        InteractionResponseType::ChannelMessageWithSource,
        Some(data),
    )
    .await
}

pub(crate) async fn reply_embed(
    state: &State,
    interaction: &Interaction,
    embed: Embed,
) -> anyhow::Result<()> {
    let data = InteractionResponseDataBuilder::new()
        .embeds([embed])
        .build();
    respond(
        state,
        interaction,
        InteractionResponseType::ChannelMessageWithSource,
        Some(data),
    )
    .await
}

/// Acknowledges a command whose answer takes a while; finish with [`follow_up`].
pub(crate) async fn defer(state: &State, interaction: &Interaction) -> anyhow::Result<()> {
    respond(
        state,
        interaction,
        InteractionResponseType::DeferredChannelMessageWithSource,
        None,
    )
    .await
}

pub(crate) async fn follow_up(
    state: &State,
    interaction: &Interaction,
    content: &str,
) -> anyhow::Result<()> {
    state
        .http
        .interaction(interaction.application_id)
        .update_response(&interaction.token)
        .content(Some(content))
        .await?;
    Ok(())
}
