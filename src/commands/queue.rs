use super::reply_embed;
use crate::colors;
use crate::state::State;
use crate::track::Track;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::embed::EmbedBuilder;

pub(crate) const TRACKS_SHOWN: usize = 15;

fn format_queue(queue: &[Track]) -> String {
    if queue.is_empty() {
        return "The queue is empty.".to_string();
    }
    let mut message = String::from("**Queue:**\n");
    for (i, track) in queue.iter().take(TRACKS_SHOWN).enumerate() {
        message.push_str(&format!("{}. [{}]({})\n", i + 1, track.title, track.url));
    }
    if queue.len() > TRACKS_SHOWN {
        message.push_str(&format!("…and {} more", queue.len() - TRACKS_SHOWN));
    }
    message.trim_end().to_string()
}

fn format_now_playing(track: Option<&Track>) -> String {
    match track {
        Some(track) => format!(
            "Now playing: **{}** — <{}>\nRequested by <@{}>",
            track.title, track.url, track.requester
        ),
        None => "Nothing is playing right now.".to_string(),
    }
}

pub(crate) async fn queue(interaction: Box<InteractionCreate>, state: State) -> anyhow::Result<()> {
    tracing::debug!(
        "queue command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let queue = state.players.current_queue(guild_id);
    let embed = EmbedBuilder::new()
        .description(format_queue(&queue))
        .color(colors::BLURPLE)
        .build();
    reply_embed(&state, &interaction, embed).await
}

pub(crate) async fn now_playing(
    interaction: Box<InteractionCreate>,
    state: State,
) -> anyhow::Result<()> {
    tracing::debug!(
        "np command in guild {:?} in channel {:?} by {:?}",
        interaction.guild_id,
        interaction.channel,
        interaction.author(),
    );
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let track = state.players.now_playing(guild_id);
    let embed = EmbedBuilder::new()
        .description(format_now_playing(track.as_ref()))
        .color(colors::GREEN)
        .build();
    reply_embed(&state, &interaction, embed).await
}
