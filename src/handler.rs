use crate::commands::{
    join, leave, leave_if_alone, now_playing, pause, play, playlist, queue, resume, skip, stop,
};
use crate::interaction_commands::InteractionCommand;
use crate::state::State;
use futures::Future;
use std::sync::Arc;
use tracing::debug;
use twilight_gateway::Event;
use twilight_model::application::interaction::application_command::CommandData;
use twilight_model::application::interaction::InteractionData;
use twilight_model::id::{marker::GuildMarker, Id};

fn spawn(fut: impl Future<Output = anyhow::Result<()>> + Send + 'static) {
    tokio::spawn(async move {
        if let Err(why) = fut.await {
            tracing::debug!("handler error: {:?}", why);
        }
    });
}

/// Interactions carry a reply token, so only the routing fields are logged.
fn log_command(guild_id: Option<Id<GuildMarker>>, command: &CommandData) {
    debug!(?guild_id, command = %command.name, "command received");
}

pub(crate) struct Handler {
    state: State,
}

impl Handler {
    pub(crate) fn new(state: State) -> Self {
        Self { state }
    }

    pub(crate) fn act(&self, event: Event) {
        match event {
            Event::VoiceStateUpdate(update) => {
                if let Some(guild_id) = update.guild_id {
                    spawn(leave_if_alone(guild_id, Arc::clone(&self.state)));
                }
            }
            Event::InteractionCreate(interaction) => {
                let Some(InteractionData::ApplicationCommand(command)) = &interaction.data else {
                    return;
                };
                log_command(interaction.guild_id, command);
                let interaction_command = InteractionCommand::from(command.as_ref());
                debug!("{:?}", interaction_command);

                let state = Arc::clone(&self.state);
                match interaction_command {
                    InteractionCommand::Play(query) => spawn(play(interaction, state, query)),
                    InteractionCommand::Playlist(url) => spawn(playlist(interaction, state, url)),
                    InteractionCommand::Stop => spawn(stop(interaction, state)),
                    InteractionCommand::Pause => spawn(pause(interaction, state)),
                    InteractionCommand::Skip => spawn(skip(interaction, state)),
                    InteractionCommand::Resume => spawn(resume(interaction, state)),
                    InteractionCommand::Leave => spawn(leave(interaction, state)),
                    InteractionCommand::Join => spawn(join(interaction, state)),
                    InteractionCommand::Queue => spawn(queue(interaction, state)),
                    InteractionCommand::NowPlaying => spawn(now_playing(interaction, state)),
                    InteractionCommand::NotImplemented => {}
                }
            }
            event => {
                tracing::trace!("unhandled event: {:?}", event.kind());
            }
        }
    }
}
