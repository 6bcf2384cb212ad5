use twilight_model::application::interaction::application_command::{
    CommandData, CommandOptionValue,
};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum InteractionCommand {
    Play(String),
    Playlist(String),
    Stop,
    Pause,
    Skip,
    Resume,
    Leave,
    Join,
    Queue,
    NowPlaying,
    NotImplemented,
}

fn string_option(command: &CommandData, name: &str) -> Option<String> {
    let option = command.options.iter().find(|opt| opt.name == name)?;
    match &option.value {
        CommandOptionValue::String(value) => Some(value.clone()),
        _ => None,
    }
}

impl From<&CommandData> for InteractionCommand {
    fn from(command: &CommandData) -> InteractionCommand {
        match command.name.as_str() {
            "play" => string_option(command, "query")
                .map(InteractionCommand::Play)
                .unwrap_or(InteractionCommand::NotImplemented),
            "playlist" => string_option(command, "url")
                .map(InteractionCommand::Playlist)
                .unwrap_or(InteractionCommand::NotImplemented),
            "stop" => InteractionCommand::Stop,
            "pause" => InteractionCommand::Pause,
            "skip" => InteractionCommand::Skip,
            "resume" => InteractionCommand::Resume,
            "leave" => InteractionCommand::Leave,
            "join" => InteractionCommand::Join,
            "queue" => InteractionCommand::Queue,
            "np" => InteractionCommand::NowPlaying,
            _ => InteractionCommand::NotImplemented,
        }
    }
}
