mod colors;
mod commands;
mod config;
mod handler;
mod interaction_commands;
mod player;
mod resolver;
mod signal;
mod state;
mod track;
mod voice;

use crate::commands::get_chat_commands;
use crate::config::Config;
use crate::handler::Handler;
use crate::player::PlayerRegistry;
use crate::resolver::YtDlp;
use crate::voice::SongbirdVoices;
use anyhow::Context;
use signal::signal_handler;
use songbird::{shards::TwilightMap, Songbird};
use state::{State, StateRef};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use twilight_cache_inmemory::InMemoryCache;
use twilight_gateway::{
    CloseFrame, Config as GatewayConfig, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt as _,
};
use twilight_http::Client as HttpClient;
use twilight_model::id::Id;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,music_bot=debug")),
        )
        .init();

    info!("Starting up...");

    let config = Config::from_env()?;

    let (shards, senders, state) = {
        let http = HttpClient::new(config.discord_token.clone());
        let user_id = http.current_user().await?.model().await?.id;
        let application_id =
            Id::new_checked(config.application_id).context("DISCORD_APP_ID must not be 0")?;
        let interaction_client = http.interaction(application_id);

        interaction_client
            .set_global_commands(&get_chat_commands())
            .await?;

        let intents = Intents::GUILDS | Intents::GUILD_VOICE_STATES;
        let gateway_config = GatewayConfig::new(config.discord_token.clone(), intents);
        let shards: Vec<Shard> =
            twilight_gateway::create_recommended(&http, gateway_config, |_, builder| {
                builder.build()
            })
            .await?
            .collect();
        let senders: Vec<MessageSender> = shards.iter().map(|s| s.sender()).collect();
        let songbird_senders = TwilightMap::new(
            shards
                .iter()
                .map(|s| (s.id().number(), s.sender()))
                .collect(),
        );
        let songbird = Arc::new(Songbird::twilight(Arc::new(songbird_senders), user_id));
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(3600))
            .build()
            .context("could not build http client")?;

        let voices = SongbirdVoices::new(Arc::clone(&songbird), client);
        let resolver = YtDlp::new(config.ytdlp_path.clone(), config.max_playlist_size);

        (
            shards,
            senders,
            Arc::new(StateRef {
                http,
                cache: InMemoryCache::new(),
                songbird,
                players: PlayerRegistry::new(Arc::new(voices), config.player_settings()),
                resolver: Arc::new(resolver),
            }),
        )
    };

    info!("Ready to receive events");

    let handler = Arc::new(Handler::new(Arc::clone(&state)));
    let runners: Vec<_> = shards
        .into_iter()
        .map(|shard| tokio::spawn(runner(shard, Arc::clone(&state), Arc::clone(&handler))))
        .collect();

    let mut stop_rx = signal_handler();
    let _ = stop_rx.changed().await;
    info!("Shutting down");

    for player in state.players.players() {
        if player.is_running() {
            player.stop().await;
        }
    }
    let guild_ids: Vec<_> = state.cache.iter().guilds().map(|guild| guild.id()).collect();
    for guild_id in guild_ids {
        if state.songbird.get(guild_id).is_some() {
            debug!("Leaving guild {:?}", guild_id);
            if let Err(error) = state.songbird.leave(guild_id).await {
                warn!(%guild_id, %error, "could not leave voice channel");
            }
        }
    }

    for sender in &senders {
        let _ = sender.close(CloseFrame::NORMAL);
    }
    for runner in runners {
        let _ = runner.await;
    }
    Ok(())
}

async fn runner(mut shard: Shard, state: State, handler: Arc<Handler>) {
    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                warn!(?source, "error receiving event");
                continue;
            }
        };
        debug!("Event: {:?}", event.kind());

        state.cache.update(&event);
        state.songbird.process(&event).await;

        handler.act(event);
    }
}
