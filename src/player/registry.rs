use super::{Player, PlayerSettings};
use crate::track::Track;
use crate::voice::VoiceProvider;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use twilight_model::id::{marker::GuildMarker, Id};

/// One [`Player`] per guild, created on first use and kept for the life of
/// the process.
pub(crate) struct PlayerRegistry {
    players: DashMap<Id<GuildMarker>, Arc<Player>>,
    voices: Arc<dyn VoiceProvider>,
    settings: PlayerSettings,
}

impl PlayerRegistry {
    pub(crate) fn new(voices: Arc<dyn VoiceProvider>, settings: PlayerSettings) -> Self {
        Self {
            players: DashMap::new(),
            voices,
            settings,
        }
    }

    pub(crate) fn get_or_create(&self, guild_id: Id<GuildMarker>) -> Arc<Player> {
        let player = self.players.entry(guild_id).or_insert_with(|| {
            debug!(%guild_id, "creating player");
            Arc::new(Player::new(
                guild_id,
                self.voices.connection(guild_id),
                self.settings,
            ))
        });
        Arc::clone(&player)
    }

    pub(crate) fn get(&self, guild_id: Id<GuildMarker>) -> Option<Arc<Player>> {
        self.players.get(&guild_id).map(|player| Arc::clone(&player))
    }

    pub(crate) fn players(&self) -> Vec<Arc<Player>> {
        self.players
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub(crate) fn enqueue(&self, guild_id: Id<GuildMarker>, track: Track) {
        self.get_or_create(guild_id).enqueue(track);
    }

    pub(crate) async fn stop(&self, guild_id: Id<GuildMarker>) {
        if let Some(player) = self.get(guild_id) {
            player.stop().await;
        }
    }

    pub(crate) fn current_queue(&self, guild_id: Id<GuildMarker>) -> Vec<Track> {
        self.get(guild_id)
            .map(|player| player.current_queue())
            .unwrap_or_default()
    }

    pub(crate) fn now_playing(&self, guild_id: Id<GuildMarker>) -> Option<Track> {
        self.get(guild_id)?.now_playing()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{track, FakeVoices};
    use super::*;
    use std::time::Duration;

    fn registry() -> (Arc<FakeVoices>, PlayerRegistry) {
        let voices = Arc::new(FakeVoices::default());
        let registry = PlayerRegistry::new(voices.clone(), PlayerSettings::default());
        (voices, registry)
    }

    #[test]
    fn same_guild_gets_same_player() {
        let (voices, registry) = registry();
        let first = registry.get_or_create(Id::new(1));
        let second = registry.get_or_create(Id::new(1));
        let other = registry.get_or_create(Id::new(2));

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(voices.created(), 2);
        assert_eq!(registry.players().len(), 2);
    }

    #[test]
    fn lookups_do_not_create_players() {
        let (voices, registry) = registry();
        assert!(registry.get(Id::new(9)).is_none());
        assert!(registry.current_queue(Id::new(9)).is_empty());
        assert_eq!(registry.now_playing(Id::new(9)), None);
        assert_eq!(voices.created(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_get_or_create_yields_one_player_per_guild() {
        let (voices, registry) = registry();
        let registry = Arc::new(registry);

        let tasks: Vec<_> = (0..32u64)
            .map(|n| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.get_or_create(Id::new(1 + n % 2)) })
            })
            .collect();
        let mut players = Vec::new();
        for task in tasks {
            players.push(task.await.unwrap());
        }

        let one = registry.get(Id::new(1)).unwrap();
        let two = registry.get(Id::new(2)).unwrap();
        for player in &players {
            assert!(Arc::ptr_eq(player, &one) || Arc::ptr_eq(player, &two));
        }
        assert_eq!(voices.created(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn guild_surface_routes_to_the_guild_player() {
        let (_, registry) = registry();
        registry.enqueue(Id::new(1), track("A"));
        registry.enqueue(Id::new(2), track("B"));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(registry.current_queue(Id::new(1)).is_empty());
        assert_eq!(registry.now_playing(Id::new(1)), None);

        registry.stop(Id::new(1)).await;
        assert!(!registry.get(Id::new(1)).unwrap().is_running());
        assert!(registry.get(Id::new(2)).unwrap().is_running());
    }
}
