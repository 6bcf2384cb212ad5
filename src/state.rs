use crate::player::PlayerRegistry;
use crate::resolver::Resolver;
use songbird::Songbird;
use std::sync::Arc;
use twilight_cache_inmemory::InMemoryCache;
use twilight_http::Client as HttpClient;

pub(crate) type State = Arc<StateRef>;

pub(crate) struct StateRef {
    pub(crate) http: HttpClient,
    pub(crate) cache: InMemoryCache,
    pub(crate) songbird: Arc<Songbird>,
    pub(crate) players: PlayerRegistry,
    pub(crate) resolver: Arc<dyn Resolver>,
}
