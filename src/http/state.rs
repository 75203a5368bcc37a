//! Shared handler state and store wiring.

use crate::config::InternalSecret;
use crate::identity::{
    adapters::{
        RandomLinkCodeGenerator, memory::InMemoryIdentityRepository,
        postgres::PostgresIdentityRepository,
    },
    ports::IdentityRepository,
    services::IdentityRegistryService,
};
use crate::link::{
    adapters::{memory::InMemoryMergeStore, postgres::PostgresMergeStore},
    ports::MergeStore,
    services::LinkService,
};
use crate::memory::InMemoryStore;
use crate::postgres::PgPool;
use crate::session::{
    adapters::{memory::InMemorySessionRepository, postgres::PostgresSessionRepository},
    ports::SessionRepository,
    services::SessionService,
};
use crate::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskStore,
    services::TaskService,
};
use mockable::DefaultClock;
use std::sync::Arc;

/// Identity registry as wired into the server.
pub type AppRegistry = IdentityRegistryService<dyn IdentityRepository, dyn TaskStore, DefaultClock>;
/// Merge engine as wired into the server.
pub type AppLinkService =
    LinkService<dyn IdentityRepository, dyn TaskStore, dyn MergeStore, DefaultClock>;
/// Task service as wired into the server.
pub type AppTaskService = TaskService<dyn TaskStore, dyn IdentityRepository, DefaultClock>;
/// Session service as wired into the server.
pub type AppSessionService = SessionService<dyn SessionRepository, DefaultClock>;

/// Repositories backing one server instance.
#[derive(Clone)]
pub struct Stores {
    /// Identity records.
    pub identities: Arc<dyn IdentityRepository>,
    /// Tasks and their ownership.
    pub tasks: Arc<dyn TaskStore>,
    /// Atomic link commits over the identity and task tables.
    pub merges: Arc<dyn MergeStore>,
    /// Conversation sessions.
    pub sessions: Arc<dyn SessionRepository>,
}

impl Stores {
    /// Process-local stores; contents are lost on exit.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = InMemoryStore::new();
        Self {
            identities: Arc::new(InMemoryIdentityRepository::with_store(&store)),
            tasks: Arc::new(InMemoryTaskRepository::with_store(&store)),
            merges: Arc::new(InMemoryMergeStore::with_store(&store)),
            sessions: Arc::new(InMemorySessionRepository::new()),
        }
    }

    /// `PostgreSQL` stores sharing `pool`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            identities: Arc::new(PostgresIdentityRepository::new(pool.clone())),
            tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
            merges: Arc::new(PostgresMergeStore::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
        }
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) registry: AppRegistry,
    pub(crate) link: AppLinkService,
    pub(crate) tasks: AppTaskService,
    pub(crate) sessions: AppSessionService,
    pub(crate) secret: Arc<InternalSecret>,
}

impl AppState {
    /// Wires the services over `stores`.
    #[must_use]
    pub fn new(stores: Stores, secret: InternalSecret) -> Self {
        let clock = Arc::new(DefaultClock);
        let registry: AppRegistry = IdentityRegistryService::new(
            Arc::clone(&stores.identities),
            Arc::clone(&stores.tasks),
            Arc::new(RandomLinkCodeGenerator),
            Arc::clone(&clock),
        );
        let link = LinkService::new(registry.clone(), Arc::clone(&stores.merges));
        let tasks = TaskService::new(
            Arc::clone(&stores.tasks),
            Arc::clone(&stores.identities),
            Arc::clone(&clock),
        );
        let sessions = SessionService::new(stores.sessions, clock);
        Self {
            registry,
            link,
            tasks,
            sessions,
            secret: Arc::new(secret),
        }
    }
}
