//! Shared world state for account linking BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklink::identity::{
    adapters::{RandomLinkCodeGenerator, memory::InMemoryIdentityRepository},
    domain::Identity,
    services::IdentityRegistryService,
};
use tasklink::link::{
    adapters::memory::InMemoryMergeStore,
    domain::LinkOutcome,
    services::{LinkError, LinkService},
};
use tasklink::memory::InMemoryStore;
use tasklink::task::{adapters::memory::InMemoryTaskRepository, services::TaskService};

/// Merge engine type used by the BDD world.
pub type TestLinkService = LinkService<
    InMemoryIdentityRepository,
    InMemoryTaskRepository,
    InMemoryMergeStore,
    DefaultClock,
>;

/// Scenario world for account linking behaviour tests.
pub struct LinkWorld {
    pub registry:
        IdentityRegistryService<InMemoryIdentityRepository, InMemoryTaskRepository, DefaultClock>,
    pub link: TestLinkService,
    pub tasks: TaskService<InMemoryTaskRepository, InMemoryIdentityRepository, DefaultClock>,
    pub web_guest: Option<Identity>,
    pub bystander: Option<Identity>,
    pub messaging_contact: Option<Identity>,
    pub last_link_result: Option<Result<LinkOutcome, LinkError>>,
}

impl LinkWorld {
    /// Creates a world over empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let identities = Arc::new(InMemoryIdentityRepository::with_store(&store));
        let tasks = Arc::new(InMemoryTaskRepository::with_store(&store));
        let clock = Arc::new(DefaultClock);
        let registry = IdentityRegistryService::new(
            Arc::clone(&identities),
            Arc::clone(&tasks),
            Arc::new(RandomLinkCodeGenerator),
            Arc::clone(&clock),
        );
        Self {
            link: LinkService::new(
                registry.clone(),
                Arc::new(InMemoryMergeStore::with_store(&store)),
            ),
            tasks: TaskService::new(tasks, identities, clock),
            registry,
            web_guest: None,
            bystander: None,
            messaging_contact: None,
            last_link_result: None,
        }
    }

    /// Returns the scenario's web guest.
    ///
    /// # Errors
    ///
    /// Returns an error when no web guest was created.
    pub fn web_guest(&self) -> Result<&Identity, eyre::Report> {
        self.web_guest
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing web guest in scenario world"))
    }
}

impl Default for LinkWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LinkWorld {
    LinkWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
