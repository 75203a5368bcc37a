//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tasklink::identity::{
    adapters::{RandomLinkCodeGenerator, memory::InMemoryIdentityRepository},
    domain::{Identity, IdentityId, OriginChannel, PhoneNumber},
    services::IdentityRegistryService,
};
use tasklink::link::adapters::memory::InMemoryMergeStore;
use tasklink::link::domain::LinkOutcome;
use tasklink::link::services::{LinkError, LinkRequest, LinkService};
use tasklink::memory::InMemoryStore;
use tasklink::session::{adapters::memory::InMemorySessionRepository, services::SessionService};
use tasklink::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{CreateTaskRequest, TaskService},
};

/// Identity registry over in-memory stores.
pub type Registry =
    IdentityRegistryService<InMemoryIdentityRepository, InMemoryTaskRepository, DefaultClock>;

/// Every service wired over one set of in-memory stores.
pub struct Services {
    pub registry: Registry,
    pub link: LinkService<
        InMemoryIdentityRepository,
        InMemoryTaskRepository,
        InMemoryMergeStore,
        DefaultClock,
    >,
    pub tasks: TaskService<InMemoryTaskRepository, InMemoryIdentityRepository, DefaultClock>,
    pub sessions: SessionService<InMemorySessionRepository, DefaultClock>,
    pub identity_store: Arc<InMemoryIdentityRepository>,
    pub task_store: Arc<InMemoryTaskRepository>,
}

/// Provides fresh services for each test.
#[fixture]
pub fn services() -> Services {
    let store = InMemoryStore::new();
    let identity_store = Arc::new(InMemoryIdentityRepository::with_store(&store));
    let task_store = Arc::new(InMemoryTaskRepository::with_store(&store));
    let clock = Arc::new(DefaultClock);
    let registry = IdentityRegistryService::new(
        Arc::clone(&identity_store),
        Arc::clone(&task_store),
        Arc::new(RandomLinkCodeGenerator),
        Arc::clone(&clock),
    );
    Services {
        link: LinkService::new(
            registry.clone(),
            Arc::new(InMemoryMergeStore::with_store(&store)),
        ),
        tasks: TaskService::new(
            Arc::clone(&task_store),
            Arc::clone(&identity_store),
            Arc::clone(&clock),
        ),
        sessions: SessionService::new(Arc::new(InMemorySessionRepository::new()), clock),
        registry,
        identity_store,
        task_store,
    }
}

/// Parses a phone number known to be valid.
///
/// # Errors
///
/// Returns an error when `value` is not a valid phone number.
pub fn phone(value: &str) -> Result<PhoneNumber, eyre::Report> {
    PhoneNumber::new(value).map_err(|err| eyre::eyre!("invalid phone {value}: {err}"))
}

impl Services {
    /// Creates a web guest.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry fails.
    pub async fn web_guest(&self) -> Result<Identity, eyre::Report> {
        Ok(self.registry.create_guest(OriginChannel::Web).await?)
    }

    /// Creates (or fetches) the messaging identity for `number`.
    ///
    /// # Errors
    ///
    /// Returns an error when the phone is invalid or the registry fails.
    pub async fn messaging_contact(&self, number: &str) -> Result<Identity, eyre::Report> {
        let (identity, _) = self.registry.ensure_for_phone(&phone(number)?).await?;
        Ok(identity)
    }

    /// Creates `count` tasks owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error when a task cannot be created.
    pub async fn add_tasks(
        &self,
        owner: IdentityId,
        count: usize,
    ) -> Result<Vec<Task>, eyre::Report> {
        let mut created = Vec::with_capacity(count);
        for index in 0..count {
            let request = CreateTaskRequest::new(owner, format!("task {index}"));
            created.push(self.tasks.create(request).await?);
        }
        Ok(created)
    }

    /// Redeems the link code held by `source` from `number`.
    ///
    /// # Errors
    ///
    /// Returns an error when `source` holds no link code.
    pub async fn redeem(
        &self,
        number: &str,
        source: &Identity,
    ) -> Result<Result<LinkOutcome, LinkError>, eyre::Report> {
        let code = source
            .link_code()
            .ok_or_else(|| eyre::eyre!("identity {} holds no link code", source.id()))?;
        Ok(self
            .link
            .link(LinkRequest::new(number, code.as_str()))
            .await)
    }
}
