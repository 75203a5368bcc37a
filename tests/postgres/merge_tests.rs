//! `PostgreSQL` merge store tests.

use std::sync::Arc;

use super::cluster::{BoxError, temporary_database};
use mockable::DefaultClock;
use rstest::rstest;
use tasklink::identity::{
    adapters::{RandomLinkCodeGenerator, postgres::PostgresIdentityRepository},
    domain::{Identity, IdentityId, LinkCode, OriginChannel, PhoneNumber},
    ports::IdentityRepository,
    services::IdentityRegistryService,
};
use tasklink::link::{
    adapters::postgres::PostgresMergeStore,
    domain::LinkAction,
    ports::{MergePlan, MergeStore, MergeStoreError},
    services::{LinkRequest, LinkService},
};
use tasklink::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{Task, TaskTitle},
    ports::{OwnershipMigrator, TaskRepository},
};

struct Fixture {
    identities: PostgresIdentityRepository,
    tasks: PostgresTaskRepository,
}

impl Fixture {
    async fn web_guest(&self, code: &str) -> Result<Identity, BoxError> {
        let link_code = LinkCode::new(code)?;
        let identity = Identity::new_guest(OriginChannel::Web, link_code, &DefaultClock);
        self.identities.store(&identity).await?;
        Ok(identity)
    }

    async fn messaging_guest(
        &self,
        phone: &str,
        code: &str,
        tasks: usize,
    ) -> Result<Identity, BoxError> {
        let identity = Identity::new_messaging_guest(
            PhoneNumber::new(phone)?,
            LinkCode::new(code)?,
            &DefaultClock,
        );
        self.identities.store(&identity).await?;
        for index in 0..tasks {
            let title = TaskTitle::new(format!("chat task {index}"))?;
            self.tasks
                .store(&Task::new(identity.id(), title, None, &DefaultClock))
                .await?;
        }
        Ok(identity)
    }
}

fn absorb_plan(source: &Identity, phone: &str, guest: IdentityId) -> Result<MergePlan, BoxError> {
    let number = PhoneNumber::new(phone)?;
    let redeemed_code = source
        .link_code()
        .cloned()
        .ok_or_else(|| BoxError::from("source has no link code"))?;
    let mut survivor = source.clone();
    survivor.promote_to_linked(number.clone(), &DefaultClock)?;
    Ok(MergePlan {
        survivor,
        phone: number,
        redeemed_code,
        absorbed_guest: Some(guest),
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_commits_of_one_code_have_one_winner() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let fixture = Fixture {
        identities: PostgresIdentityRepository::new(db.pool.clone()),
        tasks: PostgresTaskRepository::new(db.pool.clone()),
    };
    let merges = Arc::new(PostgresMergeStore::new(db.pool.clone()));
    let web = fixture.web_guest("WEBRACE2").await?;
    let first = fixture.messaging_guest("+15553330001", "MSGRACE1", 1).await?;
    let second = fixture.messaging_guest("+15553330002", "MSGRACE2", 2).await?;
    let plans = [
        absorb_plan(&web, "+15553330001", first.id())?,
        absorb_plan(&web, "+15553330002", second.id())?,
    ];

    let handles = plans.map(|plan| {
        let store = Arc::clone(&merges);
        tokio::spawn(async move { store.commit_merge(&plan).await })
    });
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await?);
    }

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|result| matches!(result, Err(MergeStoreError::CodeConsumed(_))))
            .count(),
        1
    );
    let first_won = results.first().is_some_and(Result::is_ok);
    let (absorbed, bystander, bystander_tasks) = if first_won {
        (&first, &second, 2)
    } else {
        (&second, &first, 1)
    };
    assert_eq!(fixture.identities.find_by_id(absorbed.id()).await?, None);
    assert_eq!(
        fixture.identities.find_by_id(bystander.id()).await?,
        Some(bystander.clone())
    );
    assert_eq!(fixture.tasks.count_owned_by(bystander.id()).await?, bystander_tasks);
    assert_eq!(fixture.tasks.count_owned_by(web.id()).await?, 3 - bystander_tasks);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_plan_writes_nothing() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let fixture = Fixture {
        identities: PostgresIdentityRepository::new(db.pool.clone()),
        tasks: PostgresTaskRepository::new(db.pool.clone()),
    };
    let merges = PostgresMergeStore::new(db.pool.clone());
    let web = fixture.web_guest("WEBSTAL2").await?;
    let guest = fixture.messaging_guest("+15553330003", "MSGSTAL2", 2).await?;
    let mut plan = absorb_plan(&web, "+15553330003", guest.id())?;
    plan.absorbed_guest = Some(IdentityId::new());

    let result = merges.commit_merge(&plan).await;

    assert!(matches!(result, Err(MergeStoreError::PhoneHolderChanged(_))));
    assert_eq!(fixture.identities.find_by_id(web.id()).await?, Some(web.clone()));
    assert_eq!(
        fixture.identities.find_by_id(guest.id()).await?,
        Some(guest.clone())
    );
    assert_eq!(fixture.tasks.count_owned_by(guest.id()).await?, 2);
    assert_eq!(fixture.tasks.count_owned_by(web.id()).await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_service_absorbs_the_gateway_guest() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let identities = Arc::new(PostgresIdentityRepository::new(db.pool.clone()));
    let tasks = Arc::new(PostgresTaskRepository::new(db.pool.clone()));
    let fixture = Fixture {
        identities: PostgresIdentityRepository::new(db.pool.clone()),
        tasks: PostgresTaskRepository::new(db.pool.clone()),
    };
    let registry = IdentityRegistryService::new(
        Arc::clone(&identities),
        Arc::clone(&tasks),
        Arc::new(RandomLinkCodeGenerator),
        Arc::new(DefaultClock),
    );
    let merges = Arc::new(PostgresMergeStore::new(db.pool.clone()));
    let service = LinkService::new(registry, merges);
    let web = fixture.web_guest("WEBLINK2").await?;
    let guest = fixture
        .messaging_guest("15553330004@s.whatsapp.net", "MSGLINK2", 3)
        .await?;

    let outcome = service
        .link(LinkRequest::new("+1 555 333 0004", "WEBLINK2"))
        .await?;
    let replay = service
        .link(LinkRequest::new("+15553330004", "WEBLINK2"))
        .await;

    assert_eq!(outcome.action, LinkAction::Merged);
    assert_eq!(outcome.migrated_tasks, 3);
    assert!(replay.is_err());
    assert_eq!(identities.find_by_id(guest.id()).await?, None);
    assert_eq!(tasks.count_owned_by(web.id()).await?, 3);
    let linked = identities
        .find_by_phone(&PhoneNumber::new("+15553330004")?)
        .await?
        .ok_or_else(|| BoxError::from("phone has no holder"))?;
    assert_eq!(linked.id(), web.id());
    assert_eq!(linked.link_code(), None);
    Ok(())
}
