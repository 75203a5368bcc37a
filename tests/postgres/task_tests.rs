//! `PostgreSQL` task repository tests.

use super::cluster::{BoxError, temporary_database};
use mockable::DefaultClock;
use rstest::rstest;
use tasklink::identity::{
    adapters::postgres::PostgresIdentityRepository,
    domain::{Identity, IdentityId, LinkCode, OriginChannel},
    ports::IdentityRepository,
};
use tasklink::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{Task, TaskTitle},
    ports::{OwnershipMigrator, TaskRepository, TaskRepositoryError},
};

async fn owner(repo: &PostgresIdentityRepository, code: &str) -> Result<IdentityId, BoxError> {
    let identity = Identity::new_guest(OriginChannel::Web, LinkCode::new(code)?, &DefaultClock);
    repo.store(&identity).await?;
    Ok(identity.id())
}

fn task(owner: IdentityId, title: &str) -> Result<Task, BoxError> {
    Ok(Task::new(owner, TaskTitle::new(title)?, None, &DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migration_moves_every_task_once() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let identities = PostgresIdentityRepository::new(db.pool.clone());
    let tasks = PostgresTaskRepository::new(db.pool.clone());
    let guest = owner(&identities, "GUEST002").await?;
    let survivor = owner(&identities, "SURVIVE2").await?;
    for title in ["one", "two"] {
        tasks.store(&task(guest, title)?).await?;
    }

    let moved = tasks.migrate_ownership(guest, survivor).await?;
    let again = tasks.migrate_ownership(guest, survivor).await?;

    assert_eq!(moved, 2);
    assert_eq!(again, 0);
    assert_eq!(tasks.count_owned_by(guest).await?, 0);
    assert_eq!(tasks.list_by_owner(survivor).await?.len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletes_are_scoped_to_the_owner() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let identities = PostgresIdentityRepository::new(db.pool.clone());
    let tasks = PostgresTaskRepository::new(db.pool.clone());
    let alice = owner(&identities, "ALICE002").await?;
    let bob = owner(&identities, "BOB00003").await?;
    let mine = task(alice, "mine")?;
    let theirs = task(bob, "theirs")?;
    tasks.store(&mine).await?;
    tasks.store(&theirs).await?;

    let by_stranger = tasks.delete_owned(bob, mine.id()).await?;
    let deleted = tasks
        .delete_many_owned(alice, &[mine.id(), theirs.id()])
        .await?;

    assert!(!by_stranger);
    assert_eq!(deleted, 1);
    assert_eq!(tasks.find_by_id(theirs.id()).await?, Some(theirs));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insert_requires_a_live_owner() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let identities = PostgresIdentityRepository::new(db.pool.clone());
    let tasks = PostgresTaskRepository::new(db.pool.clone());
    let stranger = IdentityId::new();
    let departed = owner(&identities, "DEPART02").await?;
    identities.delete(departed).await?;

    let unknown = tasks.store(&task(stranger, "orphan")?).await;
    let deleted = tasks.store(&task(departed, "too late")?).await;

    assert!(matches!(unknown, Err(TaskRepositoryError::UnknownOwner(id)) if id == stranger));
    assert!(matches!(deleted, Err(TaskRepositoryError::UnknownOwner(id)) if id == departed));
    assert_eq!(tasks.count_owned_by(departed).await?, 0);
    Ok(())
}
