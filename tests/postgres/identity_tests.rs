//! `PostgreSQL` identity repository tests.

use super::cluster::{BoxError, temporary_database};
use mockable::DefaultClock;
use rstest::rstest;
use tasklink::identity::{
    adapters::postgres::PostgresIdentityRepository,
    domain::{Identity, LinkCode, OriginChannel, PhoneNumber},
    ports::{IdentityRepository, IdentityRepositoryError},
};
use tasklink::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{Task, TaskTitle},
    ports::TaskRepository,
};

fn guest(code: &str) -> Result<Identity, BoxError> {
    Ok(Identity::new_guest(
        OriginChannel::Web,
        LinkCode::new(code)?,
        &DefaultClock,
    ))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_codes_are_unique_and_case_insensitive() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let repo = PostgresIdentityRepository::new(db.pool.clone());
    let first = guest("ABCD2345")?;
    repo.store(&first).await?;

    let duplicate = repo.store(&guest("ABCD2345")?).await;
    let found = repo.find_by_link_code(&LinkCode::new("abcd2345")?).await?;

    assert!(matches!(
        duplicate,
        Err(IdentityRepositoryError::DuplicateLinkCode(_))
    ));
    assert_eq!(found, Some(first));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promotion_commits_once() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let repo = PostgresIdentityRepository::new(db.pool.clone());
    let source = guest("PROMOTE2")?;
    repo.store(&source).await?;
    let phone = PhoneNumber::new("+15552220000")?;

    let code = LinkCode::new("PROMOTE2")?;
    let mut promoted = source.clone();
    promoted.promote_to_linked(phone.clone(), &DefaultClock)?;
    let committed = repo.commit_promotion(&promoted, &code).await?;
    let second = repo.commit_promotion(&promoted, &code).await;

    assert!(matches!(
        second,
        Err(IdentityRepositoryError::LinkCodeConsumed(_))
    ));
    assert_eq!(repo.find_by_phone(&phone).await?, Some(committed));
    assert_eq!(repo.find_by_link_code(&code).await?, None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_refuses_an_identity_that_owns_tasks() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let repo = PostgresIdentityRepository::new(db.pool.clone());
    let tasks = PostgresTaskRepository::new(db.pool.clone());
    let owner = guest("OWNSTSK2")?;
    repo.store(&owner).await?;
    let title = TaskTitle::new("keep me")?;
    tasks
        .store(&Task::new(owner.id(), title, None, &DefaultClock))
        .await?;

    let refused = repo.delete(owner.id()).await;
    let empty = guest("EMPTY002")?;
    repo.store(&empty).await?;
    repo.delete(empty.id()).await?;
    let missing = repo.delete(empty.id()).await;

    assert!(matches!(
        refused,
        Err(IdentityRepositoryError::StillOwnsTasks(id)) if id == owner.id()
    ));
    assert_eq!(repo.find_by_id(owner.id()).await?, Some(owner));
    assert!(matches!(missing, Err(IdentityRepositoryError::NotFound(_))));
    Ok(())
}
