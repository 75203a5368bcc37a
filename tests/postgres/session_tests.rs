//! `PostgreSQL` session repository tests.

use super::cluster::{BoxError, temporary_database};
use chrono::Utc;
use rstest::rstest;
use serde_json::json;
use tasklink::identity::domain::PhoneNumber;
use tasklink::session::{adapters::postgres::PostgresSessionRepository, ports::SessionRepository};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn activate_upserts_and_keeps_context() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let repo = PostgresSessionRepository::new(db.pool.clone());
    let phone = PhoneNumber::new("+15558880000")?;

    let created = repo.activate(&phone, None, Utc::now()).await?;
    let replaced = repo
        .activate(&phone, Some(json!({ "step": 2 })), Utc::now())
        .await?;
    let kept = repo.activate(&phone, None, Utc::now()).await?;

    assert_eq!(created.context(), &json!({}));
    assert_eq!(replaced.context(), &json!({ "step": 2 }));
    assert_eq!(kept.context(), &json!({ "step": 2 }));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivate_keeps_the_row() -> Result<(), BoxError> {
    let db = temporary_database().await?;
    let repo = PostgresSessionRepository::new(db.pool.clone());
    let phone = PhoneNumber::new("+15558880001")?;
    let unknown = PhoneNumber::new("+15558880002")?;
    repo.activate(&phone, None, Utc::now()).await?;

    let deactivated = repo.deactivate(&phone, Utc::now()).await?;
    let missing = repo.deactivate(&unknown, Utc::now()).await?;

    assert!(deactivated.is_some_and(|session| !session.is_active()));
    assert!(missing.is_none());
    assert!(repo.find(&unknown).await?.is_none());
    Ok(())
}
