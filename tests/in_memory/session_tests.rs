//! Session store behaviour keyed by phone.

use super::helpers::{Services, services};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn session_lifecycle_by_phone(services: Services) -> Result<(), eyre::Report> {
    let created = services
        .sessions
        .activate("+15554440000", Some(json!({ "step": "ask_title" })))
        .await?;
    let refreshed = services.sessions.activate("+15554440000", None).await?;
    services.sessions.deactivate("+15554440000").await?;

    eyre::ensure!(created.context() == &json!({ "step": "ask_title" }), "context stored");
    eyre::ensure!(refreshed.context() == created.context(), "context kept without a new one");
    eyre::ensure!(
        services.sessions.get("+15554440000").await?.is_none(),
        "inactive session is hidden"
    );
    eyre::ensure!(
        services.sessions.find("+15554440000").await?.is_some(),
        "inactive session row is kept"
    );
    Ok(())
}
