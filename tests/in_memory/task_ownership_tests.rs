//! Task ownership across identity merges.

use super::helpers::{Services, services};
use rstest::rstest;
use tasklink::task::services::{TaskServiceError, UpdateTaskRequest};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn merged_tasks_are_editable_by_the_survivor(
    services: Services,
) -> Result<(), eyre::Report> {
    let web = services.web_guest().await?;
    let contact = services.messaging_contact("+15553330000").await?;
    let moved = services.add_tasks(contact.id(), 1).await?;
    let task = moved
        .first()
        .ok_or_else(|| eyre::eyre!("one task was created"))?;
    services.redeem("+15553330000", &web).await??;

    let updated = services
        .tasks
        .update(UpdateTaskRequest::new(web.id(), task.id()).with_completed(true))
        .await?;

    eyre::ensure!(updated.completed(), "survivor can complete migrated task");
    eyre::ensure!(updated.owner_id() == web.id(), "owner must be the survivor");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn other_guests_cannot_touch_tasks(services: Services) -> Result<(), eyre::Report> {
    let owner = services.web_guest().await?;
    let stranger = services.web_guest().await?;
    let created = services.add_tasks(owner.id(), 1).await?;
    let task = created
        .first()
        .ok_or_else(|| eyre::eyre!("one task was created"))?;

    let update = services
        .tasks
        .update(UpdateTaskRequest::new(stranger.id(), task.id()).with_title("hijacked"))
        .await;
    let delete = services.tasks.delete(stranger.id(), task.id()).await;

    eyre::ensure!(
        matches!(update, Err(TaskServiceError::NotOwner { .. })),
        "update by stranger must be refused"
    );
    eyre::ensure!(
        matches!(delete, Err(TaskServiceError::NotOwner { .. })),
        "delete by stranger must be refused"
    );
    eyre::ensure!(
        services.task_store.snapshot()? == created,
        "tasks must be unchanged"
    );
    Ok(())
}
