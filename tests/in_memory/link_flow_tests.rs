//! End-to-end link redemption over in-memory stores.

use super::helpers::{Services, phone, services};
use rstest::rstest;
use tasklink::identity::domain::IdentityKind;
use tasklink::link::{domain::LinkAction, services::LinkError};

const PHONE: &str = "+15557770000";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn web_guest_linking_an_unknown_phone_is_promoted(
    services: Services,
) -> Result<(), eyre::Report> {
    let guest = services.web_guest().await?;
    services.add_tasks(guest.id(), 2).await?;

    let outcome = services.redeem(PHONE, &guest).await??;

    eyre::ensure!(outcome.action == LinkAction::Promoted, "expected promotion");
    eyre::ensure!(outcome.identity.id() == guest.id(), "identity must survive");
    eyre::ensure!(outcome.identity.kind() == IdentityKind::Linked, "must be linked");
    eyre::ensure!(outcome.identity.link_code().is_none(), "code must be consumed");
    let status = services.link.link_status(PHONE).await?;
    eyre::ensure!(status.identity_id == Some(guest.id()), "status must name the guest");
    eyre::ensure!(
        services.tasks.list_for_owner(guest.id()).await?.len() == 2,
        "tasks must stay with the identity"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn messaging_guest_is_merged_into_web_identity(
    services: Services,
) -> Result<(), eyre::Report> {
    let web = services.web_guest().await?;
    services.add_tasks(web.id(), 2).await?;
    let contact = services.messaging_contact(PHONE).await?;
    services.add_tasks(contact.id(), 1).await?;

    let outcome = services.redeem(PHONE, &web).await??;

    eyre::ensure!(outcome.action == LinkAction::Merged, "expected merge");
    eyre::ensure!(outcome.migrated_tasks == 1, "one task should move");
    eyre::ensure!(
        services.registry.find_by_id(contact.id()).await?.is_none(),
        "absorbed guest must be deleted"
    );
    eyre::ensure!(
        services.tasks.list_for_owner(web.id()).await?.len() == 3,
        "canonical identity owns every task"
    );
    let holder = services.registry.find_by_phone(&phone(PHONE)?).await?;
    eyre::ensure!(
        holder.map(|identity| identity.id()) == Some(web.id()),
        "phone resolves to the web identity"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn phone_linked_elsewhere_is_refused(services: Services) -> Result<(), eyre::Report> {
    let first = services.web_guest().await?;
    services.redeem(PHONE, &first).await??;
    let second = services.web_guest().await?;
    services.add_tasks(second.id(), 1).await?;
    let before = services.identity_store.snapshot()?;

    let result = services.redeem(PHONE, &second).await?;

    eyre::ensure!(
        matches!(result, Err(LinkError::AlreadyLinked { .. })),
        "expected AlreadyLinked, got {result:?}"
    );
    eyre::ensure!(
        services.identity_store.snapshot()? == before,
        "refused link must not mutate identities"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn redeeming_a_consumed_code_is_invalid(services: Services) -> Result<(), eyre::Report> {
    let guest = services.web_guest().await?;
    services.redeem(PHONE, &guest).await??;

    let again = services.redeem(PHONE, &guest).await?;

    eyre::ensure!(
        matches!(again, Err(LinkError::InvalidCode)),
        "expected InvalidCode, got {again:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn link_code_lookup_is_case_insensitive(services: Services) -> Result<(), eyre::Report> {
    let guest = services.web_guest().await?;
    let code = guest
        .link_code()
        .ok_or_else(|| eyre::eyre!("guest holds a code"))?
        .as_str()
        .to_lowercase();

    let outcome = services
        .link
        .link(tasklink::link::services::LinkRequest::new(PHONE, code))
        .await?;

    eyre::ensure!(outcome.identity.id() == guest.id(), "lowercase code must resolve");
    Ok(())
}
