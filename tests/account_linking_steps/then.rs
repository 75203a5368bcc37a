//! Then steps for account linking BDD scenarios.

use super::world::{LinkWorld, run_async};
use rstest_bdd_macros::then;
use tasklink::link::{domain::LinkOutcome, services::LinkError};

fn outcome(world: &LinkWorld) -> Result<&LinkOutcome, eyre::Report> {
    world
        .last_link_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing link result in scenario world"))?
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected link failure: {err}"))
}

fn failure(world: &LinkWorld) -> Result<&LinkError, eyre::Report> {
    match world.last_link_result.as_ref() {
        Some(Err(err)) => Ok(err),
        Some(Ok(outcome)) => Err(eyre::eyre!("expected failure, got {outcome:?}")),
        None => Err(eyre::eyre!("missing link result in scenario world")),
    }
}

#[then(r#"the link succeeds with action "{action}""#)]
fn link_succeeds(world: &LinkWorld, action: String) -> Result<(), eyre::Report> {
    let result = outcome(world)?;
    eyre::ensure!(
        result.action.as_str() == action,
        "expected action {action}, found {}",
        result.action.as_str()
    );
    eyre::ensure!(
        result.identity.id() == world.web_guest()?.id(),
        "the code's identity must survive"
    );
    Ok(())
}

#[then(r#""{phone}" is linked to the web guest"#)]
fn phone_is_linked(world: &LinkWorld, phone: String) -> Result<(), eyre::Report> {
    let status = run_async(world.link.link_status(&phone))?;
    eyre::ensure!(
        status.identity_id == Some(world.web_guest()?.id()),
        "expected {phone} to resolve to the web guest"
    );
    Ok(())
}

#[then("the web guest owns {count:usize} tasks")]
fn web_guest_owns(world: &LinkWorld, count: usize) -> Result<(), eyre::Report> {
    let owned = run_async(world.tasks.list_for_owner(world.web_guest()?.id()))?;
    eyre::ensure!(
        owned.len() == count,
        "expected {count} tasks, found {}",
        owned.len()
    );
    Ok(())
}

#[then("the messaging contact no longer exists")]
fn messaging_contact_deleted(world: &LinkWorld) -> Result<(), eyre::Report> {
    let contact = world
        .messaging_contact
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing messaging contact in scenario world"))?;
    let found = run_async(world.registry.find_by_id(contact.id()))?;
    eyre::ensure!(found.is_none(), "absorbed contact still exists");
    Ok(())
}

#[then("the bystander still owns {count:usize} tasks and its code")]
fn bystander_untouched(world: &LinkWorld, count: usize) -> Result<(), eyre::Report> {
    let bystander = world
        .bystander
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing bystander in scenario world"))?;
    let current = run_async(world.registry.find_by_id(bystander.id()))?;
    eyre::ensure!(
        current.as_ref() == Some(bystander),
        "bystander identity changed"
    );
    let owned = run_async(world.tasks.list_for_owner(bystander.id()))?;
    eyre::ensure!(owned.len() == count, "bystander tasks changed");
    Ok(())
}

#[then("the link fails because the phone is already linked")]
fn fails_already_linked(world: &LinkWorld) -> Result<(), eyre::Report> {
    let err = failure(world)?;
    eyre::ensure!(
        matches!(err, LinkError::AlreadyLinked { .. }),
        "expected AlreadyLinked, got {err}"
    );
    Ok(())
}

#[then("the link fails because the code is invalid")]
fn fails_invalid_code(world: &LinkWorld) -> Result<(), eyre::Report> {
    let err = failure(world)?;
    eyre::ensure!(
        matches!(err, LinkError::InvalidCode),
        "expected InvalidCode, got {err}"
    );
    Ok(())
}
