//! Given steps for account linking BDD scenarios.

use super::world::{LinkWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use tasklink::identity::domain::{Identity, IdentityId, OriginChannel, PhoneNumber};
use tasklink::link::services::LinkRequest;
use tasklink::task::services::CreateTaskRequest;

fn add_tasks(world: &LinkWorld, owner: IdentityId, count: usize) -> Result<(), eyre::Report> {
    for index in 0..count {
        run_async(
            world
                .tasks
                .create(CreateTaskRequest::new(owner, format!("task {index}"))),
        )
        .wrap_err("create scenario task")?;
    }
    Ok(())
}

fn web_guest_with(world: &LinkWorld, count: usize) -> Result<Identity, eyre::Report> {
    let guest = run_async(world.registry.create_guest(OriginChannel::Web))
        .wrap_err("create web guest")?;
    add_tasks(world, guest.id(), count)?;
    Ok(guest)
}

#[given("a web guest with {count:usize} tasks")]
fn web_guest_with_tasks(world: &mut LinkWorld, count: usize) -> Result<(), eyre::Report> {
    world.web_guest = Some(web_guest_with(world, count)?);
    Ok(())
}

#[given("a bystander guest with {count:usize} tasks")]
fn bystander_with_tasks(world: &mut LinkWorld, count: usize) -> Result<(), eyre::Report> {
    world.bystander = Some(web_guest_with(world, count)?);
    Ok(())
}

#[given(r#"a messaging contact from "{phone}" with {count:usize} task"#)]
fn messaging_contact_with_tasks(
    world: &mut LinkWorld,
    phone: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let number = PhoneNumber::new(phone).wrap_err("parse scenario phone")?;
    let (contact, _) = run_async(world.registry.ensure_for_phone(&number))
        .wrap_err("create messaging contact")?;
    add_tasks(world, contact.id(), count)?;
    world.messaging_contact = Some(contact);
    Ok(())
}

#[given(r#""{phone}" is already linked to another identity"#)]
fn phone_linked_elsewhere(world: &mut LinkWorld, phone: String) -> Result<(), eyre::Report> {
    let other = web_guest_with(world, 0)?;
    let code = other
        .link_code()
        .ok_or_else(|| eyre::eyre!("fresh guest holds a code"))?;
    run_async(world.link.link(LinkRequest::new(phone, code.as_str())))
        .wrap_err("link the other identity")?;
    Ok(())
}

#[given(r#"the web guest's code was already redeemed from "{phone}""#)]
fn code_already_redeemed(world: &mut LinkWorld, phone: String) -> Result<(), eyre::Report> {
    let code = world
        .web_guest()?
        .link_code()
        .ok_or_else(|| eyre::eyre!("web guest holds a code"))?
        .clone();
    run_async(world.link.link(LinkRequest::new(phone, code.as_str())))
        .wrap_err("first redemption")?;
    Ok(())
}
