//! When steps for account linking BDD scenarios.

use super::world::{LinkWorld, run_async};
use rstest_bdd_macros::when;
use tasklink::link::services::LinkRequest;

#[when(r#"the web guest's code is redeemed from "{phone}""#)]
fn redeem_web_guest_code(world: &mut LinkWorld, phone: String) -> Result<(), eyre::Report> {
    let code = world
        .web_guest()?
        .link_code()
        .ok_or_else(|| eyre::eyre!("web guest holds no code"))?
        .clone();
    world.last_link_result = Some(run_async(
        world.link.link(LinkRequest::new(phone, code.as_str())),
    ));
    Ok(())
}
