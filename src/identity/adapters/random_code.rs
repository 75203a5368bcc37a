//! Link code generator backed by the thread-local CSPRNG.

use crate::identity::{domain::LinkCode, ports::LinkCodeGenerator};
use rand::Rng;

/// Draws every code character uniformly from [`LinkCode::ALPHABET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomLinkCodeGenerator;

impl LinkCodeGenerator for RandomLinkCodeGenerator {
    fn generate(&self) -> LinkCode {
        let mut rng = rand::thread_rng();
        LinkCode::generate_with(|len| rng.gen_range(0..len))
    }
}
