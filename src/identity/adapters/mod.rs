//! Adapter implementations for identity ports.

pub mod memory;
pub mod postgres;

mod random_code;

pub use random_code::RandomLinkCodeGenerator;
