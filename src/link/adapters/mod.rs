//! Adapter implementations for link ports.

pub mod memory;
pub mod postgres;
