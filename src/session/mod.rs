//! Conversational sessions for the messaging channel.
//!
//! One row per phone records whether a conversation is in progress and an
//! opaque context payload the messaging front end resumes from. Rows are
//! upserted on activation and flagged inactive, never deleted.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
