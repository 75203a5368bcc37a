//! Tasklink: identity linking for a task list reachable from the web and a
//! messaging channel.
//!
//! Web visitors and messaging contacts start as guest identities. A guest
//! redeems a single-use link code from a phone, which promotes the code's
//! identity to the canonical owner of that phone and folds any guest already
//! bound to the phone into it, tasks included.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`identity`]: Identities, phone normalization and link codes
//! - [`task`]: Ownership-checked task lists
//! - [`link`]: The merge engine that redeems link codes
//! - [`session`]: Per-phone conversational state
//! - [`memory`]: Shared tables behind the in-memory adapters
//! - [`http`]: JSON routes over the services

pub mod config;
pub mod http;
pub mod identity;
pub mod link;
pub mod memory;
pub mod postgres;
pub mod session;
pub mod task;
pub mod telemetry;
