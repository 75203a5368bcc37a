//! Application services for conversational sessions.

mod store;

pub use store::{SessionService, SessionServiceError, SessionServiceResult};
