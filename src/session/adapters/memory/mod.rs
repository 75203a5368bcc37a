//! In-memory adapters for session persistence.

mod session;

pub use session::InMemorySessionRepository;
