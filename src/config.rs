//! Process configuration.
//!
//! Every option can be given as a flag or through its `TASKLINK_*`
//! environment variable.

use clap::{Parser, ValueEnum};
use sha2::{Digest, Sha256};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Default maximum number of pooled database connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Identity linking and task list server.
#[derive(Parser, Debug, Clone)]
#[command(name = "tasklink")]
#[command(about = "Task list server that links web guests and messaging phones")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "TASKLINK_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// `PostgreSQL` connection URL; in-memory stores are used when absent
    #[arg(long, env = "TASKLINK_DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long, env = "TASKLINK_DB_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    /// Shared secret required on internal endpoints; unset leaves them open
    #[arg(long, env = "TASKLINK_INTERNAL_SECRET", hide_env_values = true)]
    pub internal_secret: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "TASKLINK_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "TASKLINK_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Returns the internal endpoint secret.
    #[must_use]
    pub fn secret(&self) -> InternalSecret {
        InternalSecret::from_option(self.internal_secret.as_deref())
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Shared secret guarding internal endpoints.
///
/// [`InternalSecret::Absent`] lets every request through. Production
/// deployments are expected to configure one.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum InternalSecret {
    /// No secret configured.
    #[default]
    Absent,
    /// SHA-256 digest of the configured secret.
    Present([u8; 32]),
}

impl InternalSecret {
    /// Builds a secret from optional configuration; blank values are absent.
    #[must_use]
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(secret) if !secret.is_empty() => Self::Present(digest(secret)),
            _ => Self::Absent,
        }
    }

    /// Returns `true` when a secret is configured.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Checks a presented header value.
    ///
    /// Surrounding whitespace is ignored, as it is for the configured value.
    #[must_use]
    pub fn verify(&self, presented: Option<&str>) -> bool {
        match (self, presented) {
            (Self::Absent, _) => true,
            (Self::Present(_), None) => false,
            (Self::Present(expected), Some(candidate)) => {
                let actual = digest(candidate.trim());
                expected
                    .iter()
                    .zip(actual.iter())
                    .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
                    == 0
            }
        }
    }
}

impl fmt::Debug for InternalSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Present(_) => f.write_str("Present(<redacted>)"),
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
