//! Shared plumbing: the HTTP-facing error taxonomy and the layered
//! configuration loader used by the harness server and sandbox client.

mod config;
mod error;

pub use config::{Config, HttpConfig, RateLimitConfig, SandboxConfig, DEFAULT_PROTOCOL};
pub use error::{HarnessError, HarnessResult};
