use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{HarnessError, HarnessResult};

/// Protocol identifier baked in when neither a config file nor the action
/// payload names one explicitly.
pub const DEFAULT_PROTOCOL: &str = "alpha";

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub per_second: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 3,
            burst: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub port: u16,
    pub body_cap_bytes: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            body_cap_bytes: 2 * 1024 * 1024,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    pub base_directory: PathBuf,
    pub client_binary: PathBuf,
    pub default_protocol: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("./sandbox"),
            client_binary: PathBuf::from("tezos-client"),
            default_protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }
}

/// Process-wide configuration, immutable once loaded and shared read-only
/// across requests behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub http: HttpConfig,
    pub sandbox: SandboxConfig,
    pub log_location: Option<PathBuf>,
}

impl Config {
    /// Builds the effective configuration from, lowest to highest
    /// precedence: compiled-in defaults, an optional TOML file, and
    /// environment overrides (`API_PORT`, `LOG_LOCATION`).
    ///
    /// A missing `cli_path` file is not an error — absence just means the
    /// defaults stand. A malformed file or a malformed `API_PORT` value is
    /// a startup error, since both are operator mistakes the process
    /// should refuse to run with rather than silently ignore.
    pub fn load(cli_path: Option<&Path>) -> HarnessResult<Arc<Config>> {
        let mut config = Config::default();

        match cli_path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|err| {
                    HarnessError::internal(
                        anyhow::Error::new(err)
                            .context(format!("reading config file {}", path.display())),
                    )
                })?;
                let overlay: ConfigOverlay = toml::from_str(&text).map_err(|err| {
                    HarnessError::internal(
                        anyhow::Error::new(err)
                            .context(format!("parsing config file {} as TOML", path.display())),
                    )
                })?;
                overlay.apply(&mut config);
            }
            Some(path) => {
                tracing::debug!(
                    path = %path.display(),
                    "config file not found, falling back to compiled-in defaults"
                );
            }
            None => {
                tracing::debug!("no -config flag given, using compiled-in defaults");
            }
        }

        if let Ok(port) = std::env::var("API_PORT") {
            config.http.port = port.parse().map_err(|_| {
                HarnessError::internal(anyhow::anyhow!(
                    "API_PORT must be a valid u16, got {port:?}"
                ))
            })?;
        }
        if let Ok(log_location) = std::env::var("LOG_LOCATION") {
            config.log_location = Some(PathBuf::from(log_location));
        }

        Ok(Arc::new(config))
    }
}

/// Mirrors `Config`, but every field is optional so that a partial TOML
/// file only overrides the keys it actually sets.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    http: Option<HttpOverlay>,
    sandbox: Option<SandboxOverlay>,
    log_location: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HttpOverlay {
    port: Option<u16>,
    body_cap_bytes: Option<usize>,
    rate_limit: Option<RateLimitOverlay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RateLimitOverlay {
    per_second: Option<u32>,
    burst: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SandboxOverlay {
    base_directory: Option<PathBuf>,
    client_binary: Option<PathBuf>,
    default_protocol: Option<String>,
}

impl ConfigOverlay {
    fn apply(self, config: &mut Config) {
        if let Some(http) = self.http {
            if let Some(port) = http.port {
                config.http.port = port;
            }
            if let Some(body_cap_bytes) = http.body_cap_bytes {
                config.http.body_cap_bytes = body_cap_bytes;
            }
            if let Some(rate_limit) = http.rate_limit {
                if let Some(per_second) = rate_limit.per_second {
                    config.http.rate_limit.per_second = per_second;
                }
                if let Some(burst) = rate_limit.burst {
                    config.http.rate_limit.burst = burst;
                }
            }
        }
        if let Some(sandbox) = self.sandbox {
            if let Some(base_directory) = sandbox.base_directory {
                config.sandbox.base_directory = base_directory;
            }
            if let Some(client_binary) = sandbox.client_binary {
                config.sandbox.client_binary = client_binary;
            }
            if let Some(default_protocol) = sandbox.default_protocol {
                config.sandbox.default_protocol = default_protocol;
            }
        }
        if let Some(log_location) = self.log_location {
            config.log_location = Some(log_location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/path/config.toml"))).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.rate_limit.per_second, 3);
    }

    #[test]
    fn no_cli_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(*config, Config::default());
    }

    #[test]
    fn partial_toml_overlay_keeps_unset_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9090\n").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.rate_limit.per_second, 3);
        assert_eq!(config.http.body_cap_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn malformed_toml_is_a_startup_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }
}
