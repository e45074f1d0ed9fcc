//! Configuration file management.
//!
//! Read from `$QUEEKER_DATA_DIR/config.toml`; every field has a default.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use queeker_crypto::session::DEFAULT_SESSION_TTL_SECS;
use queeker_engine::RateLimitPolicy;

/// Env var naming the data directory.
pub const DATA_DIR_ENV: &str = "QUEEKER_DATA_DIR";

/// Env var carrying the session signing secret. Wins over the config file.
pub const AUTH_SECRET_ENV: &str = "QUEEKER_AUTH_SECRET";

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Socket and storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
    /// Unix socket path. Empty = `$data_dir/daemon.sock`.
    #[serde(default)]
    pub socket_path: String,
}

/// Session token settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Inline signing secret. Prefer `secret_file` or the env var.
    #[serde(default)]
    pub secret: String,
    /// File holding the signing secret (trailing whitespace ignored).
    #[serde(default)]
    pub secret_file: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

/// Rate limit policies per action class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_like_policy")]
    pub likes: RateLimitPolicy,
    #[serde(default = "default_post_policy")]
    pub posts: RateLimitPolicy,
}

/// Where the rate limiter keeps its log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitBackendKind {
    #[default]
    Memory,
    Sqlite,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Return internal error details to callers instead of the generic
    /// message. Development only.
    #[serde(default)]
    pub expose_internal_errors: bool,
    #[serde(default)]
    pub rate_limit_backend: RateLimitBackendKind,
    /// Interval between rate limiter log prunes.
    #[serde(default = "default_prune_interval")]
    pub prune_interval_secs: u64,
}

// Default value functions

fn default_session_ttl() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

fn default_like_policy() -> RateLimitPolicy {
    RateLimitPolicy::LIKES
}

fn default_post_policy() -> RateLimitPolicy {
    RateLimitPolicy::POSTS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prune_interval() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            secret_file: String::new(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &if self.secret.is_empty() { "" } else { "<redacted>" })
            .field("secret_file", &self.secret_file)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .finish()
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            likes: default_like_policy(),
            posts: default_post_policy(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            expose_internal_errors: false,
            rate_limit_backend: RateLimitBackendKind::Memory,
            prune_interval_secs: default_prune_interval(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Check values serde cannot: rate limit policies must be enforceable.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, policy) in [("likes", &self.limits.likes), ("posts", &self.limits.posts)] {
            if let Err(e) = policy.validate() {
                bail!("limits.{name}: {e}");
            }
        }
        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.server.data_dir.is_empty() {
            default_data_dir()
        } else {
            PathBuf::from(&self.server.data_dir)
        }
    }

    pub fn socket_path(&self) -> PathBuf {
        if self.server.socket_path.is_empty() {
            self.data_dir().join("daemon.sock")
        } else {
            PathBuf::from(&self.server.socket_path)
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("queeker.db")
    }

    /// Resolve the signing secret from, in order: `QUEEKER_AUTH_SECRET`, the
    /// inline `auth.secret`, the file named by `auth.secret_file`.
    ///
    /// # Errors
    ///
    /// Fails when none is set; the daemon must not start without a secret.
    pub fn resolve_secret(&self) -> anyhow::Result<Zeroizing<Vec<u8>>> {
        self.resolve_secret_with(std::env::var(AUTH_SECRET_ENV).ok())
    }

    fn resolve_secret_with(&self, env: Option<String>) -> anyhow::Result<Zeroizing<Vec<u8>>> {
        if let Some(secret) = env.filter(|s| !s.is_empty()) {
            return Ok(Zeroizing::new(secret.into_bytes()));
        }
        if !self.auth.secret.is_empty() {
            return Ok(Zeroizing::new(self.auth.secret.clone().into_bytes()));
        }
        if !self.auth.secret_file.is_empty() {
            let raw = Zeroizing::new(
                std::fs::read(&self.auth.secret_file)
                    .with_context(|| format!("reading secret file {}", self.auth.secret_file))?,
            );
            let end = raw
                .iter()
                .rposition(|b| !b.is_ascii_whitespace())
                .map_or(0, |i| i + 1);
            if end > 0 {
                return Ok(Zeroizing::new(raw[..end].to_vec()));
            }
        }
        bail!("no session secret configured: set {AUTH_SECRET_ENV}, auth.secret or auth.secret_file")
    }

    fn config_path() -> PathBuf {
        default_data_dir().join("config.toml")
    }
}

/// `$QUEEKER_DATA_DIR`, else a per-platform directory under `$HOME`.
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "macos")]
    {
        home_fallback("Library/Application Support/Queeker")
    }
    #[cfg(not(target_os = "macos"))]
    {
        home_fallback(".queeker")
    }
}

fn home_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/queeker"))
}
