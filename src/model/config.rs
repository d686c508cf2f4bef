use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:45000";

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "DRAFTLINK_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeouts: TimeoutConfig,

    /// How long a discovered project root stays valid.
    pub root_ttl_secs: u64,

    /// Minimum spacing between two history fetches for the same file.
    /// Must be longer than `root_ttl_secs`.
    pub history_min_refetch_secs: u64,

    pub poll_interval_ms: u64,

    /// Sleep granularity of the status poller; bounds shutdown latency.
    pub poll_tick_ms: u64,

    pub username_display_max: usize,
}

/// Per call-class request timeouts, in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Health and auth-status probes.
    pub probe_ms: u64,
    /// Root discovery and history reads.
    pub lookup_ms: u64,
    /// Init, commit, rename, restore and extraction.
    pub mutate_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_ms: 1_000,
            lookup_ms: 2_000,
            mutate_ms: 3_000,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("DraftLink/{}", env!("CARGO_PKG_VERSION")),
            timeouts: TimeoutConfig::default(),
            root_ttl_secs: 30,
            history_min_refetch_secs: 60,
            poll_interval_ms: 5_000,
            poll_tick_ms: 100,
            username_display_max: 15,
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let cfg: ClientConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads from `path`, then `$DRAFTLINK_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Self::load(Path::new(&p)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.history_min_refetch_secs <= self.root_ttl_secs {
            anyhow::bail!(
                "history_min_refetch_secs ({}) must exceed root_ttl_secs ({})",
                self.history_min_refetch_secs,
                self.root_ttl_secs
            );
        }
        if self.poll_tick_ms == 0 {
            anyhow::bail!("poll_tick_ms must be non-zero");
        }
        if self.poll_tick_ms > self.poll_interval_ms {
            anyhow::bail!(
                "poll_tick_ms ({}) must not exceed poll_interval_ms ({})",
                self.poll_tick_ms,
                self.poll_interval_ms
            );
        }
        if self.username_display_max == 0 {
            anyhow::bail!("username_display_max must be non-zero");
        }
        Ok(())
    }

    pub fn root_ttl(&self) -> Duration {
        Duration::from_secs(self.root_ttl_secs)
    }

    pub fn history_min_refetch(&self) -> Duration {
        Duration::from_secs(self.history_min_refetch_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_tick(&self) -> Duration {
        Duration::from_millis(self.poll_tick_ms)
    }
}

#[cfg(test)]
#[path = "../tests/model/config_tests.rs"]
mod tests;
