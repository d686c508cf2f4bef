use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SyncError, SyncResult};
use crate::model::{AuthStatus, ClientConfig, CommitReceipt, TimeoutConfig, VersionRecord};

mod http_client;
pub use self::http_client::{CallClass, normalize_reply};

mod types;
use self::types::*;
mod operations;

/// Requests this layer makes of the local version-history service.
///
/// Every failure, transport or application, comes back as an `Err`; nothing
/// here retries.
pub trait LocalService: Send + Sync {
    fn health(&self) -> SyncResult<()>;
    fn auth_status(&self) -> SyncResult<AuthStatus>;

    /// `Ok(None)` means the service found no project above `dir`.
    fn find_root(&self, dir: &Path) -> SyncResult<Option<PathBuf>>;
    fn init_project(&self, dir: &Path) -> SyncResult<()>;
    fn commit(&self, root: &Path, label: &str, files: &[PathBuf]) -> SyncResult<CommitReceipt>;

    /// Full, unfiltered project history in service order.
    fn history(&self, root: &Path) -> SyncResult<Vec<VersionRecord>>;

    /// Writes one file of a version to a temp location and returns its path.
    fn extract_temp(&self, root: &Path, version_id: &str, relative_path: &str)
    -> SyncResult<PathBuf>;

    /// Overwrites the version's files in place under `root`.
    fn restore(&self, root: &Path, version_id: &str) -> SyncResult<()>;
    fn rename_version(&self, root: &Path, version_id: &str, label: &str) -> SyncResult<()>;
}

pub struct RemoteClient {
    base_url: String,
    timeouts: TimeoutConfig,
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(config: &ClientConfig) -> SyncResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_millis(config.timeouts.probe_ms))
            .build()
            .map_err(|e| SyncError::Invariant(format!("build http client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeouts: config.timeouts.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
