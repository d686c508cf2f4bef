//! Typed wrappers over [`RemoteClient::call`], one per service endpoint.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use super::*;

const HEALTH: &str = "/health";
const AUTH_STATUS: &str = "/auth/status";
const FIND_ROOT: &str = "/draft/find-root";
const INIT: &str = "/draft/init";
const COMMIT: &str = "/draft/commit";
const HISTORY: &str = "/draft/history";
const EXTRACT_TEMP: &str = "/draft/extract-temp";
const RESTORE: &str = "/draft/restore";
const RENAME_VERSION: &str = "/draft/rename-version";

fn path_str(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: serde_json::Value) -> SyncResult<T> {
    serde_json::from_value(value)
        .map_err(|e| SyncError::transport(endpoint, format!("malformed response: {e}")))
}

impl RemoteClient {
    fn post<B: Serialize>(&self, endpoint: &str, body: &B, class: CallClass) -> SyncResult<serde_json::Value> {
        let body = serde_json::to_value(body)
            .map_err(|e| SyncError::Invariant(format!("encode {endpoint} request: {e}")))?;
        self.call(endpoint, Some(&body), class)
    }
}

impl LocalService for RemoteClient {
    fn health(&self) -> SyncResult<()> {
        let v = self.call(HEALTH, None, CallClass::Probe)?;
        if v.get("success").and_then(|s| s.as_bool()) != Some(true) {
            return Err(SyncError::application(HEALTH, "health check did not report success"));
        }
        Ok(())
    }

    fn auth_status(&self) -> SyncResult<AuthStatus> {
        let v = self.call(AUTH_STATUS, None, CallClass::Probe)?;
        decode(AUTH_STATUS, v)
    }

    fn find_root(&self, dir: &Path) -> SyncResult<Option<PathBuf>> {
        let dir = path_str(dir);
        let v = self.post(FIND_ROOT, &FindRootRequest { path: &dir }, CallClass::Lookup)?;
        let resp: FindRootResponse = decode(FIND_ROOT, v)?;
        Ok(resp.root.filter(|r| !r.is_empty()).map(PathBuf::from))
    }

    fn init_project(&self, dir: &Path) -> SyncResult<()> {
        let dir = path_str(dir);
        self.post(INIT, &ProjectRequest { project_root: &dir }, CallClass::Mutate)?;
        info!(root = %dir, "project initialized");
        Ok(())
    }

    fn commit(&self, root: &Path, label: &str, files: &[PathBuf]) -> SyncResult<CommitReceipt> {
        let root = path_str(root);
        let req = CommitRequest {
            project_root: &root,
            label,
            files: files.iter().map(|f| path_str(f)).collect(),
        };
        let v = self.post(COMMIT, &req, CallClass::Mutate)?;
        let receipt: CommitReceipt = decode(COMMIT, v)?;
        info!(root = %root, version = %receipt.version_id, "committed");
        Ok(receipt)
    }

    fn history(&self, root: &Path) -> SyncResult<Vec<VersionRecord>> {
        let root = path_str(root);
        let v = self.post(HISTORY, &ProjectRequest { project_root: &root }, CallClass::Lookup)?;
        let list = match v {
            serde_json::Value::Object(mut obj) => obj
                .remove("versions")
                .or_else(|| obj.remove("history"))
                .unwrap_or(serde_json::Value::Array(Vec::new())),
            serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
            other => other,
        };
        decode(HISTORY, list)
    }

    fn extract_temp(
        &self,
        root: &Path,
        version_id: &str,
        relative_path: &str,
    ) -> SyncResult<PathBuf> {
        let root = path_str(root);
        let req = ExtractTempRequest {
            project_root: &root,
            version_id,
            relative_path,
        };
        let v = self.post(EXTRACT_TEMP, &req, CallClass::Mutate)?;
        let resp: ExtractTempResponse = decode(EXTRACT_TEMP, v)?;
        Ok(PathBuf::from(resp.path))
    }

    fn restore(&self, root: &Path, version_id: &str) -> SyncResult<()> {
        let root = path_str(root);
        self.post(
            RESTORE,
            &VersionRequest {
                project_root: &root,
                version_id,
            },
            CallClass::Mutate,
        )?;
        info!(root = %root, version = version_id, "restored in place");
        Ok(())
    }

    fn rename_version(&self, root: &Path, version_id: &str, label: &str) -> SyncResult<()> {
        let root = path_str(root);
        let req = RenameVersionRequest {
            project_root: &root,
            version_id,
            new_label: label,
        };
        self.post(RENAME_VERSION, &req, CallClass::Mutate)?;
        info!(version = version_id, label, "version renamed");
        Ok(())
    }
}
