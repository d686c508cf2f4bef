use std::time::Duration;

use tracing::{debug, warn};

use super::*;

/// Groups endpoints by how long the UI can afford to wait on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallClass {
    Probe,
    Lookup,
    Mutate,
}

impl RemoteClient {
    /// Issues one request and folds every failure mode into `SyncError`.
    ///
    /// POST when a body is given, GET otherwise.
    pub fn call(
        &self,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        class: CallClass,
    ) -> SyncResult<serde_json::Value> {
        let req = match body {
            Some(body) => self.client.post(self.url(endpoint)).json(body),
            None => self.client.get(self.url(endpoint)),
        };
        let resp = req
            .timeout(self.timeout(class))
            .send()
            .map_err(|e| transport_error(endpoint, &e))?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().map_err(|e| transport_error(endpoint, &e))?;
        debug!(endpoint, status, len = bytes.len(), "service reply");
        normalize_reply(endpoint, status, &bytes)
    }

    pub(super) fn timeout(&self, class: CallClass) -> Duration {
        let ms = match class {
            CallClass::Probe => self.timeouts.probe_ms,
            CallClass::Lookup => self.timeouts.lookup_ms,
            CallClass::Mutate => self.timeouts.mutate_ms,
        };
        Duration::from_millis(ms)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(endpoint: &str, err: &reqwest::Error) -> SyncError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    warn!(endpoint, %message, "service call failed");
    SyncError::transport(endpoint, message)
}

/// Maps a raw HTTP reply onto success or the failure taxonomy.
///
/// A 2xx JSON body is a success unless it carries `"success": false`.
pub fn normalize_reply(endpoint: &str, status: u16, body: &[u8]) -> SyncResult<serde_json::Value> {
    let parsed = serde_json::from_slice::<serde_json::Value>(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .and_then(|v| error_field(&v))
            .unwrap_or_else(|| format!("HTTP {status}"));
        warn!(endpoint, status, %message, "service returned error status");
        return Err(SyncError::application(endpoint, message));
    }

    let value = parsed.map_err(|e| SyncError::transport(endpoint, format!("malformed response: {e}")))?;
    if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
        let message = error_field(&value).unwrap_or_else(|| "Unknown Error".to_string());
        return Err(SyncError::application(endpoint, message));
    }
    Ok(value)
}

fn error_field(v: &serde_json::Value) -> Option<String> {
    v.get("error")
        .and_then(|e| e.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
