use serde::{Deserialize, Serialize};

/// Last known reachability and login state of the local service.
///
/// Replaced wholesale by the status poller; never patched field by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub service_reachable: bool,
    pub logged_in: bool,
    pub username: Option<String>,
}

impl StatusSnapshot {
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn reachable(auth: Option<&AuthStatus>, username_max: usize) -> Self {
        match auth {
            Some(a) if a.logged_in => Self {
                service_reachable: true,
                logged_in: true,
                username: Some(truncate_display(
                    a.username.as_deref().unwrap_or("User"),
                    username_max,
                )),
            },
            _ => Self {
                service_reachable: true,
                logged_in: false,
                username: None,
            },
        }
    }
}

/// Answer of the service's auth-status endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// Cuts `s` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3).max(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
#[path = "../tests/model/status_tests.rs"]
mod tests;
