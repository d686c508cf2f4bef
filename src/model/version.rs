use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;

fn default_label() -> String {
    "Untitled".to_string()
}

fn default_version_number() -> String {
    "0".to_string()
}

/// Accepts `"3"`, `3` or `3.1` for version numbers; the service is not consistent.
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => default_version_number(),
        other => other.to_string(),
    })
}

/// One committed version of a project, as reported by the service.
///
/// Records are never mutated client-side; collections of them are filtered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub id: String,

    #[serde(
        default = "default_version_number",
        deserialize_with = "string_or_number"
    )]
    pub version_number: String,

    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default, rename = "timestamp")]
    pub timestamp_iso: String,

    /// Keyed by relative or absolute path; only the basename is meaningful here.
    #[serde(default)]
    pub files: BTreeMap<String, serde_json::Value>,
}

fn date_format() -> &'static [BorrowedFormatItem<'static>] {
    static FMT: OnceLock<Vec<BorrowedFormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse(
            "[year]-[month repr:numerical padding:zero]-[day padding:zero]",
        )
        .unwrap_or_default()
    })
}

impl VersionRecord {
    /// Calendar date of the commit, e.g. `2026-10-17`.
    pub fn display_date(&self) -> String {
        OffsetDateTime::parse(&self.timestamp_iso, &Rfc3339)
            .ok()
            .and_then(|dt| dt.format(date_format()).ok())
            .unwrap_or_else(|| {
                self.timestamp_iso
                    .split('T')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
    }

    pub fn display_line(&self) -> String {
        format!(
            "v{}: {} ({})",
            self.version_number,
            self.label,
            self.display_date()
        )
    }

    /// Basenames of every tracked file in this version.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|k| crate::identity::basename_of(k))
    }
}

/// Result of a successful commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub version_id: String,

    #[serde(
        default = "default_version_number",
        deserialize_with = "string_or_number"
    )]
    pub version_number: String,
}

#[cfg(test)]
#[path = "../tests/model/version_tests.rs"]
mod tests;
