//! Request and response bodies of the local service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct FindRootRequest<'a> {
    pub(super) path: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FindRootResponse {
    #[serde(default)]
    pub(super) root: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectRequest<'a> {
    pub(super) project_root: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommitRequest<'a> {
    pub(super) project_root: &'a str,
    pub(super) label: &'a str,
    pub(super) files: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExtractTempRequest<'a> {
    pub(super) project_root: &'a str,
    pub(super) version_id: &'a str,
    pub(super) relative_path: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExtractTempResponse {
    pub(super) path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VersionRequest<'a> {
    pub(super) project_root: &'a str,
    pub(super) version_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RenameVersionRequest<'a> {
    pub(super) project_root: &'a str,
    pub(super) version_id: &'a str,
    pub(super) new_label: &'a str,
}
