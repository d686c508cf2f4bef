//! Canonical file identity across restore-induced renames.
//!
//! Restoring or retrieving a version leaves files named like
//! `Shot-v1.2-retrieved.blend`, `Shot-retrieved-version-2.blend` or
//! `Shot retrieved version.blend`. Two strategies map such names back:
//!
//! - [`strict_recover`] picks the on-disk file a restore should overwrite. It
//!   only recognises the exact shapes this layer and the service produce.
//! - [`loose_normalize`] picks the basename used to match history entries and
//!   tolerates any suffix drift from repeated restores.
//!
//! Both are heuristics: a hyphenated original name ending in something that
//! looks like a version tag is stripped too.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{SyncError, SyncResult};

const LEGACY_MARKER: &str = "-retrieved-version";
const RETRIEVED_SUFFIX: &str = "-retrieved";
const SPACED_MARKER: &str = " retrieved version";

/// How a name is recovered; see the module docs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    StrictRecover,
    LooseNormalize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalIdentity {
    pub canonical_path: PathBuf,
    pub canonical_basename: String,
}

impl CanonicalIdentity {
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            canonical_path: strict_recover(path),
            canonical_basename: loose_normalize(&name),
        }
    }

    /// Case-insensitive basename match against a history file key.
    pub fn matches_entry(&self, entry_path: &str) -> bool {
        basename_of(entry_path).to_lowercase() == self.canonical_basename.to_lowercase()
    }
}

pub fn recover(path: &Path, strategy: Strategy) -> PathBuf {
    match strategy {
        Strategy::StrictRecover => strict_recover(path),
        Strategy::LooseNormalize => {
            let Some(name) = path.file_name() else {
                return path.to_path_buf();
            };
            path.with_file_name(loose_normalize(&name.to_string_lossy()))
        }
    }
}

/// Resolves the path that should hold restored content for `path`.
///
/// Total: returns `path` unchanged when no restore marker matches.
pub fn strict_recover(path: &Path) -> PathBuf {
    let Some((stem, ext)) = split_name(path) else {
        return path.to_path_buf();
    };

    let base = if let Some(idx) = stem.find(LEGACY_MARKER) {
        Some(&stem[..idx])
    } else if let Some(rest) = stem.strip_suffix(RETRIEVED_SUFFIX) {
        match rest.rfind('-') {
            Some(idx) => Some(&rest[..idx]),
            None => Some(rest),
        }
    } else {
        find_ignore_ascii_case(stem, SPACED_MARKER).map(|idx| &stem[..idx])
    };

    match base {
        Some(base) if !base.is_empty() => path.with_file_name(join_name(base, ext)),
        _ => path.to_path_buf(),
    }
}

/// Normalizes a basename for history matching. Input and output are file
/// names (with extension), not paths.
pub fn loose_normalize(file_name: &str) -> String {
    let (stem, ext) = split_file_name(file_name);

    let clean = if let Some(idx) = find_ignore_ascii_case(stem, SPACED_MARKER) {
        stem[..idx].to_string()
    } else if let Some(idx) = stem.find(LEGACY_MARKER) {
        stem[..idx].to_string()
    } else if stem.contains(RETRIEVED_SUFFIX) {
        let mut s = stem.replace(RETRIEVED_SUFFIX, "");
        // version tag, then a disambiguating counter
        for _ in 0..2 {
            s = version_tag_pattern().replace(&s, "").into_owned();
        }
        s
    } else {
        stem.to_string()
    };

    if clean.is_empty() {
        return file_name.to_string();
    }
    join_name(&clean, ext)
}

/// `Shot.blend` + `1.2` -> `Shot-v1.2-retrieved.blend`.
pub fn retrieved_name(canonical: &Path, version_number: &str) -> PathBuf {
    let Some((stem, ext)) = split_name(canonical) else {
        return canonical.to_path_buf();
    };
    let tag = version_number.trim_start_matches(['v', 'V']);
    canonical.with_file_name(join_name(&format!("{stem}-v{tag}{RETRIEVED_SUFFIX}"), ext))
}

/// Last path segment, accepting both `/` and `\` separators.
pub fn basename_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// A tracked file and its project-relative form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootRelative {
    pub file: PathBuf,
    /// `/`-separated, as the service expects on every platform.
    pub relative: String,
}

/// Expresses `target` relative to `root`.
///
/// Falls back to `live` when the recovered `target` does not sit under the
/// root; fails when neither does (outside the project, or another volume).
pub fn relative_to_root(target: &Path, live: &Path, root: &Path) -> SyncResult<RootRelative> {
    let root_abs = absolute(root)?;
    for candidate in [target, live] {
        let abs = absolute(candidate)?;
        if let Ok(rel) = abs.strip_prefix(&root_abs) {
            let parts: Vec<String> = rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            if !parts.is_empty() {
                return Ok(RootRelative {
                    file: candidate.to_path_buf(),
                    relative: parts.join("/"),
                });
            }
        }
    }
    Err(SyncError::IdentityAmbiguity(format!(
        "{} is not inside project root {}",
        live.display(),
        root.display()
    )))
}

fn absolute(path: &Path) -> SyncResult<PathBuf> {
    std::path::absolute(path).map_err(|e| SyncError::local_io("resolve", path, e))
}

fn version_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"-v?[0-9][0-9.]*$").expect("version tag pattern should compile")
    })
}

fn split_name(path: &Path) -> Option<(&str, Option<&str>)> {
    let name = path.file_name()?.to_str()?;
    Some(split_file_name(name))
}

/// Splits off the extension, looking only past a retrieve marker so a dotted
/// version tag (`Notes-v1.2-retrieved`) is not mistaken for one.
fn split_file_name(name: &str) -> (&str, Option<&str>) {
    let marker_end = name
        .rfind(RETRIEVED_SUFFIX)
        .map(|idx| idx + RETRIEVED_SUFFIX.len())
        .or_else(|| find_ignore_ascii_case(name, SPACED_MARKER).map(|idx| idx + SPACED_MARKER.len()))
        .unwrap_or(0);
    match name[marker_end..].rfind('.').map(|idx| marker_end + idx) {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

fn join_name(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
