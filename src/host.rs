//! Capabilities of the application that owns the open document.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// What this layer needs from the editing application. Implementations own
/// the document and its file handle; this layer only sequences calls.
pub trait HostDocument {
    /// Path of the file backing the current document, if any.
    fn current_path(&self) -> Option<PathBuf>;

    /// Writes the current document to its file.
    fn save(&mut self) -> SyncResult<()>;

    /// Drops the current document without writing and releases its handle.
    fn discard_and_load_blank(&mut self) -> SyncResult<()>;

    /// Loads `path` as the active document.
    fn open(&mut self, path: &Path) -> SyncResult<()>;

    fn is_modified(&self) -> bool;
}

/// A plain file standing in for a document: opening holds a read handle,
/// which is what blocks overwrites on platforms with exclusive locks.
#[derive(Debug, Default)]
pub struct FileHost {
    path: Option<PathBuf>,
    handle: Option<File>,
}

impl FileHost {
    pub fn open_file(path: &Path) -> SyncResult<Self> {
        let mut host = Self::default();
        host.open(path)?;
        Ok(host)
    }

    pub fn holds_handle(&self) -> bool {
        self.handle.is_some()
    }
}

impl HostDocument for FileHost {
    fn current_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn save(&mut self) -> SyncResult<()> {
        // The file is its own storage; saving only confirms it is still there.
        let Some(path) = &self.path else {
            return Err(SyncError::NoDocument);
        };
        std::fs::metadata(path).map_err(|e| SyncError::local_io("save", path, e))?;
        Ok(())
    }

    fn discard_and_load_blank(&mut self) -> SyncResult<()> {
        debug!(path = ?self.path, "releasing document handle");
        self.handle = None;
        self.path = None;
        Ok(())
    }

    fn open(&mut self, path: &Path) -> SyncResult<()> {
        let file = File::open(path).map_err(|e| SyncError::local_io("open", path, e))?;
        self.handle = Some(file);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn is_modified(&self) -> bool {
        false
    }
}
