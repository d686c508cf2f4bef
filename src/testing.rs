//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::host::HostDocument;
use crate::model::{AuthStatus, CommitReceipt, VersionRecord};
use crate::remote::LocalService;

pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn events(log: &EventLog) -> Vec<String> {
    log.lock().expect("event log").clone()
}

/// Scripted stand-in for the local service. Every call is appended to `log`.
pub(crate) struct MockService {
    pub(crate) log: EventLog,
    pub(crate) reachable: AtomicBool,
    pub(crate) panic_on_health: AtomicBool,
    pub(crate) auth: Mutex<AuthStatus>,
    pub(crate) roots: Mutex<HashMap<PathBuf, PathBuf>>,
    pub(crate) history: Mutex<Vec<VersionRecord>>,
    pub(crate) restore_error: Mutex<Option<String>>,
    pub(crate) extract_to: Mutex<Option<PathBuf>>,
    next_version: AtomicUsize,
}

impl MockService {
    pub(crate) fn new(log: EventLog) -> Self {
        Self {
            log,
            reachable: AtomicBool::new(true),
            panic_on_health: AtomicBool::new(false),
            auth: Mutex::new(AuthStatus::default()),
            roots: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
            restore_error: Mutex::new(None),
            extract_to: Mutex::new(None),
            next_version: AtomicUsize::new(1),
        }
    }

    pub(crate) fn with_root(self, dir: &str, root: &str) -> Self {
        self.roots
            .lock()
            .expect("roots")
            .insert(PathBuf::from(dir), PathBuf::from(root));
        self
    }

    pub(crate) fn calls(&self, prefix: &str) -> usize {
        events(&self.log)
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn record(&self, event: String) {
        self.log.lock().expect("event log").push(event);
    }

    fn ensure_up(&self, endpoint: &str) -> SyncResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::transport(endpoint, "connection refused"))
        }
    }
}

pub(crate) fn record(id: &str, files: &[&str]) -> VersionRecord {
    VersionRecord {
        id: id.to_string(),
        version_number: "1".to_string(),
        label: format!("label {id}"),
        timestamp_iso: "2026-01-01T00:00:00Z".to_string(),
        files: files
            .iter()
            .map(|f| (f.to_string(), serde_json::json!({})))
            .collect(),
    }
}

impl LocalService for MockService {
    fn health(&self) -> SyncResult<()> {
        self.record("health".into());
        if self.panic_on_health.load(Ordering::SeqCst) {
            panic!("health probe exploded");
        }
        self.ensure_up("/health")
    }

    fn auth_status(&self) -> SyncResult<AuthStatus> {
        self.record("auth_status".into());
        self.ensure_up("/auth/status")?;
        Ok(self.auth.lock().expect("auth").clone())
    }

    fn find_root(&self, dir: &Path) -> SyncResult<Option<PathBuf>> {
        self.record(format!("find_root:{}", dir.display()));
        self.ensure_up("/draft/find-root")?;
        Ok(self.roots.lock().expect("roots").get(dir).cloned())
    }

    fn init_project(&self, dir: &Path) -> SyncResult<()> {
        self.record(format!("init:{}", dir.display()));
        self.ensure_up("/draft/init")?;
        self.roots
            .lock()
            .expect("roots")
            .insert(dir.to_path_buf(), dir.to_path_buf());
        Ok(())
    }

    fn commit(&self, _root: &Path, label: &str, files: &[PathBuf]) -> SyncResult<CommitReceipt> {
        self.record(format!("commit:{label}"));
        self.ensure_up("/draft/commit")?;
        let n = self.next_version.fetch_add(1, Ordering::SeqCst);
        let id = format!("ver-{n}");
        let mut rec = record(&id, &[]);
        rec.version_number = n.to_string();
        rec.label = label.to_string();
        rec.files = files
            .iter()
            .map(|f| (f.to_string_lossy().into_owned(), serde_json::json!({})))
            .collect();
        self.history.lock().expect("history").insert(0, rec);
        Ok(CommitReceipt {
            version_id: id,
            version_number: n.to_string(),
        })
    }

    fn history(&self, root: &Path) -> SyncResult<Vec<VersionRecord>> {
        self.record(format!("history:{}", root.display()));
        self.ensure_up("/draft/history")?;
        Ok(self.history.lock().expect("history").clone())
    }

    fn extract_temp(&self, _root: &Path, version_id: &str, rel: &str) -> SyncResult<PathBuf> {
        self.record(format!("extract:{version_id}:{rel}"));
        self.ensure_up("/draft/extract-temp")?;
        self.extract_to
            .lock()
            .expect("extract")
            .clone()
            .ok_or_else(|| SyncError::application("/draft/extract-temp", "nothing to extract"))
    }

    fn restore(&self, _root: &Path, version_id: &str) -> SyncResult<()> {
        self.record(format!("remote_restore:{version_id}"));
        self.ensure_up("/draft/restore")?;
        match self.restore_error.lock().expect("restore").clone() {
            Some(msg) => Err(SyncError::application("/draft/restore", msg)),
            None => Ok(()),
        }
    }

    fn rename_version(&self, _root: &Path, version_id: &str, label: &str) -> SyncResult<()> {
        self.record(format!("rename:{version_id}:{label}"));
        self.ensure_up("/draft/rename-version")?;
        for rec in self.history.lock().expect("history").iter_mut() {
            if rec.id == version_id {
                rec.label = label.to_string();
            }
        }
        Ok(())
    }
}

/// Virtual clock: `sleep` advances time instantly and runs `on_sleep`.
pub(crate) struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
    pub(crate) sleeps: AtomicUsize,
    on_sleep: Mutex<Option<Box<dyn Fn(usize) + Send>>>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: AtomicUsize::new(0),
            on_sleep: Mutex::new(None),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock().expect("clock") += by;
    }

    pub(crate) fn on_sleep(&self, hook: impl Fn(usize) + Send + 'static) {
        *self.on_sleep.lock().expect("clock hook") = Some(Box::new(hook));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().expect("clock")
    }

    fn sleep(&self, dur: Duration) {
        self.advance(dur);
        let n = self.sleeps.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(hook) = self.on_sleep.lock().expect("clock hook").as_ref() {
            hook(n);
        }
    }
}

/// Host that records capability calls into the shared event log.
pub(crate) struct RecordingHost {
    pub(crate) log: EventLog,
    pub(crate) path: Option<PathBuf>,
    pub(crate) modified: bool,
    pub(crate) fail_open: bool,
}

impl RecordingHost {
    pub(crate) fn new(log: EventLog, path: Option<&str>) -> Self {
        Self {
            log,
            path: path.map(PathBuf::from),
            modified: false,
            fail_open: false,
        }
    }

    fn record(&self, event: String) {
        self.log.lock().expect("event log").push(event);
    }
}

impl HostDocument for RecordingHost {
    fn current_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn save(&mut self) -> SyncResult<()> {
        self.record("save".into());
        self.modified = false;
        Ok(())
    }

    fn discard_and_load_blank(&mut self) -> SyncResult<()> {
        self.record("release_lock".into());
        self.path = None;
        self.modified = false;
        Ok(())
    }

    fn open(&mut self, path: &Path) -> SyncResult<()> {
        self.record(format!("reopen:{}", path.display()));
        if self.fail_open {
            return Err(SyncError::local_io(
                "open",
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            ));
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}
