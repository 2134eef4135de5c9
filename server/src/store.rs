//! Persistence for the paste collection.
//!
//! The persisted state is a handful of independently named JSON slots under a
//! data directory; this component only writes the `pastes` slot. The
//! `auth_users` and `session` slots belong to the auth collaborator and are
//! reserved here purely so the namespaces cannot collide.
//!
//! Slot reads fail open: a missing or unreadable file, or a slot that is not
//! valid JSON, yields the empty collection. Individual records that cannot be
//! decoded are skipped so one bad entry does not take the rest down with it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pastebox_common::{Error, Paste};
use tracing::warn;

pub const PASTES_SLOT: &str = "pastes";
pub const AUTH_USERS_SLOT: &str = "auth_users";
pub const SESSION_SLOT: &str = "session";

/// Storage capability injected into the lifecycle manager.
pub trait PasteStore: Send + 'static {
    /// Loads the full paste collection. Read failures recover to an empty
    /// collection; implementations only error on internal faults.
    fn load(&self) -> Result<Vec<Paste>, Error>;

    /// Replaces the persisted collection.
    fn save(&self, pastes: &[Paste]) -> Result<(), Error>;
}

/// One named slot of the persisted state, stored as `<dir>/<name>.json`.
pub struct Slot {
    path: PathBuf,
}

impl Slot {
    #[must_use]
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
        }
    }

    fn read(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("failed to read slot {}: {e}", self.path.display());
                None
            }
        }
    }

    // Write through a sibling temp file so a crash can't leave a torn slot.
    fn write(&self, contents: &str) -> Result<(), Error> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

/// JSON-file backed store over the `pastes` slot.
pub struct FileStore {
    slot: Slot,
}

impl FileStore {
    /// Opens (creating if needed) the data directory and binds the `pastes`
    /// slot inside it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Storage(format!("failed to create data dir {}: {e}", dir.display()))
        })?;

        Ok(Self {
            slot: Slot::new(dir, PASTES_SLOT),
        })
    }
}

impl PasteStore for FileStore {
    fn load(&self) -> Result<Vec<Paste>, Error> {
        let Some(raw) = self.slot.read() else {
            return Ok(Vec::new());
        };

        Ok(decode_records(&raw))
    }

    fn save(&self, pastes: &[Paste]) -> Result<(), Error> {
        let raw = serde_json::to_string(pastes)
            .map_err(|e| Error::Storage(format!("failed to serialize pastes slot: {e}")))?;
        self.slot.write(&raw)
    }
}

/// In-memory store used by tests and embedding callers.
#[derive(Default)]
pub struct MemoryStore {
    pastes: Mutex<Vec<Paste>>,
}

impl MemoryStore {
    #[must_use]
    pub fn seeded(pastes: Vec<Paste>) -> Self {
        Self {
            pastes: Mutex::new(pastes),
        }
    }
}

impl PasteStore for MemoryStore {
    fn load(&self) -> Result<Vec<Paste>, Error> {
        self.pastes
            .lock()
            .map(|pastes| pastes.clone())
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))
    }

    fn save(&self, pastes: &[Paste]) -> Result<(), Error> {
        let mut slot = self
            .pastes
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".to_string()))?;
        *slot = pastes.to_vec();
        Ok(())
    }
}

fn decode_records(raw: &str) -> Vec<Paste> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!("pastes slot is not valid JSON, treating it as empty: {e}");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Paste>(value) {
            Ok(paste) if !paste.id.is_empty() && !paste.content.is_empty() => Some(paste),
            Ok(_) => {
                warn!("skipping stored paste without an id or content");
                None
            }
            Err(e) => {
                warn!("skipping undecodable stored paste: {e}");
                None
            }
        })
        .collect()
}
