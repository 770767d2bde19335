//! Generic persistent key→value association store.
//!
//! One JSON object per named domain, rewritten in full on every mutation.
//! The same store backs two unrelated lookups: project-name→project-id
//! ("projname") and chat-nick→tracker-username ("v1ircnick").

use crate::error::{Result, TrackerError};
use crate::{io, paths};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

// ---------------------------------------------------------------------------
// MappingStore
// ---------------------------------------------------------------------------

/// Factory for mapping domains under one data directory; domains live in
/// its `mappings/` subdirectory. Handles opened for the same domain share a
/// mutex, so read-modify-write cycles on a domain are serialized no matter
/// how many handles exist.
pub struct MappingStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MappingStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: paths::mappings_dir(&data_dir.into()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open a domain by name. Absence of the backing file is a valid,
    /// queryable state, not an error.
    pub fn open(&self, domain: &str) -> Result<MappingDomain> {
        paths::validate_domain(domain)?;
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(domain.to_string()).or_default())
        };
        Ok(MappingDomain {
            domain: domain.to_string(),
            path: paths::mapping_path(&self.dir, domain),
            lock,
        })
    }
}

// ---------------------------------------------------------------------------
// MappingDomain
// ---------------------------------------------------------------------------

/// Handle on one persisted domain.
#[derive(Debug, Clone)]
pub struct MappingDomain {
    domain: String,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl MappingDomain {
    /// `None` means the domain was never created.
    fn load(&self) -> Result<Option<BTreeMap<String, String>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_string_pretty(map)?;
        io::atomic_write(&self.path, data.as_bytes())
    }

    fn key_absent(&self, key: &str) -> TrackerError {
        TrackerError::MappingKeyAbsent {
            domain: self.domain.clone(),
            key: key.to_string(),
        }
    }

    pub fn get(&self, key: &str) -> Result<String> {
        self.load()?
            .and_then(|map| map.get(key).cloned())
            .ok_or_else(|| self.key_absent(key))
    }

    /// Read-modify-write under the domain mutex: concurrent `set`s on
    /// disjoint keys both survive.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?.unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.persist(&map)
    }

    /// Removing an absent key is reported, not silently ignored.
    pub fn unset(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?.ok_or_else(|| self.key_absent(key))?;
        if map.remove(key).is_none() {
            return Err(self.key_absent(key));
        }
        self.persist(&map)
    }

    /// All entries in key order, or `None` if the domain was never created
    /// (distinct from an existing-but-empty domain).
    pub fn list(&self) -> Result<Option<Vec<(String, String)>>> {
        Ok(self.load()?.map(|map| map.into_iter().collect()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
