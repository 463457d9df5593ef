//! Key/value parameter-store style backend.
//!
//! All parameters live in one JSON map at `<root>/parameters.json`, named
//! `/<prefix>/<key>`. Values are capped at the parameter-store ceiling.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::backend::SnapshotBackend;
use crate::error::StoreError;
use crate::fs_util::{read_optional, write_atomic};

/// Largest value a single parameter may hold (advanced tier).
pub const MAX_PARAMETER_BYTES: usize = 8 * 1024;

pub const PARAMETER_FILE: &str = "parameters.json";

#[derive(Debug)]
pub struct ParameterBackend {
    path: PathBuf,
    prefix: String,
    // Serializes read-modify-write of the shared parameter file.
    write_lock: Mutex<()>,
}

impl ParameterBackend {
    pub fn new(root: impl AsRef<Path>, prefix: impl Into<String>) -> Self {
        Self {
            path: root.as_ref().join(PARAMETER_FILE),
            prefix: prefix.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn parameter_name(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("/{key}")
        } else {
            format!("/{prefix}/{key}")
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match read_optional(&self.path)? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl SnapshotBackend for ParameterBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut params = self.load()?;
        Ok(params.remove(&self.parameter_name(key)))
    }

    fn put(&self, key: &str, body: &str) -> Result<(), StoreError> {
        let name = self.parameter_name(key);
        if body.len() > MAX_PARAMETER_BYTES {
            return Err(StoreError::ValueTooLarge {
                key: name,
                size: body.len(),
                limit: MAX_PARAMETER_BYTES,
            });
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Io(std::io::Error::other("parameter lock poisoned")))?;
        let mut params = self.load()?;
        params.insert(name, body.to_string());
        let encoded = serde_json::to_vec_pretty(&params)?;
        write_atomic(&self.path, &encoded)?;
        Ok(())
    }
}
