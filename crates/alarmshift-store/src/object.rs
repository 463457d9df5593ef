//! Object-store style backend: one JSON document per key under
//! `<root>/<prefix>/<key>.json`.

use std::path::PathBuf;

use crate::backend::SnapshotBackend;
use crate::error::StoreError;
use crate::fs_util::{read_optional, write_atomic};

#[derive(Debug, Clone)]
pub struct ObjectBackend {
    root: PathBuf,
    prefix: String,
}

impl ObjectBackend {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        let dir = if self.prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(self.prefix.trim_matches('/'))
        };
        dir.join(format!("{key}.json"))
    }
}

impl SnapshotBackend for ObjectBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(read_optional(&self.object_path(key))?)
    }

    fn put(&self, key: &str, body: &str) -> Result<(), StoreError> {
        write_atomic(&self.object_path(key), body.as_bytes())?;
        Ok(())
    }
}
