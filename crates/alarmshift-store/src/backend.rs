//! SnapshotBackend trait: raw key/value access to the durable store.
//! Merge semantics live in [`SnapshotStore`](crate::store::SnapshotStore).

use crate::error::StoreError;

/// Trait for snapshot persistence. Enables in-memory injection for testing.
pub trait SnapshotBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, body: &str) -> Result<(), StoreError>;
}

impl<T: SnapshotBackend + ?Sized> SnapshotBackend for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &str) -> Result<(), StoreError> {
        (**self).put(key, body)
    }
}

impl<T: SnapshotBackend + ?Sized> SnapshotBackend for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, body: &str) -> Result<(), StoreError> {
        (**self).put(key, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;
    impl SnapshotBackend for Fixed {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some("{}".to_string()))
        }
        fn put(&self, _key: &str, _body: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn blanket_ref_and_box_impls() {
        let fixed = Fixed;
        let r: &Fixed = &fixed;
        assert_eq!(r.get("k").expect("ok").as_deref(), Some("{}"));

        let boxed: Box<dyn SnapshotBackend> = Box::new(Fixed);
        assert!(boxed.put("k", "{}").is_ok());
    }
}
