//! Narrow, function-shaped store contracts the validator depends on.
//!
//! Each capability is implemented for plain closures, so a caller can pass
//! `|id: &EquipmentID| repository.equipment_exists(*id)` and a test can pass
//! `|_: &EquipmentID| Ok(true)`.

use crate::StorageError;

pub trait Exists<K> {
    fn exists(&self, key: &K) -> Result<bool, StorageError>;
}

impl<K, F> Exists<K> for F
where
    F: Fn(&K) -> Result<bool, StorageError>,
{
    fn exists(&self, key: &K) -> Result<bool, StorageError> {
        self(key)
    }
}

pub trait Lookup<K, V> {
    fn lookup(&self, key: &K) -> Result<Option<V>, StorageError>;
}

impl<K, V, F> Lookup<K, V> for F
where
    F: Fn(&K) -> Result<Option<V>, StorageError>,
{
    fn lookup(&self, key: &K) -> Result<Option<V>, StorageError> {
        self(key)
    }
}

/// Maps candidates onto their persisted counterparts. Candidates without a
/// persisted counterpart are left out of the result.
pub trait Resolve<V> {
    fn resolve(&self, candidates: &[V]) -> Result<Vec<V>, StorageError>;
}

impl<V, F> Resolve<V> for F
where
    F: Fn(&[V]) -> Result<Vec<V>, StorageError>,
{
    fn resolve(&self, candidates: &[V]) -> Result<Vec<V>, StorageError> {
        self(candidates)
    }
}
