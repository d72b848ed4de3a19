//! The contract shared by both store engines

use crate::{error::StoreError, hashing::KeyBytes};
use std::borrow::Borrow;

/// Operations every store in this crate supports.
///
/// Stores are single-threaded: mutation takes `&mut self` and nothing is
/// synchronized internally. Wrap a store in a `Mutex` or `RwLock` to share it
/// between threads.
pub trait KeyValueStore<K, V> {
    /// Inserts a pair, returning the value it replaced
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableFull` if a fixed-capacity store has no room.
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StoreError>;

    /// Returns the value stored for `key`
    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized;

    /// Removes `key`, returning its value. Absent keys are a no-op.
    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized;

    /// Returns the stored value for `key`, inserting `V::default()` first if absent
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableFull` if the key is absent and there is no room.
    fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, StoreError>
    where
        V: Default;

    /// Returns the number of live entries
    fn len(&self) -> usize;

    /// Returns true if `key` has a value
    fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns true if the store holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
