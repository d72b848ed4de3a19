//! Separate chaining over a fixed number of buckets.
//!
//! Keys are hashed and compared by their [`KeyBytes`] representation through
//! two pluggable capabilities, [`BucketHasher`] and [`KeyComparer`]. Each
//! store instance has one declared key type and one declared value type, so
//! entries of different widths can never share a table:
//!
//! ```compile_fail
//! use hashstores::ChainingStore;
//!
//! let mut store: ChainingStore<u32, u64> = ChainingStore::with_buckets(8)?;
//! store.insert(1_u16, 5_u8);
//! # Ok::<(), hashstores::StoreError>(())
//! ```

use crate::{
    error::StoreError,
    hashing::{KeyBytes, djb2, reduce},
    store::KeyValueStore,
};
use log::{debug, trace};
use std::{borrow::Borrow, fmt, mem, num::NonZeroUsize};

/// Bucket count used by `ChainingStore::default`
pub const DEFAULT_BUCKETS: NonZeroUsize = match NonZeroUsize::new(53) {
    Some(buckets) => buckets,
    None => NonZeroUsize::MIN,
};

/// Maps key bytes to a bucket index.
///
/// The store reduces the returned index modulo the bucket count, so an
/// out-of-range result still lands in a valid bucket.
pub trait BucketHasher {
    /// Returns the bucket for `key` in a table of `buckets` buckets
    fn bucket_index(&self, key: &[u8], buckets: NonZeroUsize) -> usize;
}

impl<F> BucketHasher for F
where
    F: Fn(&[u8], NonZeroUsize) -> usize,
{
    fn bucket_index(&self, key: &[u8], buckets: NonZeroUsize) -> usize {
        self(key, buckets)
    }
}

/// Decides whether two key byte sequences name the same key.
///
/// Only called for sequences of equal length.
pub trait KeyComparer {
    /// Returns true if `stored` and `probe` are the same key
    fn keys_equal(&self, stored: &[u8], probe: &[u8]) -> bool;
}

impl<F> KeyComparer for F
where
    F: Fn(&[u8], &[u8]) -> bool,
{
    fn keys_equal(&self, stored: &[u8], probe: &[u8]) -> bool {
        self(stored, probe)
    }
}

/// The default hasher: DJB2 reduced modulo the bucket count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Djb2;

impl BucketHasher for Djb2 {
    fn bucket_index(&self, key: &[u8], buckets: NonZeroUsize) -> usize {
        reduce(djb2(key), buckets)
    }
}

/// The default comparer: byte-for-byte equality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactBytes;

impl KeyComparer for ExactBytes {
    fn keys_equal(&self, stored: &[u8], probe: &[u8]) -> bool {
        stored == probe
    }
}

/// An owned key-value pair in a bucket's chain
#[derive(Debug, Clone)]
struct Entry<K, V> {
    /// The key of the pair
    key: K,
    /// The value associated with the key
    value: V,
}

/// A key-value store resolving collisions by chaining entries per bucket.
///
/// The bucket count is fixed at construction; the table never resizes, so
/// chains grow with the load factor.
///
/// Note: This store is not thread-safe. Guard it with a `Mutex` or `RwLock`
/// when sharing it between threads.
pub struct ChainingStore<K, V, H = Djb2, C = ExactBytes> {
    /// One chain of entries per bucket
    buckets: Box<[Vec<Entry<K, V>>]>,
    /// Number of buckets, equal to `buckets.len()`
    bucket_count: NonZeroUsize,
    /// Number of live entries across all chains
    len: usize,
    /// Maps key bytes to a bucket
    hasher: H,
    /// Decides key equality within a chain
    comparer: C,
}

/// A store whose keys and values are raw byte sequences, each carrying its own length
pub type ByteStore = ChainingStore<Vec<u8>, Vec<u8>>;

impl<K, V, H, C> fmt::Debug for ChainingStore<K, V, H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainingStore")
            .field("bucket_count", &self.bucket_count)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<K, V> Default for ChainingStore<K, V> {
    fn default() -> Self {
        Self::from_parts(DEFAULT_BUCKETS, Djb2, ExactBytes)
    }
}

impl<K, V> ChainingStore<K, V> {
    /// Creates a store with `buckets` buckets, the DJB2 hasher and byte equality
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCapacity` if `buckets` is zero.
    pub fn with_buckets(buckets: usize) -> Result<Self, StoreError> {
        ChainingStoreBuilder::new(buckets).build()
    }
}

impl<K, V, H, C> ChainingStore<K, V, H, C> {
    /// Creates an empty store from validated parts
    fn from_parts(bucket_count: NonZeroUsize, hasher: H, comparer: C) -> Self {
        debug!("creating chaining store with {bucket_count} buckets");
        Self {
            buckets: (0..bucket_count.get()).map(|_| Vec::new()).collect(),
            bucket_count,
            len: 0,
            hasher,
            comparer,
        }
    }

    /// Returns the number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed number of buckets
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.bucket_count.get()
    }

    /// Returns entries per bucket
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.bucket_count.get() as f64
    }

    /// Returns the chain length of every bucket, in bucket order
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Returns the length of the longest chain
    #[must_use]
    pub fn longest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Removes every entry, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Returns the chain of bucket `index`
    ///
    /// Indices come from `locate`, which reduces them modulo the bucket count.
    #[allow(clippy::indexing_slicing)]
    fn bucket(&self, index: usize) -> &Vec<Entry<K, V>> {
        &self.buckets[index]
    }

    /// Returns the chain of bucket `index` mutably
    #[allow(clippy::indexing_slicing)]
    fn bucket_mut(&mut self, index: usize) -> &mut Vec<Entry<K, V>> {
        &mut self.buckets[index]
    }
}

impl<K, V, H, C> ChainingStore<K, V, H, C>
where
    K: KeyBytes,
    H: BucketHasher,
    C: KeyComparer,
{
    /// Finds the bucket of `key` and the position of its entry in that bucket's chain
    fn locate<Q: KeyBytes + ?Sized>(&self, key: &Q) -> (usize, Option<usize>) {
        let probe = key.key_bytes();
        let probe = probe.as_ref();
        let index = self.hasher.bucket_index(probe, self.bucket_count) % self.bucket_count;
        let position = self.bucket(index).iter().position(|entry| {
            let stored = entry.key.key_bytes();
            let stored = stored.as_ref();
            stored.len() == probe.len() && self.comparer.keys_equal(stored, probe)
        });
        (index, position)
    }

    /// Inserts a pair, returning the value it replaced.
    ///
    /// Re-inserting a key replaces its value; the stored key is kept.
    #[allow(clippy::indexing_slicing)]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (index, position) = self.locate(&key);
        if let Some(position) = position {
            // `locate` only returns positions inside the bucket's chain.
            let entry = &mut self.bucket_mut(index)[position];
            return Some(mem::replace(&mut entry.value, value));
        }

        let bucket = self.bucket_mut(index);
        bucket.push(Entry { key, value });
        trace!("inserted new entry into bucket {index} (chain length {})", bucket.len());
        self.len = self.len.saturating_add(1);
        None
    }

    /// Returns the value stored for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + ?Sized,
    {
        let (index, position) = self.locate(key);
        self.bucket(index).get(position?).map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value stored for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + ?Sized,
    {
        let (index, position) = self.locate(key);
        self.bucket_mut(index).get_mut(position?).map(|entry| &mut entry.value)
    }

    /// Returns true if `key` has a value
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyBytes + ?Sized,
    {
        self.locate(key).1.is_some()
    }

    /// Removes `key` from its chain, returning its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + ?Sized,
    {
        let (index, position) = self.locate(key);
        let position = position?;
        let bucket = self.bucket_mut(index);
        if position >= bucket.len() {
            return None;
        }
        // Chain order is not observable.
        let entry = bucket.swap_remove(position);
        trace!("removed entry from bucket {index}");
        self.len = self.len.saturating_sub(1);
        Some(entry.value)
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    ///
    /// This is the only operation that creates entries implicitly; `get` never does.
    #[allow(clippy::indexing_slicing)]
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (index, position) = self.locate(&key);
        if position.is_none() {
            self.len = self.len.saturating_add(1);
            trace!("inserted default entry into bucket {index}");
        }
        let bucket = self.bucket_mut(index);
        let position = position.unwrap_or_else(|| {
            bucket.push(Entry { key, value: V::default() });
            bucket.len().saturating_sub(1)
        });
        // `position` is either a located entry or the one just pushed.
        &mut bucket[position].value
    }
}

impl<K, V, H, C> KeyValueStore<K, V> for ChainingStore<K, V, H, C>
where
    K: KeyBytes,
    H: BucketHasher,
    C: KeyComparer,
{
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StoreError> {
        Ok(Self::insert(self, key, value))
    }

    fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        Self::get(self, key)
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        Self::remove(self, key)
    }

    fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, StoreError>
    where
        V: Default,
    {
        Ok(Self::get_or_insert_default(self, key))
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// Configures the bucket count, hasher and comparer of a `ChainingStore`
pub struct ChainingStoreBuilder<H = Djb2, C = ExactBytes> {
    /// Requested number of buckets
    buckets: usize,
    /// Hasher the store will use
    hasher: H,
    /// Comparer the store will use
    comparer: C,
}

impl<H, C> fmt::Debug for ChainingStoreBuilder<H, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainingStoreBuilder").field("buckets", &self.buckets).finish_non_exhaustive()
    }
}

impl ChainingStoreBuilder {
    /// Starts a configuration with `buckets` buckets and the default functions
    #[must_use]
    pub fn new(buckets: usize) -> Self {
        Self { buckets, hasher: Djb2, comparer: ExactBytes }
    }
}

impl<H, C> ChainingStoreBuilder<H, C> {
    /// Replaces the bucket hasher
    #[must_use]
    pub fn hasher<H2: BucketHasher>(self, hasher: H2) -> ChainingStoreBuilder<H2, C> {
        ChainingStoreBuilder { buckets: self.buckets, hasher, comparer: self.comparer }
    }

    /// Replaces the key comparer
    #[must_use]
    pub fn comparer<C2: KeyComparer>(self, comparer: C2) -> ChainingStoreBuilder<H, C2> {
        ChainingStoreBuilder { buckets: self.buckets, hasher: self.hasher, comparer }
    }

    /// Builds an empty store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCapacity` if the bucket count is zero.
    pub fn build<K, V>(self) -> Result<ChainingStore<K, V, H, C>, StoreError> {
        let bucket_count = NonZeroUsize::new(self.buckets).ok_or(StoreError::InvalidCapacity)?;
        Ok(ChainingStore::from_parts(bucket_count, self.hasher, self.comparer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(53)?;
        assert_eq!(map.insert("key1".to_string(), 1), None);
        assert_eq!(map.insert("key2".to_string(), 2), None);
        assert_eq!(map.insert("key3".to_string(), 3), None);

        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.get("key3"), Some(&3));
        assert_eq!(map.get("key4"), None);
        assert_eq!(map.len(), 3);
        Ok(())
    }

    #[test]
    fn test_update_replaces_value() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(53)?;
        assert_eq!(map.insert("apple".to_string(), 99), None);
        assert_eq!(map.get("apple"), Some(&99));
        assert_eq!(map.insert("apple".to_string(), 1), Some(99));
        assert_eq!(map.get("apple"), Some(&1));
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_remove() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(53)?;
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);

        assert_eq!(map.remove("key1"), Some(1));
        assert_eq!(map.get("key1"), None);
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.remove("key1"), None);
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_single_bucket_chains_everything() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(1)?;
        for i in 0..20 {
            map.insert(i.to_string(), i);
        }
        assert_eq!(map.longest_chain(), 20);
        assert_eq!(map.chain_lengths(), vec![20]);

        assert_eq!(map.remove("7"), Some(7));
        for i in (0..20).filter(|&i| i != 7) {
            assert_eq!(map.get(&i.to_string()), Some(&i));
        }
        assert_eq!(map.len(), 19);
        Ok(())
    }

    #[test]
    fn test_update_inside_reordered_chain() -> Result<(), StoreError> {
        let mut map: ChainingStore<u64, &str> = ChainingStore::with_buckets(1)?;
        for key in 0..5 {
            map.insert(key, "old");
        }
        // Moves key 4 into the middle of the chain.
        assert_eq!(map.remove(&1), Some("old"));

        assert_eq!(map.insert(4, "new"), Some("old"));
        assert_eq!(map.insert(3, "new"), Some("old"));
        assert_eq!(map.get(&4), Some(&"new"));
        assert_eq!(map.get(&3), Some(&"new"));
        assert_eq!(map.get(&0), Some(&"old"));
        assert_eq!(map.len(), 4);
        assert_eq!(map.longest_chain(), 4);
        Ok(())
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let result: Result<ChainingStore<u32, u32>, _> = ChainingStore::with_buckets(0);
        assert!(matches!(result, Err(StoreError::InvalidCapacity)));
    }

    #[test]
    fn test_get_or_insert_default() -> Result<(), StoreError> {
        let mut map: ChainingStore<String, i32> = ChainingStore::with_buckets(8)?;
        assert_eq!(*map.get_or_insert_default("berry".to_string()), 0);
        assert_eq!(map.len(), 1);

        *map.get_or_insert_default("berry".to_string()) += 5;
        assert_eq!(map.get("berry"), Some(&5));
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_get_does_not_create() -> Result<(), StoreError> {
        let map: ChainingStore<String, i32> = ChainingStore::with_buckets(8)?;
        assert_eq!(map.get("missing"), None);
        assert!(map.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_mut() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(8)?;
        map.insert("key1".to_string(), 1);

        if let Some(value) = map.get_mut("key1") {
            *value += 10;
        }

        assert_eq!(map.get("key1"), Some(&11));
        Ok(())
    }

    #[test]
    fn test_custom_hasher_out_of_range_is_reduced() -> Result<(), StoreError> {
        let hasher = |_: &[u8], buckets: NonZeroUsize| buckets.get().saturating_mul(3).saturating_add(2);
        let mut map = ChainingStoreBuilder::new(4).hasher(hasher).build::<u32, &str>()?;
        map.insert(1, "one");
        map.insert(2, "two");

        assert_eq!(map.chain_lengths(), vec![0, 0, 2, 0]);
        assert_eq!(map.get(&2), Some(&"two"));
        Ok(())
    }

    #[test]
    fn test_custom_comparer() -> Result<(), StoreError> {
        let ignore_case = |stored: &[u8], probe: &[u8]| stored.eq_ignore_ascii_case(probe);
        let same_bucket = |_: &[u8], _: NonZeroUsize| 0_usize;
        let mut map = ChainingStoreBuilder::new(4)
            .hasher(same_bucket)
            .comparer(ignore_case)
            .build::<String, u8>()?;

        map.insert("Apple".to_string(), 1);
        assert_eq!(map.insert("APPLE".to_string(), 2), Some(1));
        assert_eq!(map.get("apple"), Some(&2));
        // Different lengths never reach the comparer.
        assert_eq!(map.get("apples"), None);
        assert_eq!(map.len(), 1);
        Ok(())
    }

    #[test]
    fn test_byte_store() -> Result<(), StoreError> {
        let mut map = ByteStore::with_buckets(16)?;
        map.insert(vec![1, 2, 3], vec![9; 16]);
        map.insert(vec![1, 2], vec![7]);

        assert_eq!(map.get([1_u8, 2, 3].as_slice()), Some(&vec![9; 16]));
        assert_eq!(map.get([1_u8, 2].as_slice()), Some(&vec![7]));
        assert_eq!(map.get([1_u8].as_slice()), None);
        Ok(())
    }

    #[test]
    fn test_clear_and_load_factor() -> Result<(), StoreError> {
        let mut map = ChainingStore::with_buckets(4)?;
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        assert!((map.load_factor() - 0.5).abs() < f64::EPSILON);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 4);
        assert_eq!(map.get("a"), None);
        Ok(())
    }

    #[test]
    fn test_default_bucket_count() {
        let map: ChainingStore<u64, u64> = ChainingStore::default();
        assert_eq!(map.bucket_count(), 53);
    }
}
