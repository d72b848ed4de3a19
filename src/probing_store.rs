use crate::{
    error::StoreError,
    hashing::{KeyBytes, reduce, rolling31},
    store::KeyValueStore,
};
use log::{debug, trace, warn};
use std::{borrow::Borrow, mem, num::NonZeroUsize};

/// Capacity used by `ProbingStore::new`
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// A slot in the probing array
#[derive(Debug, Clone)]
struct Slot<K, V> {
    /// The key-value pair, if the slot is occupied
    entry: Option<(K, V)>,
    /// Set when the slot's pair was removed; cleared when the slot is reused
    tombstone: bool, // Keeps probe sequences passing through this slot intact
}

impl<K, V> Slot<K, V> {
    /// A slot that has never held a pair
    const EMPTY: Self = Self { entry: None, tombstone: false };
}

/// Outcome of probing for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key lives in this slot
    Found(usize),
    /// The key is absent; a new pair for it belongs in this slot
    Vacant(usize),
    /// The key is absent and no slot can take it
    Full,
}

/// A fixed-capacity key-value store using linear probing.
///
/// Keys hash with a rolling multiply-by-31 accumulation over their
/// [`KeyBytes`]. Collisions move forward one slot at a time, wrapping past the
/// last slot to slot 0. Removal leaves a tombstone so that keys stored further
/// along the same probe sequence stay reachable; later inserts reuse it.
///
/// The store never resizes. When no slot is free, inserting a new key fails with
/// `StoreError::TableFull` instead of probing forever.
///
/// Note: This store is not thread-safe. Guard it with a `Mutex` or `RwLock`
/// when sharing it between threads.
#[derive(Debug, Clone)]
pub struct ProbingStore<K, V> {
    /// The fixed slot array
    slots: Box<[Slot<K, V>]>,
    /// Number of slots, equal to `slots.len()`
    capacity: NonZeroUsize,
    /// Number of occupied slots
    len: usize,
    /// Number of tombstoned slots
    tombstones: usize,
}

impl<K, V> Default for ProbingStore<K, V>
where
    K: KeyBytes + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ProbingStore<K, V>
where
    K: KeyBytes + Eq,
{
    /// Creates a new `ProbingStore` with the default capacity of 100 slots
    #[must_use]
    pub fn new() -> Self {
        Self::from_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new `ProbingStore` with exactly `capacity` slots
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCapacity` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, StoreError> {
        NonZeroUsize::new(capacity).map(Self::from_capacity).ok_or(StoreError::InvalidCapacity)
    }

    /// Creates an empty store with a validated capacity
    fn from_capacity(capacity: NonZeroUsize) -> Self {
        debug!("creating probing store with {capacity} slots");
        Self {
            slots: (0..capacity.get()).map(|_| Slot::EMPTY).collect(),
            capacity,
            len: 0,
            tombstones: 0,
        }
    }

    /// Returns the slot `key` hashes to before any probing
    #[must_use]
    pub fn home_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: KeyBytes + ?Sized,
    {
        reduce(rolling31(key.key_bytes().as_ref()), self.capacity)
    }

    /// Returns the slot after `index`, wrapping to slot 0
    fn next_index(&self, index: usize) -> usize {
        index.wrapping_add(1) % self.capacity
    }

    /// Returns slot `index`
    ///
    /// Indices come from `home_index` and `next_index`, both reduced modulo the capacity.
    #[allow(clippy::indexing_slicing)]
    fn slot(&self, index: usize) -> &Slot<K, V> {
        &self.slots[index]
    }

    /// Returns slot `index` mutably
    #[allow(clippy::indexing_slicing)]
    fn slot_mut(&mut self, index: usize) -> &mut Slot<K, V> {
        &mut self.slots[index]
    }

    /// Walks the probe sequence of `key`, visiting at most `capacity` slots
    fn probe<Q>(&self, key: &Q) -> (Probe, usize)
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        let mut index = self.home_index(key);
        let mut first_tombstone = None;

        for probes in 1..=self.capacity.get() {
            let slot = self.slot(index);
            match &slot.entry {
                Some((stored, _)) if stored.borrow() == key => return (Probe::Found(index), probes),
                Some(_) => {}
                None if slot.tombstone => first_tombstone = first_tombstone.or(Some(index)),
                // An empty slot ends the sequence; prefer an earlier tombstone for placement
                None => return (Probe::Vacant(first_tombstone.unwrap_or(index)), probes),
            }
            index = self.next_index(index);
        }

        (first_tombstone.map_or(Probe::Full, Probe::Vacant), self.capacity.get())
    }

    /// Marks `index` as newly occupied in the counters
    fn claim(&mut self, index: usize) {
        if self.slot(index).tombstone {
            trace!("reusing tombstone at slot {index}");
            self.tombstones = self.tombstones.saturating_sub(1);
        }
        self.len = self.len.saturating_add(1);
    }

    /// Builds the error for an insert that found no room
    fn full(&self) -> StoreError {
        warn!("probing store is full ({} slots, {} tombstones)", self.capacity, self.tombstones);
        StoreError::TableFull { capacity: self.capacity.get() }
    }

    /// Inserts a pair, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableFull` if `key` is absent and every slot is
    /// occupied. The store is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StoreError> {
        match self.probe(&key).0 {
            Probe::Found(index) => {
                let slot = self.slot_mut(index);
                Ok(slot.entry.as_mut().map(|(_, stored)| mem::replace(stored, value)))
            }
            Probe::Vacant(index) => {
                self.claim(index);
                trace!("inserted new entry at slot {index}");
                let slot = self.slot_mut(index);
                slot.tombstone = false;
                slot.entry = Some((key, value));
                Ok(None)
            }
            Probe::Full => Err(self.full()),
        }
    }

    /// Returns the value stored for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        match self.probe(key).0 {
            Probe::Found(index) => self.slot(index).entry.as_ref().map(|(_, value)| value),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns a mutable reference to the value stored for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        match self.probe(key).0 {
            Probe::Found(index) => self.slot_mut(index).entry.as_mut().map(|(_, value)| value),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns true if `key` has a value
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        matches!(self.probe(key).0, Probe::Found(_))
    }

    /// Removes `key`, leaving a tombstone in its slot. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        let Probe::Found(index) = self.probe(key).0 else {
            return None;
        };
        let slot = self.slot_mut(index);
        let (_, value) = slot.entry.take()?;
        slot.tombstone = true;
        trace!("removed entry at slot {index}, leaving a tombstone");
        self.len = self.len.saturating_sub(1);
        self.tombstones = self.tombstones.saturating_add(1);
        Some(value)
    }

    /// Returns the value for `key`, inserting `V::default()` first if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableFull` if `key` is absent and no slot can take it.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, StoreError>
    where
        V: Default,
    {
        let index = match self.probe(&key).0 {
            Probe::Found(index) => index,
            Probe::Vacant(index) => {
                self.claim(index);
                trace!("inserted default entry at slot {index}");
                index
            }
            Probe::Full => return Err(self.full()),
        };
        let slot = self.slot_mut(index);
        slot.tombstone = false;
        let (_, value) = slot.entry.get_or_insert_with(|| (key, V::default()));
        Ok(value)
    }

    /// Returns the slot currently holding `key`
    #[must_use]
    pub fn slot_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        match self.probe(key).0 {
            Probe::Found(index) => Some(index),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Returns how many slots a lookup of `key` visits, counting its own slot
    #[must_use]
    pub fn probe_length<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: KeyBytes + Eq + ?Sized,
    {
        match self.probe(key) {
            (Probe::Found(_), probes) => Some(probes),
            (Probe::Vacant(_) | Probe::Full, _) => None,
        }
    }
}

impl<K, V> ProbingStore<K, V> {
    /// Returns the number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot is occupied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the fixed number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Returns the number of slots holding a tombstone
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the ratio of occupied slots to capacity
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity.get() as f64
    }

    /// Empties every slot, tombstones included
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::EMPTY;
        }
        self.len = 0;
        self.tombstones = 0;
    }
}

impl<K, V> KeyValueStore<K, V> for ProbingStore<K, V>
where
    K: KeyBytes + Eq,
{
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, StoreError> {
        Self::insert(self, key, value)
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
        Self::get_or_insert_default(self, key)
    }

    fn len(&self) -> usize {
        self.len
    }
}
