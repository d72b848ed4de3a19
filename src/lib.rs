//! # Hash Stores
//!
//! Two fixed-size key/value stores with different collision strategies.
//!
//! This crate provides two independent implementations:
//!
//! - `ChainingStore`: separate chaining with pluggable hash and equality functions
//! - `ProbingStore`: linear probing over a fixed slot array, with tombstone deletion
//!
//! Neither store resizes. Both are single-threaded; wrap them in a `Mutex` to
//! share them between threads.
//!
//! ## Chaining
//!
//! ```rust
//! use hashstores::ChainingStore;
//!
//! let mut fruit = ChainingStore::with_buckets(53)?;
//!
//! // Insert values
//! fruit.insert("apple".to_string(), 99);
//! assert_eq!(fruit.get("apple"), Some(&99));
//!
//! // Re-inserting replaces the value
//! fruit.insert("apple".to_string(), 1);
//! assert_eq!(fruit.get("apple"), Some(&1));
//!
//! // Reading never creates entries; `get_or_insert_default` does
//! assert_eq!(fruit.get("berry"), None);
//! assert_eq!(*fruit.get_or_insert_default("berry".to_string()), 0);
//! # Ok::<(), hashstores::StoreError>(())
//! ```
//!
//! ## Linear Probing
//!
//! ```rust
//! use hashstores::{ProbingStore, StoreError};
//!
//! let mut grades = ProbingStore::with_capacity(2)?;
//! grades.insert("Alice".to_string(), 90)?;
//! grades.insert("Bob".to_string(), 85)?;
//!
//! // The table is full: a third key is rejected instead of probing forever
//! assert_eq!(
//!     grades.insert("Carol".to_string(), 70),
//!     Err(StoreError::TableFull { capacity: 2 })
//! );
//!
//! // Removing leaves a tombstone that later inserts reuse
//! assert_eq!(grades.remove("Bob"), Some(85));
//! assert!(!grades.contains_key("Bob"));
//! grades.insert("Carol".to_string(), 70)?;
//! assert_eq!(grades.get("Alice"), Some(&90));
//! # Ok::<(), StoreError>(())
//! ```

/// Separate-chaining store with pluggable hashing and key comparison
mod chaining_store;
/// Error type shared by the stores
mod error;
/// Key byte representations and hash functions
pub mod hashing;
/// Fixed-capacity linear-probing store
mod probing_store;
/// The contract both stores implement
mod store;

pub use chaining_store::{
    BucketHasher, ByteStore, ChainingStore, ChainingStoreBuilder, DEFAULT_BUCKETS, Djb2,
    ExactBytes, KeyComparer,
};
pub use error::StoreError;
pub use hashing::KeyBytes;
pub use probing_store::{DEFAULT_CAPACITY, ProbingStore};
pub use store::KeyValueStore;
