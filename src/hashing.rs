//! Key byte representations and the hash functions both stores build on.

use std::num::NonZeroUsize;

/// Seed of the DJB2 string hash
pub const DJB2_SEED: u64 = 5381;

/// Multiplier of the rolling hash used by `ProbingStore`
pub const ROLLING_MULTIPLIER: u64 = 31;

/// The byte representation a key is hashed and compared by.
///
/// Text and byte containers lend their bytes directly. Fixed-width scalars
/// encode into a stack array in little-endian order; `usize` and `isize` are
/// widened to 64 bits first, so integer hashes are the same on every host.
pub trait KeyBytes {
    /// The bytes of one key, borrowed or encoded on the stack
    type Bytes<'a>: AsRef<[u8]>
    where
        Self: 'a;

    /// Returns the bytes that identify this key
    fn key_bytes(&self) -> Self::Bytes<'_>;
}

impl KeyBytes for str {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for String {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl KeyBytes for [u8] {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl KeyBytes for Vec<u8> {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

impl KeyBytes for Box<[u8]> {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> KeyBytes for [u8; N] {
    type Bytes<'a> = &'a [u8];

    fn key_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<T: KeyBytes + ?Sized> KeyBytes for &T {
    type Bytes<'a>
        = T::Bytes<'a>
    where
        Self: 'a;

    fn key_bytes(&self) -> Self::Bytes<'_> {
        (**self).key_bytes()
    }
}

impl KeyBytes for char {
    type Bytes<'a> = [u8; 4];

    fn key_bytes(&self) -> [u8; 4] {
        u32::from(*self).to_le_bytes()
    }
}

impl KeyBytes for bool {
    type Bytes<'a> = [u8; 1];

    fn key_bytes(&self) -> [u8; 1] {
        [u8::from(*self)]
    }
}

/// Implements `KeyBytes` for integer types via their little-endian encoding
macro_rules! impl_key_bytes_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyBytes for $ty {
                type Bytes<'a> = [u8; size_of::<$ty>()];

                fn key_bytes(&self) -> Self::Bytes<'_> {
                    self.to_le_bytes()
                }
            }
        )*
    };
}

impl_key_bytes_for_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

// Pointer-sized integers hash as 64-bit values on every target.
impl KeyBytes for usize {
    type Bytes<'a> = [u8; 8];

    fn key_bytes(&self) -> [u8; 8] {
        (*self as u64).to_le_bytes()
    }
}

impl KeyBytes for isize {
    type Bytes<'a> = [u8; 8];

    fn key_bytes(&self) -> [u8; 8] {
        (*self as i64).to_le_bytes()
    }
}

/// DJB2: starts at 5381 and folds every byte as `hash * 33 + byte`.
#[must_use]
pub fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte))
    })
}

/// Rolling hash: starts at 0 and folds every byte as `hash * 31 + byte`.
#[must_use]
pub fn rolling31(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |hash: u64, &byte| {
        hash.wrapping_mul(ROLLING_MULTIPLIER).wrapping_add(u64::from(byte))
    })
}

/// Reduces a 64-bit hash to an index in `0..slots`
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn reduce(hash: u64, slots: NonZeroUsize) -> usize {
    (hash as usize) % slots
}
