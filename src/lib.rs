#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use core::alloc::Layout;
use core::fmt;

/// A hash map built on the Robin-Hood [`HashTable`].
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A hash set built on the Robin-Hood [`HashTable`].
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a set interface with configurable hashers.
pub mod hash_set;

pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`HashMap`] and [`HashSet`] when none is
        /// named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`HashMap`] and [`HashSet`] when none is
        /// named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder hasher builder for builds without a hashing feature.
        ///
        /// It has no values, so maps and sets must be given a hasher through
        /// `with_hasher` or `with_capacity_and_hasher`.
        pub enum DefaultHashBuilder {}
    }
}

/// The error type for `try_reserve` methods.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveError {
    /// The requested capacity overflowed `usize` or exceeds the maximum
    /// allocation size.
    CapacityOverflow,

    /// The memory allocator returned an error.
    AllocError {
        /// The layout of the allocation request that failed.
        layout: Layout,
    },
}

impl fmt::Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryReserveError::CapacityOverflow => {
                f.write_str("capacity overflow while reserving hash table slots")
            }
            TryReserveError::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes for hash table slots failed",
                layout.size()
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TryReserveError {}
