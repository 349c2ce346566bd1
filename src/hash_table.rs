//! The Robin-Hood open-addressing table underneath
//! [`HashMap`](crate::HashMap) and [`HashSet`](crate::HashSet).
//!
//! [`HashTable`] is a low-level building block: every operation takes the
//! element's precomputed `u64` hash and, for lookups, an equality predicate.
//! It never hashes anything itself, so the same table serves sets, maps and
//! any other keyed layout a caller wants to build on top of it.
//!
//! Slots live in a single power-of-two array. An element is placed by linear
//! probing from its home slot (`hash & (capacity - 1)`); whenever the probing
//! element is farther from home than the occupant of a slot, it takes that
//! slot and the occupant run is shifted forward by one.

use alloc::alloc::handle_alloc_error;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::TryReserveError;

/// Number of slots allocated by [`HashTable::new`].
const DEFAULT_CAPACITY: usize = 1024;

/// Once any element has been pushed this far from its home slot, a table that
/// is at least half full grows instead of probing further.
const MAX_PROBE_DISTANCE: usize = 5;

#[inline(always)]
fn resize_watermark(capacity: usize) -> usize {
    capacity / 2
}

struct Bucket<V> {
    hash: u64,
    value: V,
}

/// A slot is either empty (`None`) or holds one element with its hash.
type Slot<V> = Option<Bucket<V>>;

/// Whether allocation failures should be returned or abort.
#[derive(Clone, Copy)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("hash table capacity overflow"),
        }
    }

    #[cold]
    fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}

#[inline(always)]
fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => unreachable!("infallible allocation reported an error"),
    }
}

/// Outcome of scanning a probe chain for an element.
enum Probe {
    /// The element lives at this slot.
    Found(usize),
    /// The element is absent. `index` is where it should land: the first
    /// slot whose occupant is closer to home than the probing element, or
    /// the empty slot that ended the chain.
    Vacant { index: usize, distance: usize },
}

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Total number of slots allocated
    pub capacity: usize,
    /// Population at which a table with long probes prefers to grow
    pub resize_watermark: usize,
    /// Largest probe distance observed since the last resize
    pub max_probe_distance: usize,
    /// Mean probe distance over all live elements
    pub mean_probe_distance: f64,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Total memory in bytes used by the slot array
    pub total_bytes: usize,
    /// Memory in bytes held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!("Resize watermark: {}", self.resize_watermark);
        println!(
            "Probe distance: max {} / mean {:.3}",
            self.max_probe_distance, self.mean_probe_distance
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// Number of live elements at each probe distance.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `bins[d]` counts the elements sitting `d` slots past their home slot.
    pub bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of elements counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = *self.bins.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            match units % 8 {
                0 => {}
                1 => bar.push('▏'),
                2 => bar.push('▎'),
                3 => bar.push('▍'),
                4 => bar.push('▌'),
                5 => bar.push('▋'),
                6 => bar.push('▊'),
                _ => bar.push('▉'),
            }
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{:>2} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// An open-addressing hash table using Robin-Hood displacement.
///
/// `HashTable<V>` stores values of type `V`. Like
/// `hashbrown::HashTable`, it requires the caller to supply the hash
/// value for every operation, plus an equality predicate for lookups. Hashes
/// are stored next to the values so growth never re-hashes an element.
///
/// The table never shrinks and has no removal operation. Capacity is always a
/// power of two and counts slots, not elements: the table grows before the
/// last free slot would be filled, and earlier once probe chains get long
/// while it is at least half full.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::Entry;
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::with_capacity(16);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    populated: usize,
    max_probe: usize,
    watermark: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("max_probe", &self.max_probe)
            .field(
                "slots",
                &self
                    .slots
                    .iter()
                    .enumerate()
                    .map(|(index, slot)| match slot {
                        Some(bucket) => format!(
                            "{:02}+{}",
                            self.home(bucket.hash),
                            self.distance(index, bucket.hash)
                        ),
                        None => "..".to_string(),
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates a table with 1024 slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u32> = HashTable::new();
    /// assert_eq!(table.capacity(), 1024);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table with `capacity` slots, rounded up to the next power of
    /// two. A capacity of zero yields a single slot.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::allocate(capacity, Fallibility::Infallible))
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports allocation
    /// failure instead of aborting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// # use robin_hash::TryReserveError;
    /// #
    /// let table: HashTable<u64> = HashTable::try_with_capacity(8).unwrap();
    /// assert_eq!(table.capacity(), 8);
    ///
    /// let err = HashTable::<u64>::try_with_capacity(usize::MAX).unwrap_err();
    /// assert_eq!(err, TryReserveError::CapacityOverflow);
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::allocate(capacity, Fallibility::Fallible)
    }

    fn allocate(capacity: usize, fallibility: Fallibility) -> Result<Self, TryReserveError> {
        let capacity = capacity
            .checked_next_power_of_two()
            .ok_or_else(|| fallibility.capacity_overflow())?;
        let layout =
            Layout::array::<Slot<V>>(capacity).map_err(|_| fallibility.capacity_overflow())?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| fallibility.alloc_err(layout))?;
        slots.resize_with(capacity, || None);

        Ok(Self {
            slots,
            populated: 0,
            max_probe: 0,
            watermark: resize_watermark(capacity),
        })
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the table. Always a power of two; it
    /// never decreases.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        debug_assert!(self.slots.len().is_power_of_two());
        self.slots.len() - 1
    }

    #[inline(always)]
    fn home(&self, hash: u64) -> usize {
        hash as usize & self.mask()
    }

    /// How far slot `index` is from the home slot of `hash`.
    #[inline(always)]
    fn distance(&self, index: usize, hash: u64) -> usize {
        index.wrapping_sub(self.home(hash)) & self.mask()
    }

    /// Returns a reference to the element matching `eq`, if any.
    ///
    /// Scans forward from the home slot of `hash` and stops at the first empty
    /// slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// table.insert(42, 42u64, |&v| v == 42);
    ///
    /// assert_eq!(table.find(42, |&v| v == 42), Some(&42));
    /// assert_eq!(table.find(7, |&v| v == 7), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        self.slots[index].as_ref().map(|bucket| &bucket.value)
    }

    /// Returns a mutable reference to the element matching `eq`, if any.
    ///
    /// The element must keep hashing to `hash` and matching `eq`; changing
    /// its identity through this reference strands it in the wrong chain.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        self.slots[index].as_mut().map(|bucket| &mut bucket.value)
    }

    /// Returns `true` if an element matching `eq` is stored under `hash`.
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find_index(hash, eq).is_some()
    }

    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let mask = self.mask();
        let mut index = self.home(hash);
        while let Some(bucket) = &self.slots[index] {
            if bucket.hash == hash && eq(&bucket.value) {
                return Some(index);
            }
            index = (index + 1) & mask;
        }
        None
    }

    /// Walks the chain for `hash`, remembering where a new element would land
    /// while looking for an existing match.
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mask = self.mask();
        let mut index = self.home(hash);
        let mut distance = 0;
        let mut landing = None;

        loop {
            match &self.slots[index] {
                None => {
                    let (index, distance) = landing.unwrap_or((index, distance));
                    return Probe::Vacant { index, distance };
                }
                Some(bucket) if bucket.hash == hash && eq(&bucket.value) => {
                    return Probe::Found(index);
                }
                Some(bucket) => {
                    if landing.is_none() && self.distance(index, bucket.hash) < distance {
                        landing = Some((index, distance));
                    }
                }
            }
            index = (index + 1) & mask;
            distance += 1;
        }
    }

    /// Finds the landing slot for an element known to be absent.
    fn landing(&self, hash: u64) -> (usize, usize) {
        let mask = self.mask();
        let mut index = self.home(hash);
        let mut distance = 0;
        while let Some(bucket) = &self.slots[index] {
            if self.distance(index, bucket.hash) < distance {
                break;
            }
            index = (index + 1) & mask;
            distance += 1;
        }
        (index, distance)
    }

    /// Stores `bucket` at `index`, shifting any occupant run forward by one
    /// slot until an empty slot absorbs it. Returns `index`.
    fn place(&mut self, index: usize, distance: usize, bucket: Bucket<V>) -> usize {
        debug_assert!(self.populated + 1 < self.slots.len());
        let mask = self.mask();
        self.max_probe = self.max_probe.max(distance);

        let mut carried = self.slots[index].replace(bucket);
        let mut cursor = index;
        while let Some(evicted) = carried {
            cursor = (cursor + 1) & mask;
            self.max_probe = self.max_probe.max(self.distance(cursor, evicted.hash));
            carried = self.slots[cursor].replace(evicted);
        }

        self.populated += 1;
        index
    }

    fn value_mut(&mut self, index: usize) -> &mut V {
        match &mut self.slots[index] {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("slot {index} is empty"),
        }
    }

    #[inline]
    fn needs_growth(&self) -> bool {
        (self.max_probe >= MAX_PROBE_DISTANCE && self.populated >= self.watermark)
            || self.populated + 1 >= self.slots.len()
    }

    #[cold]
    fn grow(&mut self) {
        let target = self
            .slots
            .len()
            .checked_mul(2)
            .unwrap_or_else(|| panic!("hash table capacity overflow"));
        infallible(self.resize_rehash(target, Fallibility::Infallible));
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// A vacant entry remembers the slot the lookup found for the element, so
    /// inserting through it does not probe the chain a second time unless the
    /// table has to grow first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    ///
    /// match table.entry(3, |&(k, _): &(u32, &str)| k == 3) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((3, "three"));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// table.entry(3, |&(k, _)| k == 3).or_insert((3, "ignored"));
    /// assert_eq!(table.find(3, |&(k, _)| k == 3), Some(&(3, "three")));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            Probe::Vacant { index, distance } => Entry::Vacant(VacantEntry {
                table: self,
                hash,
                index,
                distance,
            }),
        }
    }

    /// Inserts `value` unless an element matching `eq` is already present.
    ///
    /// Returns a reference to the stored element and whether `value` was
    /// inserted. When a match exists the table is left untouched and `value`
    /// is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// let (_, inserted) = table.insert(5, 5u32, |&v| v == 5);
    /// assert!(inserted);
    ///
    /// let (existing, inserted) = table.insert(5, 5u32, |&v| v == 5);
    /// assert!(!inserted);
    /// assert_eq!(*existing, 5);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, hash: u64, value: V, eq: impl Fn(&V) -> bool) -> (&mut V, bool) {
        match self.entry(hash, eq) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(value), true),
        }
    }

    /// Grows the table to at least `min_capacity` slots.
    ///
    /// Does nothing if the table already has that many slots. Otherwise the
    /// capacity becomes `min_capacity` rounded up to a power of two and every
    /// element is rehashed.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`; aborts if the allocation
    /// fails. See [`try_reserve`](Self::try_reserve).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<i32> = HashTable::with_capacity(16);
    /// for i in 0..7 {
    ///     table.insert(i as u64, i, |&n| n == i);
    /// }
    ///
    /// table.reserve(100);
    /// assert_eq!(table.capacity(), 128);
    /// assert!((0..7).all(|i| table.contains(i as u64, |&n| n == i)));
    ///
    /// table.reserve(10);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn reserve(&mut self, min_capacity: usize) {
        if min_capacity > self.slots.len() {
            infallible(self.resize_rehash(min_capacity, Fallibility::Infallible));
        }
    }

    /// Tries to grow the table to at least `min_capacity` slots.
    ///
    /// On error the table is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// # use robin_hash::TryReserveError;
    /// #
    /// let mut table: HashTable<u8> = HashTable::with_capacity(4);
    /// assert_eq!(table.try_reserve(9), Ok(()));
    /// assert_eq!(table.capacity(), 16);
    ///
    /// assert_eq!(
    ///     table.try_reserve(usize::MAX),
    ///     Err(TryReserveError::CapacityOverflow)
    /// );
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn try_reserve(&mut self, min_capacity: usize) -> Result<(), TryReserveError> {
        if min_capacity > self.slots.len() {
            self.resize_rehash(min_capacity, Fallibility::Fallible)
        } else {
            Ok(())
        }
    }

    /// Grows the slot array and rehashes every element in place.
    ///
    /// All allocation happens before the first slot is touched, so an error
    /// leaves the table as it was.
    #[cold]
    #[inline(never)]
    fn resize_rehash(
        &mut self,
        min_capacity: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let old_capacity = self.slots.len();
        let new_capacity = min_capacity
            .checked_next_power_of_two()
            .ok_or_else(|| fallibility.capacity_overflow())?;
        debug_assert!(new_capacity > old_capacity);
        let layout =
            Layout::array::<Slot<V>>(new_capacity).map_err(|_| fallibility.capacity_overflow())?;

        // A chain that runs off the end of the old slots continues at slot 0.
        // Walking from slot 0 would start that chain in the middle, so its
        // leading run `0..wrapped` is lifted out and reinserted last.
        let wrapped = if self.slots[old_capacity - 1].is_some() {
            self.slots
                .iter()
                .position(Option::is_none)
                .unwrap_or(old_capacity)
        } else {
            0
        };
        let lifted_layout =
            Layout::array::<Bucket<V>>(wrapped).map_err(|_| fallibility.capacity_overflow())?;
        let mut lifted = Vec::new();
        lifted
            .try_reserve_exact(wrapped)
            .map_err(|_| fallibility.alloc_err(lifted_layout))?;
        self.slots
            .try_reserve_exact(new_capacity - old_capacity)
            .map_err(|_| fallibility.alloc_err(layout))?;

        self.slots.resize_with(new_capacity, || None);
        lifted.extend(self.slots[..wrapped].iter_mut().filter_map(Option::take));

        let expected = self.populated;
        self.populated = 0;
        self.max_probe = 0;
        self.watermark = resize_watermark(new_capacity);

        // Every slot before `index` is rehashed or empty by now, and the new
        // half holds only rehashed elements. A chain with a home in the old
        // half ends at `index` at the latest, since that slot was just
        // emptied. A chain with a home in the new half wraps into the
        // processed prefix, so no probe ever reaches an old element.
        for index in wrapped..old_capacity {
            if let Some(bucket) = self.slots[index].take() {
                let (landing, distance) = self.landing(bucket.hash);
                self.place(landing, distance, bucket);
            }
        }

        for bucket in lifted {
            let (landing, distance) = self.landing(bucket.hash);
            self.place(landing, distance, bucket);
        }

        debug_assert_eq!(self.populated, expected);
        Ok(())
    }

    /// Returns an iterator over all values in the table, in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8);
    /// for v in [3u64, 1, 2] {
    ///     table.insert(v, v, |&x| x == v);
    /// }
    ///
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator yielding mutable references to every value.
    ///
    /// Values must keep their hash and identity; see
    /// [`find_mut`](Self::find_mut).
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = alloc::vec![0usize; self.max_probe + 1];
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(bucket) = slot {
                let distance = self.distance(index, bucket.hash);
                if distance >= bins.len() {
                    bins.resize(distance + 1, 0);
                }
                bins[distance] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns performance and utilization statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let slot_bytes = core::mem::size_of::<Slot<V>>();
        let capacity = self.slots.len();
        let total_distance: usize = self
            .probe_histogram()
            .bins
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.populated,
            capacity,
            resize_watermark: self.watermark,
            max_probe_distance: self.max_probe,
            mean_probe_distance: if self.populated == 0 {
                0.0
            } else {
                total_distance as f64 / self.populated as f64
            },
            load_factor: self.populated as f64 / capacity as f64,
            total_bytes: capacity * slot_bytes,
            wasted_bytes: (capacity - self.populated) * slot_bytes,
        }
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.populated,
            slots: self.slots.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the stored value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the stored value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }
}

/// A view into a vacant entry in a [`HashTable`].
///
/// Holds the slot found by the lookup that produced it.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
    index: usize,
    distance: usize,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` into the table and returns a mutable reference to it.
    ///
    /// If the table has to grow first, the remembered slot is discarded and
    /// a new one is found from the element's new home slot.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry {
            table,
            hash,
            mut index,
            mut distance,
        } = self;

        if table.needs_growth() {
            table.grow();
            (index, distance) = table.landing(hash);
        }

        let index = table.place(index, distance, Bucket { hash, value });
        table.value_mut(index)
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Some(bucket) => &bucket.value,
            None => unreachable!("occupied entry points at an empty slot"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.table.value_mut(self.index)
    }

    /// Converts the entry into a mutable reference with the table's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        table.value_mut(index)
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// Created by [`HashTable::iter`]. Cloning the iterator restarts nothing; it
/// forks the current position.
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some(&bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some(&mut bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    slots: alloc::vec::IntoIter<Slot<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.slots.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some(bucket.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct HashState {
        k0: u64,
        k1: u64,
    }

    impl HashState {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct Item {
        key: u64,
        value: i32,
    }

    fn hash_key(state: &HashState, key: u64) -> u64 {
        let mut h = state.build_hasher();
        h.write_u64(key);
        h.finish()
    }

    /// Checks slot accounting and the Robin-Hood layout: every element with a
    /// nonzero probe distance follows an occupied slot whose element is at
    /// most one slot less displaced. By induction every element is reachable
    /// from its home slot without crossing an empty slot.
    fn assert_robin_hood<V>(table: &HashTable<V>) {
        let capacity = table.capacity();
        assert!(capacity.is_power_of_two(), "{:#?}", table);

        let occupied = table.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, table.len(), "{:#?}", table);
        assert!(occupied < capacity, "{:#?}", table);

        for (index, slot) in table.slots.iter().enumerate() {
            let Some(bucket) = slot else { continue };
            let distance = table.distance(index, bucket.hash);
            assert!(distance <= table.max_probe, "{:#?}", table);
            if distance == 0 {
                continue;
            }

            let prev = (index + capacity - 1) & (capacity - 1);
            let Some(prev_bucket) = &table.slots[prev] else {
                panic!("slot {index} unreachable from its home: {:#?}", table);
            };
            assert!(
                table.distance(prev, prev_bucket.hash) + 1 >= distance,
                "slot {index} breaks probe ordering: {:#?}",
                table
            );
        }
    }

    fn physical_order(table: &HashTable<Item>) -> Vec<u64> {
        table.iter().map(|item| item.key).collect()
    }

    fn insert_item(table: &mut HashTable<Item>, hash: u64, key: u64) -> bool {
        table
            .insert(
                hash,
                Item {
                    key,
                    value: key as i32,
                },
                |v| v.key == key,
            )
            .1
    }

    #[test]
    fn insert_and_find() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            match table.entry(hash, |v: &Item| v.key == k) {
                Entry::Vacant(v) => {
                    v.insert(Item {
                        key: k,
                        value: (k as i32) * 2,
                    });
                    assert_eq!(
                        table.find(hash, |v| v.key == k),
                        Some(&Item {
                            key: k,
                            value: (k as i32) * 2
                        }),
                        "{:#?}",
                        table
                    );
                }
                Entry::Occupied(_) => panic!("unexpected occupied on first insert: {:#?}", table),
            }
        }
        assert_eq!(table.len(), 32);
        for k in 0..32u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: (k as i32) * 2
                }),
                "{:#?}",
                table
            );
        }

        let miss_hash = hash_key(&state, 999);
        assert!(table.find(miss_hash, |v| v.key == 999).is_none());
        assert!(!table.contains(miss_hash, |v| v.key == 999));
        assert_robin_hood(&table);
    }

    #[test]
    fn default_and_rounded_capacities() {
        assert_eq!(HashTable::<u8>::new().capacity(), 1024);
        assert_eq!(HashTable::<u8>::default().capacity(), 1024);
        assert_eq!(HashTable::<u8>::with_capacity(0).capacity(), 1);
        assert_eq!(HashTable::<u8>::with_capacity(4).capacity(), 4);
        assert_eq!(HashTable::<u8>::with_capacity(5).capacity(), 8);
        assert!(HashTable::<u8>::with_capacity(5).is_empty());
    }

    #[test]
    fn duplicate_entry_is_occupied() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        let k = 42u64;
        let hash = hash_key(&state, k);

        match table.entry(hash, |v| v.key == k) {
            Entry::Vacant(v) => {
                v.insert(Item { key: k, value: 7 });
            }
            Entry::Occupied(_) => panic!("should be vacant first time"),
        }

        match table.entry(hash, |v| v.key == k) {
            Entry::Occupied(mut occ) => {
                let prev_value = occ.get().value;
                *occ.get_mut() = Item { key: k, value: 11 };
                assert_eq!(prev_value, 7, "{:#?}", table);
            }
            Entry::Vacant(_) => panic!("should be occupied: {}#{:02X} in {:#?}", k, hash, table),
        }
        let found = table.find(hash, |v| v.key == k).unwrap();
        assert_eq!(found.value, 11);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_is_idempotent() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(16);
        for k in 0..6u64 {
            assert!(insert_item(&mut table, hash_key(&state, k), k));
        }

        let before = physical_order(&table);
        let capacity = table.capacity();
        for k in 0..6u64 {
            let hash = hash_key(&state, k);
            let (existing, inserted) = table.insert(hash, Item { key: k, value: -1 }, |v| {
                v.key == k
            });
            assert!(!inserted);
            assert_eq!(existing.value, k as i32);
        }

        assert_eq!(table.len(), 6);
        assert_eq!(table.capacity(), capacity);
        assert_eq!(physical_order(&table), before);
    }

    #[test]
    fn find_mut_and_modify() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        for k in 0..5u64 {
            assert!(insert_item(&mut table, hash_key(&state, k), k));
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            let item = table.find_mut(hash, |v| v.key == k).unwrap();
            item.value += 100;
        }

        for k in 0..5u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k).map(|v| v.value),
                Some(k as i32 + 100),
                "{:#?}",
                table
            );
        }
        assert!(table.find_mut(hash_key(&state, 77), |v| v.key == 77).is_none());
    }

    #[test]
    fn insert_many() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        for k in 0..10_000u64 {
            assert!(insert_item(&mut table, hash_key(&state, k), k));
        }

        assert_eq!(table.len(), 10_000);
        assert!(table.capacity() > 10_000);
        assert_robin_hood(&table);

        for k in 0..10_000u64 {
            let hash = hash_key(&state, k);
            assert_eq!(
                table.find(hash, |v| v.key == k).map(|v| v.value),
                Some(k as i32)
            );
        }
    }

    #[test]
    fn explicit_collision() {
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        let hash = 0;
        for k in 0..65u64 {
            match table.entry(hash, |v| v.key == k) {
                Entry::Vacant(v) => {
                    v.insert(Item {
                        key: k,
                        value: k as i32,
                    });
                }
                _ => unreachable!(),
            }
        }

        assert_eq!(table.len(), 65);
        assert_robin_hood(&table);
        for k in 0..65u64 {
            assert_eq!(
                table.find(hash, |v| v.key == k),
                Some(&Item {
                    key: k,
                    value: k as i32
                }),
                "{:#?}",
                table
            );
        }
    }

    #[test]
    fn colliding_keys_fill_consecutive_slots() {
        // With the identity hash, 5, 9 and 13 all live in slot 1 of a
        // four-slot table.
        let mut table: HashTable<Item> = HashTable::with_capacity(4);
        for k in [5u64, 9, 13] {
            assert!(insert_item(&mut table, k, k));
        }

        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity(), 4);
        assert_eq!(physical_order(&table), [5, 9, 13]);
        assert_eq!(table.probe_histogram().bins, [1, 1, 1]);
        for k in [5u64, 9, 13] {
            assert!(table.contains(k, |v| v.key == k));
        }
        assert_robin_hood(&table);
    }

    #[test]
    fn farther_element_displaces_closer_one() {
        let mut table: HashTable<Item> = HashTable::with_capacity(8);
        // a: home 1, slot 1. b: home 1, slot 2. c: home 2, slot 3 (b is as
        // far from home as c would be there, so b keeps its slot).
        assert!(insert_item(&mut table, 1, 100));
        assert!(insert_item(&mut table, 1, 101));
        assert!(insert_item(&mut table, 2, 200));
        assert_eq!(physical_order(&table), [100, 101, 200]);

        // d: home 1. Ties at slots 1 and 2, then takes slot 3 from c, which is
        // only one slot from home; c shifts to slot 4.
        assert!(insert_item(&mut table, 1, 102));
        assert_eq!(physical_order(&table), [100, 101, 102, 200]);
        assert_eq!(table.probe_histogram().bins, [1, 1, 2]);
        assert_eq!(table.max_probe, 2);
        assert_robin_hood(&table);
    }

    #[test]
    fn filling_last_free_slot_grows_first() {
        let mut table: HashTable<Item> = HashTable::with_capacity(4);
        for k in 1..=3u64 {
            assert!(insert_item(&mut table, k, k));
        }
        assert_eq!(table.capacity(), 4);

        assert!(insert_item(&mut table, 4, 4));
        assert!(table.capacity() > 4);
        assert_eq!(table.len(), 4);
        for k in 1..=4u64 {
            assert!(table.contains(k, |v| v.key == k), "{:#?}", table);
        }
        assert_robin_hood(&table);
    }

    #[test]
    fn long_probes_grow_half_full_table() {
        let mut table: HashTable<Item> = HashTable::with_capacity(16);
        // Eight elements sharing one home slot push the last one seven slots
        // out, and the table is half full by then.
        for k in 0..8u64 {
            assert!(insert_item(&mut table, 3, k));
        }
        assert_eq!(table.capacity(), 16);
        assert!(table.max_probe >= MAX_PROBE_DISTANCE);

        assert!(insert_item(&mut table, 3, 8));
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.len(), 9);
        assert_robin_hood(&table);
    }

    #[test]
    fn reserve_rounds_up_and_never_shrinks() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(8);
        for k in 0..3u64 {
            insert_item(&mut table, hash_key(&state, k), k);
        }

        table.reserve(100);
        assert_eq!(table.capacity(), 128);
        table.reserve(64);
        assert_eq!(table.capacity(), 128);
        table.reserve(128);
        assert_eq!(table.capacity(), 128);

        assert_eq!(table.len(), 3);
        for k in 0..3u64 {
            assert!(table.contains(hash_key(&state, k), |v| v.key == k));
        }
        assert_robin_hood(&table);
    }

    #[test]
    fn try_reserve_failure_leaves_table_unchanged() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(8);
        for k in 0..5u64 {
            insert_item(&mut table, hash_key(&state, k), k);
        }
        let before = physical_order(&table);

        assert_eq!(
            table.try_reserve(usize::MAX),
            Err(TryReserveError::CapacityOverflow)
        );
        assert_eq!(
            table.try_reserve(1usize << (usize::BITS - 1)),
            Err(TryReserveError::CapacityOverflow)
        );

        assert_eq!(table.capacity(), 8);
        assert_eq!(table.len(), 5);
        assert_eq!(physical_order(&table), before);
        assert_eq!(table.try_reserve(4), Ok(()));
        assert_eq!(table.try_reserve(9), Ok(()));
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn rehash_chain_wrapping_past_end() {
        let mut table: HashTable<Item> = HashTable::with_capacity(8);
        // Homes 7, 7, 7, 7 and 6: the chain from slot 7 wraps to slots 0..=2.
        for k in [7u64, 15, 23, 31, 6] {
            assert!(insert_item(&mut table, k, k));
        }
        assert_eq!(physical_order(&table), [15, 23, 31, 6, 7]);
        assert_eq!(table.capacity(), 8);

        table.reserve(16);
        assert_eq!(table.capacity(), 16);
        assert_eq!(table.len(), 5);
        for k in [7u64, 15, 23, 31, 6] {
            assert!(table.contains(k, |v| v.key == k), "{:#?}", table);
        }
        // New homes: 6 -> 6, 7 and 23 -> 7, 15 and 31 -> 15.
        assert_eq!(physical_order(&table), [31, 6, 7, 23, 15]);
        assert_robin_hood(&table);
    }

    #[test]
    fn rehash_new_half_chain_wraps_into_front() {
        let mut table: HashTable<Item> = HashTable::with_capacity(8);
        // 15, 31 and 47 home to slot 7 before growth and slot 15 after, so
        // their chain wraps to the front both times. 1 sits right behind it.
        for k in [15u64, 31, 47] {
            assert!(insert_item(&mut table, k, k));
        }
        assert!(insert_item(&mut table, 1, 1));
        assert_eq!(physical_order(&table), [31, 47, 1, 15]);

        table.reserve(16);
        assert_eq!(table.len(), 4);
        for k in [15u64, 31, 47, 1] {
            assert!(table.contains(k, |v| v.key == k), "{:#?}", table);
        }
        assert_eq!(physical_order(&table), [31, 47, 1, 15]);
        assert_robin_hood(&table);
    }

    #[test]
    fn rehash_randomized_small_tables() {
        for seed in 0..256u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let capacity = 1usize << rng.random_range(0..5u32);
            let mut table: HashTable<Item> = HashTable::with_capacity(capacity);

            // Bias homes toward the last slot so chains wrap around slot 0.
            let hash_space = capacity as u64 * 8;
            let count = rng.random_range(0..capacity.max(2) * 3);
            let mut hashes = Vec::new();
            for key in 0..count as u64 {
                let hash = if rng.random_bool(0.5) {
                    (capacity as u64 - 1) + capacity as u64 * rng.random_range(0..8)
                } else {
                    rng.random_range(0..hash_space)
                };
                assert!(insert_item(&mut table, hash, key), "seed {seed}");
                hashes.push(hash);
                assert_robin_hood(&table);
            }

            let target = table.capacity() << rng.random_range(1..4u32);
            table.reserve(target);
            assert_eq!(table.capacity(), target, "seed {seed}");
            assert_eq!(table.len(), count, "seed {seed}");
            assert_robin_hood(&table);

            for (key, &hash) in hashes.iter().enumerate() {
                let key = key as u64;
                assert!(
                    table.contains(hash, |v| v.key == key),
                    "seed {seed}: lost {key}: {:#?}",
                    table
                );
            }

            let mut seen: Vec<u64> = physical_order(&table);
            seen.sort_unstable();
            assert_eq!(seen, (0..count as u64).collect::<Vec<_>>(), "seed {seed}");
        }
    }

    #[test]
    fn growth_preserves_membership() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut table: HashTable<Item> = HashTable::with_capacity(1);
        let mut hashes = Vec::new();
        let mut capacity = table.capacity();

        for key in 0..2_000u64 {
            let hash = rng.random::<u64>() & 0xFFFF;
            assert!(insert_item(&mut table, hash, key));
            hashes.push(hash);

            assert!(table.capacity() >= capacity);
            if table.capacity() != capacity {
                capacity = table.capacity();
                assert_robin_hood(&table);
                for (earlier, &hash) in hashes.iter().enumerate() {
                    let earlier = earlier as u64;
                    assert!(table.contains(hash, |v| v.key == earlier));
                }
            }
        }
        assert_robin_hood(&table);
    }

    #[test]
    fn iterators_visit_each_element_once() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        for k in 10..20u64 {
            insert_item(&mut table, hash_key(&state, k), k);
        }

        let iter = table.iter();
        assert_eq!(iter.len(), 10);
        let collected: Vec<u64> = iter.clone().map(|v| v.key).collect();
        assert_eq!(collected.len(), 10, "{:#?}", table);
        for k in 10..20u64 {
            assert!(collected.contains(&k));
        }
        assert_eq!(iter.map(|v| v.key).collect::<Vec<_>>(), collected);
        assert_eq!((&table).into_iter().count(), 10);

        for item in table.iter_mut() {
            item.value = -item.value;
        }
        assert!(table.iter().all(|v| v.value == -(v.key as i32)));

        let mut owned: Vec<Item> = table.into_iter().collect();
        owned.sort_by_key(|v| v.key);
        assert_eq!(owned.len(), 10);
        assert_eq!(owned[0], Item { key: 10, value: -10 });
    }

    #[test]
    fn empty_table_iterates_nothing() {
        let table: HashTable<Item> = HashTable::with_capacity(64);
        assert_eq!(table.iter().next(), None);
        assert_eq!(table.iter().size_hint(), (0, Some(0)));
    }

    #[derive(Debug, PartialEq, Eq, Clone)]
    struct StringItem {
        key: String,
        value: i32,
    }

    fn hash_string_key(state: &HashState, key: &str) -> u64 {
        let mut h = state.build_hasher();
        h.write(key.as_bytes());
        h.finish()
    }

    #[test]
    fn insert_and_find_string_keys() {
        let state = HashState::default();
        let mut table: HashTable<StringItem> = HashTable::with_capacity(2);
        for i in 0..200 {
            let key = alloc::format!("key_{i}");
            let hash = hash_string_key(&state, &key);
            let (stored, inserted) = table.insert(
                hash,
                StringItem {
                    key: key.clone(),
                    value: i,
                },
                |v| v.key == key,
            );
            assert!(inserted);
            assert_eq!(stored.value, i);
        }

        for i in 0..200 {
            let key = alloc::format!("key_{i}");
            let hash = hash_string_key(&state, &key);
            assert_eq!(table.find(hash, |v| v.key == key).map(|v| v.value), Some(i));
        }

        let missing = "absent".to_string();
        let hash = hash_string_key(&state, &missing);
        assert!(table.find(hash, |v| v.key == missing).is_none());
    }

    #[test]
    fn entry_or_insert_with() {
        let state = HashState::default();
        let mut table: HashTable<StringItem> = HashTable::with_capacity(8);
        let key = "alpha".to_string();
        let hash = hash_string_key(&state, &key);

        let value = table
            .entry(hash, |v| v.key == key)
            .or_insert_with(|| StringItem {
                key: key.clone(),
                value: 1,
            });
        value.value += 1;

        let value = table.entry(hash, |v| v.key == key).or_insert(StringItem {
            key: key.clone(),
            value: 100,
        });
        assert_eq!(value.value, 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn drops_every_live_element() {
        use alloc::rc::Rc;

        let marker = Rc::new(());
        {
            let mut table: HashTable<(u64, Rc<()>)> = HashTable::with_capacity(2);
            for k in 0..50u64 {
                table.insert(k, (k, Rc::clone(&marker)), |(v, _)| *v == k);
            }
            // Duplicates are dropped straight away.
            table.insert(3, (3, Rc::clone(&marker)), |(v, _)| *v == 3);
            assert_eq!(Rc::strong_count(&marker), 51);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn histogram_and_stats() {
        let state = HashState::default();
        let mut table: HashTable<Item> = HashTable::with_capacity(0);
        for k in 0..500u64 {
            insert_item(&mut table, hash_key(&state, k), k);
        }

        let histogram = table.probe_histogram();
        assert_eq!(histogram.total(), 500);
        assert!(histogram.bins.len() <= table.max_probe + 1);

        let stats = table.debug_stats();
        assert_eq!(stats.populated, 500);
        assert_eq!(stats.capacity, table.capacity());
        assert_eq!(stats.resize_watermark, table.capacity() / 2);
        assert!(stats.load_factor < 1.0);
        assert!(stats.wasted_bytes < stats.total_bytes);

        #[cfg(feature = "std")]
        {
            histogram.print();
            stats.print();
        }
    }

    #[test]
    fn debug_shows_slot_map() {
        let mut table: HashTable<Item> = HashTable::with_capacity(4);
        insert_item(&mut table, 5, 5);
        insert_item(&mut table, 9, 9);

        let rendered = alloc::format!("{:?}", table);
        assert!(rendered.contains("populated: 2"), "{rendered}");
        assert!(rendered.contains("\"01+0\""), "{rendered}");
        assert!(rendered.contains("\"01+1\""), "{rendered}");
        assert!(rendered.contains("\"..\""), "{rendered}");
    }
}
