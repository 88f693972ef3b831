//! RobinTable: open-addressed bucket store, capacity policy, and probe engine.

use crate::hash::{HashStrategy, RapidHash, DEFAULT_SEED};
use core::fmt;
use core::mem;

/// Bucket count is always a power of two and never drops below this.
pub(crate) const MIN_BUCKETS: usize = 32;

/// Load-factor thresholds, in percent of the bucket count.
pub(crate) const MAX_LOAD_PCT: usize = 75;
pub(crate) const MIN_LOAD_PCT: usize = 25;

/// Bucket storage could not be allocated. The table is left in its previous,
/// fully consistent state whenever this is reported.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bucket array allocation failed")
    }
}

impl std::error::Error for AllocError {}

/// An occupied slot. `psl` is the displacement of this entry from its ideal
/// index `hash & mask`; it is a property of the entry's current position, not
/// of the key, and changes whenever the entry is moved.
#[derive(Debug)]
pub(crate) struct Bucket<'k, V> {
    pub(crate) key: &'k [u8],
    pub(crate) val: V,
    pub(crate) hash: u64,
    pub(crate) psl: usize,
}

pub(crate) type Slot<'k, V> = Option<Bucket<'k, V>>;

/// Open-addressed hash table with Robin Hood displacement and backward-shift
/// deletion.
///
/// Keys are borrowed byte slices: the table stores the reference and never
/// copies the bytes, so every key must outlive the table (the `'k` lifetime).
/// Values are moved in and returned on removal; the table never inspects
/// them.
///
/// Duplicate-key policy: `put` on a key that is already present does **not**
/// overwrite. The resident value stays, the supplied value is dropped, and
/// the resident is returned. Callers expecting upsert semantics must `del`
/// first.
pub struct RobinTable<'k, V, H = RapidHash> {
    pub(crate) buckets: Vec<Slot<'k, V>>,
    pub(crate) count: usize,
    init_buckets: usize,
    mask: usize,
    expand_at: usize,
    shrink_at: usize,
    seed: u64,
    strategy: H,
}

/// Allocate `n` empty slots without the abort-on-OOM path.
fn alloc_slots<'k, V>(n: usize) -> Result<Vec<Slot<'k, V>>, AllocError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(n).map_err(|_| AllocError)?;
    slots.resize_with(n, || None);
    Ok(slots)
}

/// Bucket count for an expected number of entries: apply the maximum load
/// factor, then floor at `MIN_BUCKETS` or round up to a power of two.
fn bucket_count_for(count: usize) -> usize {
    let raw = (count * 100).div_ceil(MAX_LOAD_PCT);
    if raw < MIN_BUCKETS {
        MIN_BUCKETS
    } else {
        raw.next_power_of_two()
    }
}

impl<'k, V> RobinTable<'k, V> {
    /// Create a table sized for `expected` entries, hashing with the default
    /// strategy ([`RapidHash`]) and seed.
    pub fn with_capacity(expected: usize) -> Result<Self, AllocError> {
        Self::with_strategy(expected, RapidHash, DEFAULT_SEED)
    }
}

impl<'k, V, H> RobinTable<'k, V, H> {
    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current size of the bucket array. Always a power of two, never below
    /// the size the table was created with.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries divided by buckets. Undefined on an empty table.
    pub fn load_factor(&self) -> f64 {
        debug_assert!(self.count != 0, "load factor undefined on empty table");
        self.count as f64 / self.buckets.len() as f64
    }

    /// Drop all entries. With `shrink`, also reallocate the bucket array back
    /// to its initial size; if that allocation fails the table is left
    /// entirely unchanged.
    pub fn clear(&mut self, shrink: bool) -> Result<(), AllocError> {
        if shrink && self.buckets.len() != self.init_buckets {
            self.buckets = alloc_slots(self.init_buckets)?;
            self.mask = self.init_buckets - 1;
            self.expand_at = self.init_buckets * MAX_LOAD_PCT / 100;
            self.shrink_at = self.init_buckets * MIN_LOAD_PCT / 100;
        } else {
            for slot in &mut self.buckets {
                *slot = None;
            }
        }
        self.count = 0;
        Ok(())
    }

    /// Iterate over `(key, value)` pairs in bucket-array order.
    pub fn iter(&self) -> Iter<'_, 'k, V> {
        Iter {
            slots: self.buckets.iter(),
        }
    }

    /// Iterate with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, 'k, V> {
        IterMut {
            slots: self.buckets.iter_mut(),
        }
    }
}

impl<'k, V, H> RobinTable<'k, V, H>
where
    H: HashStrategy,
{
    /// Create a table sized for `expected` entries with an injected hash
    /// strategy and seed.
    pub fn with_strategy(expected: usize, strategy: H, seed: u64) -> Result<Self, AllocError> {
        let bucket_count = bucket_count_for(expected);
        let buckets = alloc_slots(bucket_count)?;
        Ok(Self {
            buckets,
            count: 0,
            init_buckets: bucket_count,
            mask: bucket_count - 1,
            expand_at: bucket_count * MAX_LOAD_PCT / 100,
            shrink_at: bucket_count * MIN_LOAD_PCT / 100,
            seed,
            strategy,
        })
    }

    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        self.strategy.hash(key, self.seed)
    }

    #[inline]
    fn ideal_index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Insert `key` -> `val`, growing first if the table is at its maximum
    /// load factor. Returns the value now associated with the key: the fresh
    /// one on insertion, or the resident one on a duplicate key (in which
    /// case `val` is dropped). On growth-allocation failure nothing is
    /// inserted and the table is unchanged.
    pub fn put(&mut self, key: &'k [u8], val: V) -> Result<&V, AllocError> {
        debug_assert!(!key.is_empty(), "zero-length keys are not supported");

        if self.count >= self.expand_at {
            self.resize(self.buckets.len() << 1)?;
        }

        let hash = self.hash_key(key);
        let idx = self.probe_insert(Bucket {
            key,
            val,
            hash,
            psl: 0,
        });
        // probe_insert leaves the key's bucket occupied at idx.
        Ok(&self.buckets[idx].as_ref().unwrap().val)
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        debug_assert!(!key.is_empty(), "zero-length keys are not supported");
        let idx = self.find_index(key)?;
        self.buckets[idx].as_ref().map(|b| &b.val)
    }

    /// Look up the value stored under `key`, mutably.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        debug_assert!(!key.is_empty(), "zero-length keys are not supported");
        let idx = self.find_index(key)?;
        self.buckets[idx].as_mut().map(|b| &mut b.val)
    }

    /// Remove the entry stored under `key` and return its value. The gap is
    /// closed by shifting the following run backward one slot, so no
    /// tombstones are ever left behind. May shrink the table afterwards;
    /// shrink-allocation failure is ignored since the removal has already
    /// completed.
    pub fn del(&mut self, key: &[u8]) -> Option<V> {
        debug_assert!(!key.is_empty(), "zero-length keys are not supported");

        let idx = self.find_index(key)?;
        let removed = self.buckets[idx].take()?;
        self.backward_shift(idx);
        self.count -= 1;

        if self.buckets.len() > self.init_buckets && self.count <= self.shrink_at {
            let _ = self.resize(self.buckets.len() >> 1);
        }
        Some(removed.val)
    }

    /// Locate the bucket holding `key` using the Robin Hood termination rule:
    /// a resident strictly closer to home than the probe distance travelled
    /// proves the key is absent, because insertion would have displaced it.
    fn find_index(&self, key: &[u8]) -> Option<usize> {
        let hash = self.hash_key(key);
        let mut idx = self.ideal_index(hash);
        let mut psl = 0;

        loop {
            match &self.buckets[idx] {
                Some(b) if b.hash == hash && b.key == key => return Some(idx),
                Some(b) if b.psl < psl => return None,
                Some(_) => {}
                None => return None,
            }
            idx = (idx + 1) & self.mask;
            psl += 1;
        }
    }

    /// Core insertion walk, without consulting the growth threshold. Returns
    /// the index of the bucket that now holds the original entry's key: the
    /// first slot stolen by a swap, a freshly filled slot if no swap was
    /// needed, or the resident slot on a duplicate key (in which case the
    /// supplied entry is dropped). Terminates because growth keeps at least
    /// one slot empty.
    fn probe_insert(&mut self, mut entry: Bucket<'k, V>) -> usize {
        let mut idx = self.ideal_index(entry.hash);
        // Where the original entry landed; after the first swap the walk
        // carries a displaced resident, not the caller's entry.
        let mut placed = None;

        loop {
            match &mut self.buckets[idx] {
                Some(resident) => {
                    // Duplicates can only match before any swap: resident
                    // keys are unique among themselves.
                    if resident.hash == entry.hash && resident.key == entry.key {
                        return idx;
                    }
                    // A poorer resident loses its slot; carry the displaced
                    // entry forward under the probing entry's old state.
                    if resident.psl < entry.psl {
                        mem::swap(resident, &mut entry);
                        placed.get_or_insert(idx);
                    }
                }
                slot => {
                    *slot = Some(entry);
                    self.count += 1;
                    return placed.unwrap_or(idx);
                }
            }
            idx = (idx + 1) & self.mask;
            entry.psl += 1;
        }
    }

    /// Close the hole at `hole` by pulling each following entry back one
    /// slot, decrementing its PSL, until an empty slot or an entry already at
    /// its ideal position ends the run.
    fn backward_shift(&mut self, mut hole: usize) {
        loop {
            let next = (hole + 1) & self.mask;
            match &mut self.buckets[next] {
                Some(b) if b.psl > 0 => b.psl -= 1,
                _ => break,
            }
            let moved = self.buckets[next].take();
            self.buckets[hole] = moved;
            hole = next;
        }
    }

    /// Replace the bucket array and reinsert every entry through the normal
    /// insertion path: ideal index and PSL both depend on the bucket count.
    /// The stored hash is reused, so the strategy is not re-invoked during a
    /// rehash. On allocation failure the table is unchanged.
    fn resize(&mut self, bucket_count: usize) -> Result<(), AllocError> {
        debug_assert!(bucket_count.is_power_of_two());
        debug_assert!(bucket_count > self.count);

        let new_buckets = alloc_slots(bucket_count)?;
        let old_buckets = mem::replace(&mut self.buckets, new_buckets);
        self.count = 0;
        self.mask = bucket_count - 1;
        self.expand_at = bucket_count * MAX_LOAD_PCT / 100;
        self.shrink_at = bucket_count * MIN_LOAD_PCT / 100;

        for slot in old_buckets {
            if let Some(mut entry) = slot {
                entry.psl = 0;
                self.probe_insert(entry);
            }
        }
        Ok(())
    }
}

/// Iterator over `(key, value)` pairs in bucket-array order. Holds a shared
/// borrow of the table, so the borrow checker rejects any mutation of the
/// table while it is alive.
pub struct Iter<'a, 'k, V> {
    slots: core::slice::Iter<'a, Slot<'k, V>>,
}

impl<'a, 'k, V> Iterator for Iter<'a, 'k, V> {
    type Item = (&'k [u8], &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|s| s.as_ref().map(|b| (b.key, &b.val)))
    }
}

/// Iterator over `(key, value)` pairs with mutable access to the values.
pub struct IterMut<'a, 'k, V> {
    slots: core::slice::IterMut<'a, Slot<'k, V>>,
}

impl<'a, 'k, V> Iterator for IterMut<'a, 'k, V> {
    type Item = (&'k [u8], &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .find_map(|s| s.as_mut().map(|b| (b.key, &mut b.val)))
    }
}
