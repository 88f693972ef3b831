//! robin-table: an open-addressed hash table with Robin Hood displacement
//! and backward-shift deletion, mapping borrowed byte-string keys to opaque
//! values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: predictable worst-case probe length rather than raw average-case
//!   speed. Robin Hood insertion keeps the variance of probe sequence
//!   lengths (PSLs) low, which in turn lets lookups terminate early.
//! - Layers:
//!   - HashStrategy (src/hash.rs): the only external collaborator. One
//!     contract, `hash(key_bytes, seed) -> u64`; three reference strategies
//!     backed by ecosystem crates (rapidhash, siphasher, xxhash-rust) plus a
//!     function adapter.
//!   - RobinTable (src/table.rs): bucket store, capacity policy, and probe
//!     engine. A bucket is `Option<Bucket>`; an occupied bucket carries the
//!     key slice, the value, the cached 64-bit hash, and the PSL of its
//!     current position.
//!   - Iterators (src/table.rs): forward-only cursors over occupied slots in
//!     bucket-array order. No allocation per step; the shared or exclusive
//!     borrow they hold makes concurrent mutation a compile error rather
//!     than a documented hazard.
//!   - Diagnostics (src/diagnostics.rs): full-scan PSL statistics
//!     (max/mean/variance), off the hot path.
//!
//! Constraints
//! - Single-threaded: mutation requires `&mut self`; no internal locking or
//!   atomics anywhere.
//! - Keys are `&'k [u8]` views. The table never copies or frees key bytes;
//!   callers keep every key alive for as long as it stays in the table.
//! - Values are opaque: moved in by `put`, handed back by `del`, never
//!   inspected.
//! - Bucket count is always a power of two, at least 32, and never below
//!   the count the table was created with.
//!
//! Probing invariant
//! - Every occupied slot satisfies `psl == (index - (hash & mask)) mod
//!   bucket_count`. Insertion only ever displaces a resident with a strictly
//!   smaller PSL than the probing entry, so along any probe path PSLs are
//!   informative: a lookup that has travelled `p` slots and meets a resident
//!   with `psl < p` can stop, because a matching key would have displaced
//!   that resident at insertion time.
//! - Deletion restores the invariant without tombstones by shifting the
//!   following run back one slot and decrementing each shifted PSL.
//!
//! Capacity policy
//! - Grow (double) when a put finds the table at 75% load; shrink (halve)
//!   when a delete leaves it at 25%, but never below the initial bucket
//!   count. Resizing reinserts every entry through the normal insertion
//!   path, reusing each entry's cached hash.
//!
//! Duplicate-key policy
//! - `put` on a present key does NOT overwrite: the resident value wins and
//!   is returned, the supplied value is dropped. This is deliberate and
//!   observable; callers wanting upsert semantics delete first.
//!
//! Error model
//! - Allocation failure (construction, growth on put, reallocation on
//!   `clear(true)`) is an explicit `AllocError`; the table is always left in
//!   its previous consistent state. Shrink failure during delete is ignored,
//!   since the delete already succeeded and shrinking is an optimization.
//! - Contract violations (zero-length keys, PSL statistics or load factor on
//!   an empty table) are debug assertions, unspecified in release builds.

mod diagnostics;
mod hash;
mod table;
mod table_proptest;

// Public surface
pub use hash::{FnStrategy, HashStrategy, RapidHash, SipHash, Xxh64, DEFAULT_SEED};
pub use table::{AllocError, Iter, IterMut, RobinTable};
