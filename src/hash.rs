//! Pluggable hash strategies.
//!
//! The table calls a strategy for every key through one contract:
//! `hash(key_bytes, seed) -> u64`. Three reference strategies are provided,
//! all backed by their ecosystem implementations rather than in-crate bit
//! mixing: [`RapidHash`] (fast general-purpose, the default), [`SipHash`]
//! (keyed and hardened against crafted keys), and [`Xxh64`] (the legacy fast
//! hash). [`FnStrategy`] adapts any plain function or closure.

use core::hash::Hasher;
use siphasher::sip::SipHasher24;

/// Default 64-bit seed, chosen for the rapidhash default strategy.
pub const DEFAULT_SEED: u64 = 0xbdd8_9aa9_8270_4029;

/// A keyed byte-string hash. Implementations must be pure: the same key and
/// seed always produce the same value, since the table caches hashes across
/// rehashes.
pub trait HashStrategy {
    fn hash(&self, key: &[u8], seed: u64) -> u64;
}

/// Fast general-purpose mixing hash (rapidhash). The default strategy.
#[derive(Copy, Clone, Debug, Default)]
pub struct RapidHash;

impl HashStrategy for RapidHash {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        rapidhash::rapidhash_seeded(key, seed)
    }
}

/// Keyed, hardened hash (SipHash-2-4). Not cryptographic, but resistant to
/// hash-flooding with an attacker-unknown seed.
#[derive(Copy, Clone, Debug, Default)]
pub struct SipHash;

impl HashStrategy for SipHash {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        // The single 64-bit seed covers both halves of the 128-bit key.
        let mut hasher = SipHasher24::new_with_keys(seed, seed >> 32);
        hasher.write(key);
        hasher.finish()
    }
}

/// Legacy fast hash (XXH64).
#[derive(Copy, Clone, Debug, Default)]
pub struct Xxh64;

impl HashStrategy for Xxh64 {
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        xxhash_rust::xxh64::xxh64(key, seed)
    }
}

/// Adapter turning any `Fn(&[u8], u64) -> u64` into a strategy.
#[derive(Copy, Clone, Debug)]
pub struct FnStrategy<F>(pub F);

impl<F> HashStrategy for FnStrategy<F>
where
    F: Fn(&[u8], u64) -> u64,
{
    #[inline]
    fn hash(&self, key: &[u8], seed: u64) -> u64 {
        (self.0)(key, seed)
    }
}
