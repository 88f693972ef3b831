//! Probe-sequence-length statistics.
//!
//! Read-only scans over the bucket array, used to judge hash quality and
//! table health. None of these are on the hot path and none are called by
//! put/get/del. All are undefined on an empty table (debug-asserted).

use crate::table::{Bucket, RobinTable};

impl<'k, V, H> RobinTable<'k, V, H> {
    fn occupied(&self) -> impl Iterator<Item = &Bucket<'k, V>> {
        self.buckets.iter().filter_map(Option::as_ref)
    }

    /// Largest PSL of any entry. Correlates directly with the worst-case
    /// lookup cost of the table.
    pub fn psl_max(&self) -> usize {
        debug_assert!(self.count != 0, "PSL stats undefined on empty table");
        self.occupied().map(|b| b.psl).max().unwrap_or(0)
    }

    /// Average displacement of entries from their ideal buckets. The higher
    /// the mean, the more probes core operations need on average.
    pub fn psl_mean(&self) -> f64 {
        debug_assert!(self.count != 0, "PSL stats undefined on empty table");
        let sum: usize = self.occupied().map(|b| b.psl).sum();
        sum as f64 / self.count as f64
    }

    /// Statistical variance of the PSLs. A high variance suggests the hash
    /// strategy is violating the uniform-hashing assumption and clustering
    /// entries in parts of the table.
    pub fn psl_variance(&self) -> f64 {
        debug_assert!(self.count != 0, "PSL stats undefined on empty table");
        let mean = self.psl_mean();
        let var_sum: f64 = self
            .occupied()
            .map(|b| {
                let diff = b.psl as f64 - mean;
                diff * diff
            })
            .sum();
        var_sum / self.count as f64
    }
}
