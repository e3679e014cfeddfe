//! Memoized commutation columns
//!
//! Building a `CommutationTable` walks the whole mortality table, so callers
//! that value many contracts keep one cache per mortality table and look
//! columns up by (sex, rate).

use std::collections::HashMap;
use std::sync::Arc;

use super::CommutationTable;
use crate::contract::Sex;
use crate::tables::MortalityTable;

/// Cache key: sex and the rate's bit pattern
type CacheKey = (Sex, u64);

/// Commutation columns for one mortality table, keyed by (sex, rate)
#[derive(Debug)]
pub struct CommutationCache {
    table: Arc<MortalityTable>,

    entries: HashMap<CacheKey, Arc<CommutationTable>>,

    /// Statistics
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl CommutationCache {
    pub fn new(table: Arc<MortalityTable>) -> Self {
        Self {
            table,
            entries: HashMap::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Columns for (sex, rate), built on first use
    pub fn get(&mut self, sex: Sex, rate: f64) -> Arc<CommutationTable> {
        let key = (sex, rate.to_bits());

        if let Some(columns) = self.entries.get(&key) {
            self.cache_hits += 1;
            log::debug!("commutation cache hit: sex {} rate {}", sex, rate);
            return Arc::clone(columns);
        }

        self.cache_misses += 1;
        log::debug!("commutation cache miss: sex {} rate {}", sex, rate);
        let columns = Arc::new(CommutationTable::new(&self.table, sex, rate));
        self.entries.insert(key, Arc::clone(&columns));
        columns
    }

    /// Whether columns for (sex, rate) are already built
    pub fn contains(&self, sex: Sex, rate: f64) -> bool {
        self.entries.contains_key(&(sex, rate.to_bits()))
    }

    pub fn table(&self) -> &MortalityTable {
        &self.table
    }

    /// Clear all cached columns and statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
