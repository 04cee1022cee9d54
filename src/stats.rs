use serde::{Deserialize, Serialize};
use std::fmt;

/// Running counters for a single cache instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// New keys added.
    pub inserts: u64,
    /// Inserts that overwrote an existing key.
    pub updates: u64,
    pub evictions: u64,
    pub removals: u64,
}

impl CacheStats {
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub(crate) fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} ratio={:.2}% inserts={} updates={} evictions={} removals={}",
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.inserts,
            self.updates,
            self.evictions,
            self.removals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);

        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(true);
        stats.record_lookup(false);
        assert_eq!(stats.lookups(), 4);
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = CacheStats {
            hits: 2,
            evictions: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"hits\":2"));
        let back: CacheStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_display_summary() {
        let stats = CacheStats {
            hits: 1,
            misses: 1,
            ..Default::default()
        };
        assert!(stats.to_string().starts_with("hits=1 misses=1 ratio=50.00%"));
    }
}
