//! Seeded synthetic access streams for comparing cache policies.
//!
//! Keys are skewed toward a small hot set so that recency actually matters:
//! most accesses land on the first fifth of the key space.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use tracing::debug;

use crate::error::ConfigError;
use crate::policy::ReplacementPolicy;

const HOT_KEY_SHARE: f64 = 0.2;
const HOT_TRAFFIC: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    pub operations: usize,
    pub key_space: u64,
    /// Share of operations that are lookups.
    pub read_ratio: f64,
    /// Share of operations that are removals. The rest are inserts.
    pub remove_ratio: f64,
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            operations: 10_000,
            key_space: 512,
            read_ratio: 0.7,
            remove_ratio: 0.05,
            seed: 42,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("read_ratio", self.read_ratio), ("remove_ratio", self.remove_ratio)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRatio { field, value });
            }
        }
        let total = self.read_ratio + self.remove_ratio;
        if total > 1.0 {
            return Err(ConfigError::RatioOverflow { total });
        }
        if self.key_space == 0 {
            return Err(ConfigError::EmptyKeySpace);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get(u64),
    Insert(u64, u64),
    Remove(u64),
}

#[derive(Debug, Clone)]
pub struct Workload {
    ops: Vec<Op>,
}

impl Workload {
    /// Build the op stream. The same config always yields the same stream.
    pub fn generate(config: &WorkloadConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let hot_keys = ((config.key_space as f64 * HOT_KEY_SHARE) as u64).max(1);
        let mut ops = Vec::with_capacity(config.operations);

        for _ in 0..config.operations {
            let key = if rng.gen_bool(HOT_TRAFFIC) {
                rng.gen_range(0..hot_keys)
            } else {
                rng.gen_range(0..config.key_space)
            };
            let roll: f64 = rng.gen();
            let op = if roll < config.read_ratio {
                Op::Get(key)
            } else if roll < config.read_ratio + config.remove_ratio {
                Op::Remove(key)
            } else {
                Op::Insert(key, rng.gen())
            };
            ops.push(op);
        }

        Ok(Workload { ops })
    }

    pub fn from_ops(ops: Vec<Op>) -> Self {
        Workload { ops }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Replay the stream against `cache` and tally what happened.
    pub fn run(&self, cache: &mut dyn ReplacementPolicy<u64, u64>) -> RunReport {
        let mut report = RunReport {
            policy: cache.name().to_string(),
            operations: self.ops.len(),
            ..Default::default()
        };
        let started = Instant::now();

        for op in &self.ops {
            match *op {
                Op::Get(key) => {
                    if cache.get(&key).is_some() {
                        report.hits += 1;
                    } else {
                        report.misses += 1;
                    }
                }
                Op::Insert(key, value) => {
                    report.evictions += cache.put(key, value).len() as u64;
                }
                Op::Remove(key) => {
                    cache.remove(&key);
                }
            }
            report.max_len = report.max_len.max(cache.len());
        }

        report.elapsed_us = started.elapsed().as_micros() as u64;
        debug!(policy = %report.policy, hits = report.hits, misses = report.misses, "workload finished");
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub policy: String,
    pub operations: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Largest size the cache reached during the run.
    pub max_len: usize,
    pub elapsed_us: u64,
}

impl RunReport {
    pub fn hit_ratio(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }
}
