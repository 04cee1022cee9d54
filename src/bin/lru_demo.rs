use colored::Colorize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

use recency::config::HarnessConfig;
use recency::workload::{RunReport, Workload};
use recency::{logging, CacheError, ConfigError, LruCache};

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

// =============================================================================
// Scenarios
// =============================================================================

fn show_scenarios() -> Result<(), CacheError> {
    println!("{}", "=== LRU scenarios ===".bold());

    let mut cache = LruCache::new(2)?;
    cache.insert("A", 1);
    cache.insert("B", 2);
    let hit = cache.get("A").copied();
    println!("  get(A) = {:?}, newest = {:?}", hit, cache.newest_key());
    let evicted = cache.insert("C", 3);
    println!("  insert(C, 3) evicted {:?}", evicted);
    println!("  cache now {:?} (len {})", cache, cache.len());

    let mut single = LruCache::new(1)?;
    single.insert("A", 1);
    println!("  capacity 1: insert(B, 2) evicted {:?}", single.insert("B", 2));

    let mut empty: LruCache<&str, i32> = LruCache::new(4)?;
    println!("  remove on empty cache = {:?}", empty.remove("A"));

    match LruCache::<&str, i32>::new(0) {
        Ok(_) => println!("  {}", "capacity 0 unexpectedly accepted".red()),
        Err(e) => println!("  capacity 0 rejected: {}", e.to_string().yellow()),
    }
    Ok(())
}

// =============================================================================
// Cache-aside: the caller owns the backing store and decides what to do
// with evicted entries.
// =============================================================================

struct SlowStore {
    rows: HashMap<String, String>,
    reads: usize,
}

impl SlowStore {
    fn new() -> Self {
        let rows = (0..10)
            .map(|i| (format!("user:{i}"), format!("profile #{i}")))
            .collect();
        SlowStore { rows, reads: 0 }
    }

    fn load(&mut self, key: &str) -> Option<String> {
        self.reads += 1;
        self.rows.get(key).cloned()
    }
}

struct CacheAside {
    cache: LruCache<String, String>,
    store: SlowStore,
}

impl CacheAside {
    fn fetch(&mut self, key: &str) -> Option<String> {
        if let Some(value) = self.cache.get(key) {
            return Some(value.clone());
        }
        let value = self.store.load(key)?;
        if let Some((old_key, _)) = self.cache.insert(key.to_string(), value.clone()) {
            info!(key = %old_key, "dropped from cache");
        }
        Some(value)
    }
}

fn show_cache_aside() -> Result<(), CacheError> {
    println!("\n{}", "=== Cache-aside ===".bold());

    let mut layer = CacheAside {
        cache: LruCache::new(3)?,
        store: SlowStore::new(),
    };
    let requests = ["user:1", "user:2", "user:1", "user:3", "user:4", "user:1", "user:2", "user:9x"];
    for key in requests {
        match layer.fetch(key) {
            Some(value) => println!("  {key:<8} -> {value}"),
            None => println!("  {key:<8} -> {}", "not found".red()),
        }
    }
    println!(
        "  store reads: {}, cache {}",
        layer.store.reads,
        layer.cache.stats()
    );
    Ok(())
}

// =============================================================================
// Policy comparison
// =============================================================================

fn compare_policies(config: &HarnessConfig) -> Result<Vec<RunReport>, DemoError> {
    println!("\n{}", "=== Policy comparison ===".bold());
    println!(
        "  capacity {}, {} ops over {} keys (seed {})",
        config.capacity, config.workload.operations, config.workload.key_space, config.workload.seed
    );

    let workload = Workload::generate(&config.workload)?;
    let mut reports = Vec::with_capacity(config.policies.len());

    for kind in &config.policies {
        let mut cache = kind.build::<u64, u64>(config.capacity)?;
        let report = workload.run(cache.as_mut());
        println!(
            "  {:<11} hit ratio {:>6.2}%  evictions {:>6}  max len {:>5}  {:>8} us",
            report.policy.cyan(),
            report.hit_ratio() * 100.0,
            report.evictions,
            report.max_len,
            report.elapsed_us
        );
        reports.push(report);
    }
    Ok(reports)
}

fn run(config_path: Option<PathBuf>) -> Result<(), DemoError> {
    let config = match config_path {
        Some(path) => HarnessConfig::from_file(&path)?,
        None => HarnessConfig::default(),
    };

    show_scenarios()?;
    show_cache_aside()?;
    let reports = compare_policies(&config)?;

    println!("\n{}", "=== JSON report ===".bold());
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn main() -> ExitCode {
    logging::init();

    match run(env::args_os().nth(1).map(PathBuf::from)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_aside_reads_store_once_per_miss() {
        let mut layer = CacheAside {
            cache: LruCache::new(2).unwrap(),
            store: SlowStore::new(),
        };

        assert_eq!(layer.fetch("user:1").as_deref(), Some("profile #1"));
        assert_eq!(layer.fetch("user:1").as_deref(), Some("profile #1"));
        assert_eq!(layer.store.reads, 1);

        layer.fetch("user:2");
        layer.fetch("user:3");
        layer.fetch("user:1");
        assert_eq!(layer.store.reads, 4);
    }

    #[test]
    fn test_missing_row_not_cached() {
        let mut layer = CacheAside {
            cache: LruCache::new(2).unwrap(),
            store: SlowStore::new(),
        };
        assert_eq!(layer.fetch("nobody"), None);
        assert!(layer.cache.is_empty());
    }

    #[test]
    fn test_compare_policies_runs_each() {
        let mut config = HarnessConfig::default();
        config.workload.operations = 200;
        let reports = compare_policies(&config).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.operations == 200));
    }
}
