//! Simpler LRU variants kept as benchmark baselines for `LruCache`.
//!
//! Both stamp each entry with a logical access time instead of keeping a
//! linked order, and pay for it at eviction time.

mod lazy;
mod naive;

pub use lazy::LazyLru;
pub use naive::NaiveLru;
