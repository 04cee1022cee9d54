//! Tracing subscriber setup for binaries.
//!
//! The library only emits events (`trace!` per eviction, `debug!` for resizes,
//! clears and lazy sweeps); nothing is printed until a binary calls `init`.
//!
//! Set `RUST_LOG` to override the default filter:
//! ```bash
//! RUST_LOG=recency=trace lru_demo
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact stderr subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("recency=debug,lru_demo=debug")
        } else {
            EnvFilter::new("recency=info,lru_demo=info")
        }
    });

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact(),
    );

    // A second call finds a subscriber already installed; that is fine.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
