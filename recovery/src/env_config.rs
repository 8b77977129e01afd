//! Shared process setup for the binaries: logging and the rayon pool.
//!
//! Reads `RUST_LOG` (overrides the `--verbose` level) and `RAYON_NUM_THREADS`
//! (fallback `OMP_NUM_THREADS`, default 8).

use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default worker count when neither thread variable is set.
pub const DEFAULT_THREADS: usize = 8;

/// Install the global fmt subscriber: compact, no target, INFO or DEBUG.
///
/// A `RUST_LOG` directive takes precedence over `verbose`. Calling this
/// twice leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("global tracing subscriber already set");
    }
}

/// Thread count from `RAYON_NUM_THREADS`, then `OMP_NUM_THREADS`, then
/// [`DEFAULT_THREADS`]. Unparseable or zero values fall through.
pub fn configured_threads() -> usize {
    ["RAYON_NUM_THREADS", "OMP_NUM_THREADS"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .find(|&n| n > 0)
        .unwrap_or(DEFAULT_THREADS)
}

/// Build the rayon global pool with [`configured_threads`] workers.
/// Tolerates an already-initialized pool. Returns the thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = configured_threads();
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => info!("rayon threads: {num_threads}"),
        Err(e) => warn!("rayon pool not rebuilt ({e}), using {}", rayon::current_num_threads()),
    }
    num_threads
}
