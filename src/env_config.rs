//! Process environment shared by the binaries.
//!
//! `YAHTZEE_BASE_PATH` sets the working directory; `RAYON_NUM_THREADS`
//! (falling back to `OMP_NUM_THREADS`) sizes the rayon pool.

use std::path::PathBuf;

use log::{info, warn};

use crate::error::ConfigError;

/// Read `YAHTZEE_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> Result<PathBuf, ConfigError> {
    let base_path = std::env::var("YAHTZEE_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(&base_path);
    std::env::set_current_dir(&path).map_err(|source| ConfigError::BasePath {
        path: path.clone(),
        source,
    })?;
    if let Ok(cwd) = std::env::current_dir() {
        info!("Working directory: {}", cwd.display());
    }
    Ok(path)
}

/// Thread count from the environment, `None` if unset or unparseable.
pub fn env_thread_count() -> Option<usize> {
    let (var, raw) = ["RAYON_NUM_THREADS", "OMP_NUM_THREADS"]
        .iter()
        .find_map(|&var| std::env::var(var).ok().map(|raw| (var, raw)))?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("Ignoring {}={:?}: not a positive integer", var, raw);
            None
        }
    }
}

/// Build the global rayon pool. `threads` overrides the environment; with
/// neither, rayon picks its own default. Returns the pool size.
pub fn init_rayon_threads(threads: Option<usize>) -> Result<usize, ConfigError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads.or_else(env_thread_count) {
        builder = builder.num_threads(n);
    }
    builder.build_global()?;
    let num_threads = rayon::current_num_threads();
    info!("Rayon threads: {}", num_threads);
    Ok(num_threads)
}
