//! Application configuration for the demo.

use std::time::Duration;

/// Default bridge loop period.
const DEFAULT_TICK_MS: u64 = 8;
/// Default duration above which a run is always logged.
const DEFAULT_SLOW_RUN_MS: u64 = 50;

/// Runtime configuration for the regrade binary.
///
/// Defaults come from the environment; command-line flags override them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Worker threads for the kernel pool. `0` lets rayon decide.
    pub threads: usize,
    /// Runs slower than this are always logged.
    pub slow_run_threshold: Duration,
    /// How often the bridge loop drains input and polls the pipeline.
    pub tick_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threads: env_or("REGRADE_THREADS", 0),
            slow_run_threshold: Duration::from_millis(env_or(
                "REGRADE_SLOW_RUN_MS",
                DEFAULT_SLOW_RUN_MS,
            )),
            tick_interval: Duration::from_millis(env_or("REGRADE_TICK_MS", DEFAULT_TICK_MS)),
        }
    }
}

impl AppConfig {
    /// Apply command-line overrides on top of the environment defaults.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        if let Some(threads) = threads {
            self.threads = threads;
        }
        self
    }

    /// Size the global rayon pool. Must run before the first kernel pass.
    pub fn init_thread_pool(&self) -> Result<(), rayon::ThreadPoolBuildError> {
        if self.threads == 0 {
            return Ok(());
        }
        tracing::debug!("kernel pool: {} threads", self.threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build_global()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
