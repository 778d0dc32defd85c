//! Runtime configuration loading from environment variables.
//!
//! All values come from `DISPATCH_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `DISPATCH_QUEUE_CAPACITY` | 256 | Max resident work items |
//! | `DISPATCH_WORKERS` | 0 | Worker threads (0 = one per CPU) |
//! | `DISPATCH_WORKER_STACK_SIZE` | 0 | Worker stack size in bytes (0 = default) |
//! | `DISPATCH_LOG_LEVEL` | info | `EnvFilter` directive |
//! | `DISPATCH_LOG_FORMAT` | json | `json` or `pretty` |
//! | `DISPATCH_LOG_FILE` | unset | Log file path (stderr if unset) |

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::scheduler::WorkerPoolConfig;
use crate::telemetry::{LogConfig, LogFormat};
use crate::RuntimeConfig;

const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Upper bound on capacity; the whole buffer is reserved at startup.
const MAX_QUEUE_CAPACITY: usize = 1 << 20;
/// Floor for explicit stack sizes: 64 KiB.
const MIN_STACK_SIZE: usize = 64 * 1024;

/// Flat summary of the effective configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub queue_capacity: usize,
    pub workers: usize,
    pub worker_stack_size: usize,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub queue_capacity: usize,
    pub pool: WorkerPoolConfig,
    pub log: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

fn load_pool_config() -> WorkerPoolConfig {
    let workers = match parse_usize("DISPATCH_WORKERS", 0) {
        0 => num_cpus::get(),
        n => n,
    };
    let stack_size = match parse_usize("DISPATCH_WORKER_STACK_SIZE", 0) {
        0 => 0,
        n => n.max(MIN_STACK_SIZE),
    };
    WorkerPoolConfig {
        workers: NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN),
        stack_size,
        ..WorkerPoolConfig::default()
    }
}

fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let level = std::env::var("DISPATCH_LOG_LEVEL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.level);
    let format = std::env::var("DISPATCH_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    let output_path = std::env::var_os("DISPATCH_LOG_FILE")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    LogConfig { format, level, output_path }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let queue_capacity = parse_usize("DISPATCH_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)
        .clamp(1, MAX_QUEUE_CAPACITY);

    EnvConfig {
        queue_capacity,
        pool: load_pool_config(),
        log: load_log_config(),
    }
}

impl EnvConfig {
    /// Queue and pool settings for [`crate::Runtime::start`].
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            queue_capacity: self.queue_capacity,
            pool: self.pool.clone(),
        }
    }

    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            queue_capacity: self.queue_capacity,
            workers: self.pool.workers.get(),
            worker_stack_size: self.pool.stack_size,
            log_level: self.log.level.clone(),
            log_format: self.log.format,
            log_file: self.log.output_path.clone(),
        }
    }
}
