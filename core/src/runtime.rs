use crate::{Error, Result};
use rayon::ThreadPoolBuilder;
use std::env;
use std::sync::OnceLock;

/// Environment variable consulted when no explicit thread count is given.
pub const CPU_THREADS_ENV: &str = "CVMAT_CPU_THREADS";

static THREAD_POOL_INIT: OnceLock<Result<()>> = OnceLock::new();

/// Initialize the global Rayon thread pool used by the parallel loops in
/// colour conversion and filtering.
///
/// Priority:
/// 1. `num_threads` argument
/// 2. `CVMAT_CPU_THREADS` environment variable
/// 3. Rayon default
///
/// Only the first call has any effect; later calls return its outcome.
pub fn init_global_thread_pool(num_threads: Option<usize>) -> Result<()> {
    let res = THREAD_POOL_INIT.get_or_init(|| {
        let from_env = match num_threads {
            Some(_) => None,
            None => env_thread_setting()?,
        };
        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = resolve_thread_count(num_threads, from_env.as_deref())? {
            builder = builder.num_threads(n);
        }
        builder
            .build_global()
            .map_err(|e| Error::Argument(format!("failed to build thread pool: {e}")))?;
        tracing::debug!(threads = rayon::current_num_threads(), "initialized global thread pool");
        Ok(())
    });
    res.clone()
}

pub fn current_cpu_threads() -> usize {
    rayon::current_num_threads()
}

fn env_thread_setting() -> Result<Option<String>> {
    match env::var(CPU_THREADS_ENV) {
        Ok(v) => Ok(Some(v)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Argument(format!("failed to read {CPU_THREADS_ENV}: {e}"))),
    }
}

/// Worker count to build the pool with; `None` leaves Rayon's default.
/// An explicit count wins over the environment setting, which is only
/// parsed when it is consulted.
fn resolve_thread_count(explicit: Option<usize>, from_env: Option<&str>) -> Result<Option<usize>> {
    let count = match (explicit, from_env) {
        (Some(n), _) => n,
        (None, Some(raw)) => raw.trim().parse().map_err(|_| {
            Error::Argument(format!(
                "{CPU_THREADS_ENV} must be a positive integer, got '{raw}'"
            ))
        })?,
        (None, None) => return Ok(None),
    };
    if count == 0 {
        return Err(Error::Argument("thread count must be >= 1".into()));
    }
    Ok(Some(count))
}
