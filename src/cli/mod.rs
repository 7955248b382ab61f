pub mod upgrade;

use tracing::warn;

/// Run `f` on a rayon pool of `jobs` threads, or on the global pool when
/// no count is given.
pub fn with_jobs<T: Send>(jobs: Option<usize>, f: impl FnOnce() -> T + Send) -> T {
    let Some(threads) = jobs else {
        return f();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(f),
        Err(e) => {
            warn!("cannot start {} worker threads: {}", threads, e);
            f()
        }
    }
}
