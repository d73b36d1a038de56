use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Default bound on concurrent workers for hashing, copying, and verifying.
pub const DEFAULT_WORKERS: usize = 4;

/// Build the bounded pool every fan-out phase runs on.
///
/// A dedicated pool (rather than the global one) keeps the cap explicit:
/// exactly `workers` threads, bounding open descriptors during a phase.
pub fn worker_pool(workers: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new().num_threads(workers.max(1)).build()
}
