use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock `mutex`, taking the inner value back if another thread panicked
/// while holding it. The store only holds plain data, so a poisoned guard
/// is still usable.
pub(crate) fn lock_recovering<'a, T>(
    mutex: &'a Mutex<T>,
    source: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!(
            target = "gazette::cache",
            source,
            op,
            "Recovered poisoned cache lock; entries may be stale"
        );
        poisoned.into_inner()
    })
}
