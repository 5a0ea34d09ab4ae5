//! Cancellation flag for pending rebuild tasks.
//!
//! A superseded task is not removed from the scheduler queue; its flag is set
//! and it is dropped when its debounce wait ends. The flag is read exactly
//! once, at that point. A rebuild that has passed the check always runs to
//! completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation flag shared between the scheduler and a pending task.
///
/// Clones share state: cancelling any clone is observed by all of them.
///
/// # Example
///
/// ```
/// use appsearch_core::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let queued = token.clone();
///
/// token.cancel();
/// assert!(queued.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Has no effect on a task already past its check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
