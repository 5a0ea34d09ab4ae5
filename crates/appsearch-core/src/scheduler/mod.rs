//! Background index maintenance.
//!
//! Change notifications are debounced per scope and turned into rebuild tasks
//! that enumerate the scope and swap the result into the token index.

mod enumerator;
mod rebuild;
mod worker;

pub use enumerator::{Enumerator, InMemoryEnumerator};
pub use rebuild::RebuildKind;
pub(crate) use rebuild::RebuildContext;
pub use worker::{QueuedRebuild, SchedulerStatus, TaskState, UpdateScheduler};
