//! Change notification and scheduler control on AppSearch.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::Result;
use crate::models::{ChangeEvent, Scope};
use crate::scheduler::SchedulerStatus;
use crate::AppSearch;

impl AppSearch {
    /// Items in `scope` were added or changed. Returns immediately; the
    /// index is rebuilt after the debounce delay.
    pub fn notify_changed(&self, scope: Scope) -> Result<()> {
        self.scheduler.notify_changed(scope)
    }

    /// Items in `scope` were removed. Returns immediately.
    pub fn notify_removed(&self, scope: Scope) -> Result<()> {
        self.scheduler.notify_removed(scope)
    }

    /// Feed host change events into the scheduler until the sender closes.
    pub fn attach_change_source(&self, events: mpsc::Receiver<ChangeEvent>) -> JoinHandle<()> {
        self.scheduler.attach_change_source(events)
    }

    pub fn scheduler_status(&self) -> SchedulerStatus {
        self.scheduler.status()
    }

    /// Wait until all notifications sent so far have been applied.
    pub async fn wait_until_idle(&self) -> Result<()> {
        self.scheduler.wait_until_idle().await
    }

    /// Stop the background scheduler. Searches keep working on the last
    /// built index; further notifications are rejected.
    pub async fn shutdown(&self) {
        info!("Shutting down AppSearch");
        self.scheduler.shutdown().await;
    }
}
