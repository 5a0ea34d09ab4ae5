//! Debounced, cancellable rebuild scheduling.
//!
//! Notifications are sent over a channel to a single worker task. The worker
//! keeps at most one live task per overlapping scope: a new notification
//! flags the live tasks it overlaps as cancelled and enqueues a fresh one with
//! a new debounce deadline. Flagged tasks stay queued until their own deadline,
//! where the cancellation check drops them. Tasks run one at a time.

use super::rebuild::{RebuildContext, RebuildKind};
use crate::cancel::CancellationToken;
use crate::error::{AppSearchError, Result};
use crate::models::{ChangeEvent, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

/// A queued or running rebuild, as reported in [`SchedulerStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedRebuild {
    pub scope: Scope,
    pub kind: RebuildKind,
}

/// Lifecycle state of the rebuild for a given scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    Pending,
    Running,
}

/// Snapshot of scheduler activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Live tasks waiting for their debounce deadline.
    pub pending: Vec<QueuedRebuild>,
    /// Cancelled tasks still queued until their deadline.
    pub superseded: usize,
    pub running: Option<QueuedRebuild>,
    /// Notifications the worker has taken off the channel.
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    /// Tasks dropped at their cancellation check or at shutdown.
    pub cancelled: u64,
    pub last_rebuild_at: Option<DateTime<Utc>>,
    pub stopped: bool,
}

impl SchedulerStatus {
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.superseded == 0 && self.running.is_none()
    }

    /// State of the rebuild whose scope is exactly `scope`.
    pub fn state_of(&self, scope: &Scope) -> TaskState {
        if self.running.as_ref().is_some_and(|r| r.scope == *scope) {
            TaskState::Running
        } else if self.pending.iter().any(|p| p.scope == *scope) {
            TaskState::Pending
        } else {
            TaskState::Idle
        }
    }
}

enum Command {
    Notify { scope: Scope, kind: RebuildKind },
    Shutdown,
}

/// Cloneable sending half used by the scheduler and change-source forwarders.
#[derive(Clone)]
struct Notifier {
    commands: mpsc::UnboundedSender<Command>,
    submitted: Arc<AtomicU64>,
}

impl Notifier {
    fn submit(&self, scope: Scope, kind: RebuildKind) -> Result<()> {
        // Counted before sending so an idle wait started afterwards sees it
        self.submitted.fetch_add(1, Ordering::SeqCst);
        if self.commands.send(Command::Notify { scope, kind }).is_err() {
            self.submitted.fetch_sub(1, Ordering::SeqCst);
            return Err(AppSearchError::SchedulerStopped);
        }
        Ok(())
    }
}

/// Coalesces change notifications into index rebuilds.
pub struct UpdateScheduler {
    notifier: Notifier,
    status: watch::Receiver<SchedulerStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl UpdateScheduler {
    /// Start the worker task on the current tokio runtime.
    pub(crate) fn spawn(
        ctx: RebuildContext,
        debounce: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SchedulerStatus::default());

        let worker = Worker {
            ctx,
            debounce,
            commands: commands_rx,
            queue: Vec::new(),
            status: status_tx,
        };
        let handle = tokio::spawn(worker.run());

        info!("Update scheduler started (debounce {:?})", debounce);

        Self {
            notifier: Notifier {
                commands: commands_tx,
                submitted: Arc::new(AtomicU64::new(0)),
            },
            status: status_rx,
            worker: Mutex::new(Some(handle)),
            shutdown_timeout,
        }
    }

    /// Items in `scope` were added or changed. Never blocks.
    pub fn notify_changed(&self, scope: Scope) -> Result<()> {
        self.notifier.submit(scope, RebuildKind::Update)
    }

    /// Items in `scope` were removed. Never blocks.
    pub fn notify_removed(&self, scope: Scope) -> Result<()> {
        self.notifier.submit(scope, RebuildKind::Remove)
    }

    /// Forward events from a host change source until it closes.
    ///
    /// Events with an empty namespace are logged and dropped.
    pub fn attach_change_source(
        &self,
        mut events: mpsc::Receiver<ChangeEvent>,
    ) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let scope = match Scope::namespace(event.namespace()) {
                    Ok(scope) => scope,
                    Err(e) => {
                        warn!("Ignoring change event {:?}: {}", event, e);
                        continue;
                    }
                };
                let kind = if event.is_removal() {
                    RebuildKind::Remove
                } else {
                    RebuildKind::Update
                };
                if notifier.submit(scope, kind).is_err() {
                    debug!("Scheduler stopped, detaching change source");
                    break;
                }
            }
        })
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status.borrow().clone()
    }

    /// Wait until every notification sent so far has been handled and no
    /// task is pending or running.
    pub async fn wait_until_idle(&self) -> Result<()> {
        let target = self.notifier.submitted.load(Ordering::SeqCst);
        let mut status = self.status.clone();
        let stopped = status
            .wait_for(|s| s.stopped || (s.processed >= target && s.is_idle()))
            .await
            .map_err(|_| AppSearchError::SchedulerStopped)?
            .stopped;

        if stopped {
            return Err(AppSearchError::SchedulerStopped);
        }
        Ok(())
    }

    /// Cancel pending work and stop the worker.
    ///
    /// A rebuild already running is given `shutdown_timeout` to finish before
    /// the worker is aborted. Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        let _ = self.notifier.commands.send(Command::Shutdown);

        let Some(mut handle) = self.worker.lock().await.take() else {
            return;
        };

        match tokio::time::timeout(self.shutdown_timeout, &mut handle).await {
            Ok(Ok(())) => info!("Update scheduler stopped"),
            Ok(Err(e)) => error!("Update scheduler task failed: {}", e),
            Err(_) => {
                warn!(
                    "Update scheduler did not stop within {:?}, aborting",
                    self.shutdown_timeout
                );
                handle.abort();
            }
        }
    }
}

struct PendingRebuild {
    scope: Scope,
    kind: RebuildKind,
    due: Instant,
    token: CancellationToken,
}

impl PendingRebuild {
    fn describe(&self) -> QueuedRebuild {
        QueuedRebuild {
            scope: self.scope.clone(),
            kind: self.kind,
        }
    }
}

struct Worker {
    ctx: RebuildContext,
    debounce: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    queue: Vec<PendingRebuild>,
    status: watch::Sender<SchedulerStatus>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let next_due = self.queue.iter().map(|task| task.due).min();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Notify { scope, kind }) => self.enqueue(scope, kind),
                    Some(Command::Shutdown) | None => break,
                },
                _ = wait_until(next_due) => {
                    if let Some(task) = self.take_due() {
                        self.execute(task).await;
                    }
                }
            }
        }

        let dropped = self.queue.len() as u64;
        for task in self.queue.drain(..) {
            task.token.cancel();
        }
        if dropped > 0 {
            debug!("Cancelled {} pending rebuilds on shutdown", dropped);
        }
        self.status.send_modify(|s| {
            s.pending.clear();
            s.superseded = 0;
            s.running = None;
            s.cancelled += dropped;
            s.stopped = true;
        });
    }

    fn enqueue(&mut self, scope: Scope, kind: RebuildKind) {
        // A pending full rebuild already covers any namespace change; fold the
        // notification into a fresh full update so it sees the latest state.
        let all_pending = self.live().any(|t| t.scope.is_all());
        let (scope, kind) = if !scope.is_all() && all_pending {
            debug!("Pending full rebuild absorbs notification for {}", scope);
            (Scope::All, RebuildKind::Update)
        } else {
            (scope, kind)
        };

        let mut superseded = 0;
        for task in self.live().filter(|task| task.scope.intersects(&scope)) {
            task.token.cancel();
            superseded += 1;
        }
        if superseded > 0 {
            debug!("Superseded {} pending rebuilds for {}", superseded, scope);
        }

        self.queue.push(PendingRebuild {
            scope,
            kind,
            due: Instant::now() + self.debounce,
            token: CancellationToken::new(),
        });

        self.publish(|s| s.processed += 1);
    }

    fn take_due(&mut self) -> Option<PendingRebuild> {
        let now = Instant::now();
        let position = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= now)
            .min_by_key(|(_, task)| task.due)
            .map(|(i, _)| i)?;
        Some(self.queue.remove(position))
    }

    async fn execute(&mut self, task: PendingRebuild) {
        // Single cancellation checkpoint, after the debounce wait
        if task.token.is_cancelled() {
            debug!("Rebuild for {} was cancelled before it started", task.scope);
            self.publish(|s| s.cancelled += 1);
            return;
        }

        let running = task.describe();
        self.publish(|s| s.running = Some(running));

        match self.ctx.run(&task.scope, task.kind).await {
            Ok(stats) => {
                info!(
                    "Rebuilt {} ({:?}): {} removed, {} indexed, generation {}",
                    stats.scope, task.kind, stats.removed, stats.indexed, stats.generation
                );
                self.publish(|s| {
                    s.running = None;
                    s.completed += 1;
                    s.last_rebuild_at = Some(Utc::now());
                });
            }
            Err(e) => {
                error!("Rebuild for {} ({:?}) failed: {}", task.scope, task.kind, e);
                self.publish(|s| {
                    s.running = None;
                    s.failed += 1;
                });
            }
        }
    }

    /// Queued tasks that have not been cancelled.
    fn live(&self) -> impl Iterator<Item = &PendingRebuild> {
        self.queue.iter().filter(|task| !task.token.is_cancelled())
    }

    fn publish(&self, update: impl FnOnce(&mut SchedulerStatus)) {
        let pending: Vec<QueuedRebuild> = self.live().map(PendingRebuild::describe).collect();
        let superseded = self.queue.len() - pending.len();
        self.status.send_modify(|s| {
            update(s);
            s.pending = pending;
            s.superseded = superseded;
        });
    }
}

async fn wait_until(due: Option<Instant>) {
    match due {
        Some(due) => sleep_until(due).await,
        None => std::future::pending().await,
    }
}
