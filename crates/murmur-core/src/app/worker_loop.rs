//! WorkerLoop - single-concurrency task processor.
//!
//! # Flow (per task)
//! 1. `BoundedQueue::begin_next()` moves the head task into the in-flight slot
//! 2. the task's sink is told processing started
//! 3. the synthesizer runs on a blocking thread; the loop polls for completion
//! 4. the artifact goes to delivery, or the submitter hears about the failure
//! 5. the in-flight slot is cleared and every pending task gets its new position
//!
//! Steps 2-4 run in their own tokio task, so a panic there only ends that task.
//! Status lines the loop sends itself (fault notice, new positions) are
//! isolated the same way.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::delivery::{ArtifactGuard, Deliverer};
use super::messages;
use crate::domain::{Artifact, DeliveryOutcome, Task, TaskOutcome};
use crate::error::SynthesisError;
use crate::ports::Synthesizer;
use crate::queue::{BoundedQueue, QueueSnapshot};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct WorkerLoop {
    queue: Arc<BoundedQueue>,
    synthesizer: Arc<dyn Synthesizer>,
    deliverer: Deliverer,
    poll_interval: Duration,
}

/// Loop ownership held by a running `drain`. Dropping it while still armed
/// (runtime shutdown cancelling the loop) hands the queue back and clears the
/// busy slot.
struct Ownership<'a> {
    queue: &'a BoundedQueue,
    armed: bool,
}

impl Drop for Ownership<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("worker loop exited abnormally, releasing queue");
            self.queue.release_loop();
        }
    }
}

impl WorkerLoop {
    pub fn new(
        queue: Arc<BoundedQueue>,
        synthesizer: Arc<dyn Synthesizer>,
        deliverer: Deliverer,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            synthesizer,
            deliverer,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    /// Spawn a drain. The caller must already own the loop
    /// (`Admission::start_worker` or `BoundedQueue::try_restart`).
    pub(crate) fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let worker = Arc::clone(self);
        tokio::spawn(async move { worker.drain().await })
    }

    /// Restart the loop if work is pending and no loop is running.
    pub fn recover(self: &Arc<Self>) -> bool {
        if !self.queue.try_restart() {
            return false;
        }
        info!("restarting worker loop");
        self.spawn();
        true
    }

    async fn drain(self: Arc<Self>) {
        let mut ownership = Ownership {
            queue: &self.queue,
            armed: true,
        };
        info!("worker loop draining");

        while let Some(task) = self.queue.begin_next() {
            let started = Instant::now();
            let outcome = match tokio::spawn(Arc::clone(&self).process(Arc::clone(&task))).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(task_id = %task.id(), error = %e, "task processing faulted");
                    report_isolated(&task, messages::TASK_FAULTED.to_string()).await;
                    TaskOutcome::Faulted
                }
            };
            info!(
                task_id = %task.id(),
                outcome = ?outcome,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "task finished"
            );

            let remaining = self.queue.finish_current();
            broadcast_positions(&remaining).await;
        }

        // begin_next() already gave ownership back under the lock.
        ownership.armed = false;
        info!("worker loop idle");
    }

    async fn process(self: Arc<Self>, task: Arc<Task>) -> TaskOutcome {
        info!(task_id = %task.id(), submitter = %task.submitter(), "processing started");
        task.report(messages::PROCESSING_STARTED).await;

        let artifact = match self.generate(task.text()).await {
            Ok(artifact) => ArtifactGuard::new(artifact, Arc::clone(self.deliverer.store())),
            Err(e) => return generation_failed(&task, e).await,
        };

        if !matches!(artifact.size(), Some(size) if size > 0) {
            let e = SynthesisError::EmptyArtifact(artifact.artifact().path().to_path_buf());
            return generation_failed(&task, e).await;
        }

        task.report(messages::GENERATED_SENDING).await;
        let outcome = self.deliverer.deliver(artifact, &task).await;
        if let DeliveryOutcome::Delivered { .. } = outcome {
            task.report(messages::SENT).await;
        }
        outcome.into()
    }

    /// Run the synthesizer on a blocking thread and poll until it is done.
    async fn generate(&self, text: &str) -> Result<Artifact, SynthesisError> {
        let synthesizer = Arc::clone(&self.synthesizer);
        let text = text.to_owned();
        let handle = tokio::task::spawn_blocking(move || synthesizer.synthesize(&text));

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !handle.is_finished() {
            ticker.tick().await;
        }

        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(SynthesisError::Panicked),
            Err(e) => Err(SynthesisError::Failed(e.to_string())),
        }
    }
}

async fn generation_failed(task: &Task, e: SynthesisError) -> TaskOutcome {
    warn!(task_id = %task.id(), error = %e, "generation failed");
    task.report(messages::GENERATION_FAILED).await;
    TaskOutcome::GenerationFailed(e.to_string())
}

/// Push a status line from the drain task itself.
///
/// Runs in its own tokio task so a panicking sink cannot end the loop.
async fn report_isolated(task: &Arc<Task>, text: String) {
    let target = Arc::clone(task);
    if let Err(e) = tokio::spawn(async move { target.report(&text).await }).await {
        warn!(task_id = %task.id(), error = %e, "status sink faulted");
    }
}

/// Tell every pending task where it stands now.
async fn broadcast_positions(snapshot: &QueueSnapshot) {
    let total = snapshot.occupied();
    for (position, task) in snapshot.positions() {
        report_isolated(task, messages::waiting(position, total)).await;
    }
}
