//! Dispatcher - what the chat transport calls.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::messages;
use super::rate_limit::RateLimiter;
use super::status::StatusReporter;
use super::worker_loop::WorkerLoop;
use crate::config::QueueConfig;
use crate::domain::{Submitter, Task, TaskId};
use crate::error::SubmitError;
use crate::ports::{Clock, StatusSink, Transport};
use crate::queue::{BoundedQueue, QueueSnapshot};

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub task_id: TaskId,
    /// 1-based, counting the task in flight.
    pub position: usize,
    /// The text was cut down to `max_text_length` characters.
    pub truncated: bool,
}

impl Receipt {
    /// Reply text for the submitter.
    pub fn message(&self) -> String {
        messages::queued(self.position)
    }
}

/// Owns the queue and the worker loop. One per process, shared by handle.
pub struct Dispatcher {
    config: QueueConfig,
    queue: Arc<BoundedQueue>,
    worker: Arc<WorkerLoop>,
    reporter: StatusReporter,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    limiter: Option<RateLimiter>,
}

impl Dispatcher {
    pub(crate) fn from_parts(
        config: QueueConfig,
        queue: Arc<BoundedQueue>,
        worker: Arc<WorkerLoop>,
        reporter: StatusReporter,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        limiter: Option<RateLimiter>,
    ) -> Self {
        Self {
            config,
            queue,
            worker,
            reporter,
            transport,
            clock,
            limiter,
        }
    }

    /// Validate, truncate and enqueue one request.
    ///
    /// Rejections leave no trace in the queue. Truncation is not an error:
    /// the submitter is told and the task is still enqueued.
    pub async fn submit(
        &self,
        text: &str,
        submitter: Submitter,
        sink: Arc<dyn StatusSink>,
    ) -> Result<Receipt, SubmitError> {
        let length = text.chars().count();
        if length < self.config.min_text_length {
            return Err(SubmitError::TooShort {
                min: self.config.min_text_length,
                actual: length,
            });
        }
        if let Some(limiter) = &self.limiter
            && !limiter.allow()
        {
            warn!(submitter = %submitter, "submission rate limited");
            return Err(SubmitError::RateLimited);
        }

        let (text, truncated) = truncate_chars(text, self.config.max_text_length);
        let now = self.clock.now();
        let task = Task::new(TaskId::at(now), text, submitter.clone(), now, sink);

        let admission = match self.queue.admit(task) {
            Ok(admission) => admission,
            Err(e) => {
                info!(submitter = %submitter, error = %e, "submission rejected");
                return Err(e);
            }
        };
        let receipt = Receipt {
            task_id: admission.task.id(),
            position: admission.position,
            truncated,
        };
        info!(
            task_id = %receipt.task_id,
            submitter = %submitter,
            position = receipt.position,
            truncated,
            "task admitted"
        );

        if admission.start_worker {
            self.worker.spawn();
        }

        if truncated {
            let notice = messages::truncated(length, self.config.max_text_length);
            if let Err(e) = self.transport.notify(&submitter, &notice).await {
                warn!(task_id = %receipt.task_id, error = %e, "truncation notice failed");
            }
        }

        Ok(receipt)
    }

    /// Reply text for a rejected submission.
    pub fn rejection_message(&self, err: &SubmitError) -> String {
        match err {
            SubmitError::TooShort { min, .. } => messages::too_short(*min),
            SubmitError::QueueFull { capacity } => messages::queue_full(*capacity),
            SubmitError::RateLimited => messages::RATE_LIMITED.to_string(),
        }
    }

    pub fn status(&self) -> String {
        self.reporter.report()
    }

    pub fn welcome(&self, submitter: &Submitter) -> String {
        format!(
            "👋 Hi, {name}!\n\n\
             🎙 I turn text into speech with a cloned voice.\n\n\
             How to use:\n\
             - Send /gen followed by the text to synthesize\n\
             - Use /status to check the system state\n\n\
             Limits:\n\
             - Minimum text length: {min} characters\n\
             - Maximum text length: {max} characters\n\
             - Maximum tasks in the queue: {capacity}\n\n\
             Current queue status:\n\
             {summary}",
            name = submitter.display_name,
            min = self.config.min_text_length,
            max = self.config.max_text_length,
            capacity = self.config.max_queue_size,
            summary = self.reporter.summary(),
        )
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    /// Fault hook for errors surfaced by the transport.
    ///
    /// Tells the submitter (if known), clears a busy flag that no loop owns,
    /// and restarts the loop when work is pending but nothing drains it.
    pub async fn on_fault(
        &self,
        fault: &(dyn std::error::Error + Send + Sync),
        submitter: Option<&Submitter>,
    ) {
        error!(error = %fault, "unhandled fault");

        if let Some(submitter) = submitter
            && let Err(e) = self.transport.notify(submitter, messages::FAULT_NOTICE).await
        {
            warn!(submitter = %submitter, error = %e, "fault notice failed");
        }

        if self.queue.clear_stale_busy() {
            warn!("cleared stale busy flag");
        }
        self.worker.recover();
    }

    /// Resolves once the worker loop is idle.
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }
}

/// First `max` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((end, _)) => (text[..end].to_string(), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DispatcherBuilder;
    use crate::config::RateLimitConfig;
    use crate::ports::FixedClock;
    use crate::ports::memory::NoMemoryProbe;
    use crate::queue::LoopState;
    use crate::testing::{
        MemoryArtifacts, RecordingSink, ScriptedSynth, ScriptedTransport, Step, alice, fixed_time,
        task,
    };
    use rstest::rstest;
    use std::time::Duration;

    struct Fixture {
        dispatcher: Dispatcher,
        synth: Arc<ScriptedSynth>,
        transport: Arc<ScriptedTransport>,
        _voice: tempfile::NamedTempFile,
    }

    fn fixture(capacity: usize, script: &[Step], delay: Duration) -> Fixture {
        fixture_with(capacity, script, delay, |_| {})
    }

    fn fixture_with(
        capacity: usize,
        script: &[Step],
        delay: Duration,
        tweak: impl FnOnce(&mut QueueConfig),
    ) -> Fixture {
        let voice = tempfile::NamedTempFile::new().unwrap();
        let mut config = QueueConfig::new(20, 3, capacity, voice.path());
        config.poll_interval_ms = 2;
        config.delivery_backoff_ms = 1;
        tweak(&mut config);

        let store = Arc::new(MemoryArtifacts::default());
        let synth = Arc::new(ScriptedSynth::new(store.clone(), delay, script));
        let transport = Arc::new(ScriptedTransport::default());
        let dispatcher = DispatcherBuilder::new(config)
            .synthesizer(synth.clone())
            .transport(transport.clone())
            .artifacts(store)
            .clock(Arc::new(FixedClock::new(fixed_time())))
            .memory_probe(Arc::new(NoMemoryProbe))
            .build()
            .unwrap();
        Fixture {
            dispatcher,
            synth,
            transport,
            _voice: voice,
        }
    }

    fn sink() -> Arc<RecordingSink> {
        Arc::new(RecordingSink::default())
    }

    async fn settle(dispatcher: &Dispatcher) {
        tokio::time::timeout(Duration::from_secs(5), dispatcher.wait_idle())
            .await
            .expect("queue drained");
    }

    #[tokio::test]
    async fn third_submission_is_rejected_when_two_slots_are_taken() {
        let f = fixture(2, &[], Duration::from_millis(200));
        let d = &f.dispatcher;

        let first = d.submit("first text", alice(), sink()).await.unwrap();
        let second = d.submit("second text", alice(), sink()).await.unwrap();
        let third = d.submit("third text", alice(), sink()).await;

        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
        assert_eq!(third, Err(SubmitError::QueueFull { capacity: 2 }));
        assert_eq!(d.snapshot().occupied(), 2);

        settle(d).await;
        assert_eq!(f.synth.texts(), ["first text", "second text"]);
    }

    #[tokio::test]
    async fn long_text_is_truncated_and_still_enqueued() {
        let f = fixture(2, &[], Duration::ZERO);
        let long: String = "й".repeat(20 + 50);

        let receipt = f.dispatcher.submit(&long, alice(), sink()).await.unwrap();
        assert!(receipt.truncated);
        settle(&f.dispatcher).await;

        let texts = f.synth.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].chars().count(), 20);
        assert_eq!(
            f.transport.notices(),
            vec![(alice(), messages::truncated(70, 20))]
        );
    }

    #[tokio::test]
    async fn text_at_the_limit_is_not_truncated() {
        let f = fixture(2, &[], Duration::ZERO);
        let receipt = f
            .dispatcher
            .submit(&"a".repeat(20), alice(), sink())
            .await
            .unwrap();
        assert!(!receipt.truncated);
        settle(&f.dispatcher).await;
        assert!(f.transport.notices().is_empty());
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::two_chars("ab", 2)]
    #[case::two_wide_chars("ёж", 2)]
    #[tokio::test]
    async fn short_text_is_rejected_before_enqueue(#[case] text: &str, #[case] actual: usize) {
        let f = fixture(2, &[], Duration::ZERO);

        let result = f.dispatcher.submit(text, alice(), sink()).await;

        assert_eq!(result, Err(SubmitError::TooShort { min: 3, actual }));
        assert_eq!(f.dispatcher.snapshot().occupied(), 0);
        assert_eq!(f.dispatcher.queue.loop_state(), LoopState::Idle);
        assert!(f.synth.texts().is_empty());
    }

    #[tokio::test]
    async fn empty_artifact_reports_failure_and_queue_keeps_going() {
        let f = fixture(3, &[Step::Empty, Step::Produce], Duration::from_millis(5));
        let failing = sink();
        let next = sink();

        f.dispatcher.submit("first text", alice(), failing.clone()).await.unwrap();
        f.dispatcher.submit("second text", alice(), next.clone()).await.unwrap();
        settle(&f.dispatcher).await;

        assert_eq!(failing.last().as_deref(), Some(messages::GENERATION_FAILED));
        assert_eq!(next.last().as_deref(), Some(messages::SENT));
        assert!(!f.dispatcher.snapshot().is_busy());
    }

    #[tokio::test]
    async fn rate_limit_applies_only_when_configured() {
        let f = fixture_with(5, &[], Duration::ZERO, |c| {
            c.rate_limit = Some(RateLimitConfig {
                max_requests: 1,
                period_secs: 60,
            });
        });

        f.dispatcher.submit("first text", alice(), sink()).await.unwrap();
        assert_eq!(
            f.dispatcher.submit("second text", alice(), sink()).await,
            Err(SubmitError::RateLimited)
        );
        settle(&f.dispatcher).await;

        let unlimited = fixture(5, &[], Duration::ZERO);
        for _ in 0..3 {
            unlimited.dispatcher.submit("some text", alice(), sink()).await.unwrap();
        }
        settle(&unlimited.dispatcher).await;
    }

    #[tokio::test]
    async fn fault_hook_clears_stale_busy_and_restarts_the_loop() {
        let f = fixture(3, &[], Duration::ZERO);
        let d = &f.dispatcher;

        // a loop died and left its flag behind, with work still queued
        let waiting = sink();
        d.queue
            .admit(crate::testing::task_for("left behind", alice(), waiting.clone()))
            .unwrap();
        d.queue.release_loop();
        d.queue.force_stale_busy(task("stuck"));

        let fault = std::io::Error::other("update handler crashed");
        d.on_fault(&fault, Some(&alice())).await;
        settle(d).await;

        assert_eq!(waiting.last().as_deref(), Some(messages::SENT));
        assert!(!d.snapshot().is_busy());
        assert_eq!(
            f.transport.notices(),
            vec![(alice(), messages::FAULT_NOTICE.to_string())]
        );
    }

    #[tokio::test]
    async fn fault_hook_without_pending_work_does_not_start_a_loop() {
        let f = fixture(3, &[], Duration::ZERO);
        let fault = std::io::Error::other("polling failed");
        f.dispatcher.on_fault(&fault, None).await;

        assert_eq!(f.dispatcher.queue.loop_state(), LoopState::Idle);
        assert!(f.transport.notices().is_empty());
    }

    #[tokio::test]
    async fn welcome_includes_limits_and_queue_summary() {
        let f = fixture(4, &[], Duration::ZERO);
        let text = f.dispatcher.welcome(&alice());

        assert!(text.starts_with("👋 Hi, alice!"));
        assert!(text.contains("Minimum text length: 3 characters"));
        assert!(text.contains("Maximum text length: 20 characters"));
        assert!(text.contains("Maximum tasks in the queue: 4"));
        assert!(text.ends_with("📋 Queue is empty (4 slots available)"));
    }

    #[test]
    fn rejection_messages() {
        let f = fixture(4, &[], Duration::ZERO);
        let d = &f.dispatcher;
        assert_eq!(
            d.rejection_message(&SubmitError::TooShort { min: 3, actual: 1 }),
            messages::too_short(3)
        );
        assert_eq!(
            d.rejection_message(&SubmitError::QueueFull { capacity: 4 }),
            messages::queue_full(4)
        );
    }

    #[rstest]
    #[case::ascii("hello", 3, "hel", true)]
    #[case::exact("hello", 5, "hello", false)]
    #[case::shorter("hi", 5, "hi", false)]
    #[case::multibyte("привет", 4, "прив", true)]
    fn truncates_by_characters(
        #[case] text: &str,
        #[case] max: usize,
        #[case] expected: &str,
        #[case] cut: bool,
    ) {
        assert_eq!(truncate_chars(text, max), (expected.to_string(), cut));
    }
}
