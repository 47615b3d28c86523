//! DispatcherBuilder - wiring and startup validation.
//!
//! Fail-fast: `build()` validates the configuration (including the voice
//! reference on disk) and refuses to produce a dispatcher with a missing
//! collaborator.

use std::sync::Arc;

use super::delivery::{Deliverer, RetryPolicy};
use super::dispatcher::Dispatcher;
use super::rate_limit::RateLimiter;
use super::status::{MemoryGauge, StatusReporter};
use super::worker_loop::WorkerLoop;
use crate::config::QueueConfig;
use crate::error::ConfigError;
use crate::impls::ProcStatusProbe;
use crate::ports::{ArtifactStore, Clock, MemoryProbe, Synthesizer, SystemClock, Transport};
use crate::queue::BoundedQueue;

/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new(config)
///     .synthesizer(engine)
///     .transport(chat)
///     .artifacts(store)
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    config: QueueConfig,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    transport: Option<Arc<dyn Transport>>,
    artifacts: Option<Arc<dyn ArtifactStore>>,
    clock: Arc<dyn Clock>,
    memory: Arc<dyn MemoryProbe>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing component: {0}. Register it before calling build().")]
    MissingComponent(&'static str),
}

impl DispatcherBuilder {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            synthesizer: None,
            transport: None,
            artifacts: None,
            clock: Arc::new(SystemClock),
            memory: Arc::new(ProcStatusProbe),
        }
    }

    pub fn synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn artifacts(mut self, artifacts: Arc<dyn ArtifactStore>) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn memory_probe(mut self, memory: Arc<dyn MemoryProbe>) -> Self {
        self.memory = memory;
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        self.config.validate()?;
        let synthesizer = self
            .synthesizer
            .ok_or(BuildError::MissingComponent("synthesizer"))?;
        let transport = self
            .transport
            .ok_or(BuildError::MissingComponent("transport"))?;
        let artifacts = self
            .artifacts
            .ok_or(BuildError::MissingComponent("artifact store"))?;

        let queue = Arc::new(BoundedQueue::new(self.config.max_queue_size));
        let deliverer = Deliverer::new(
            Arc::clone(&transport),
            artifacts,
            RetryPolicy::from_config(&self.config),
        );
        let worker = Arc::new(WorkerLoop::new(
            Arc::clone(&queue),
            synthesizer,
            deliverer,
            self.config.poll_interval(),
        ));
        let reporter = StatusReporter::new(
            Arc::clone(&queue),
            MemoryGauge::new(self.memory, self.config.memory_refresh()),
        );
        let limiter = self.config.rate_limit.as_ref().map(RateLimiter::from_config);

        Ok(Dispatcher::from_parts(
            self.config,
            queue,
            worker,
            reporter,
            transport,
            self.clock,
            limiter,
        ))
    }
}
