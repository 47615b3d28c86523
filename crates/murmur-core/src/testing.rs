//! Fakes shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Artifact, Submitter, Task, TaskId};
use crate::error::{SynthesisError, TransportError};
use crate::ports::{ArtifactStore, MemoryProbe, StatusSink, Synthesizer, Transport};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap()
}

pub fn alice() -> Submitter {
    Submitter::new("1", "alice")
}

pub fn task(text: &str) -> Task {
    task_for(text, alice(), Arc::new(RecordingSink::default()))
}

pub fn task_for(text: &str, submitter: Submitter, sink: Arc<dyn StatusSink>) -> Task {
    Task::new(
        TaskId::at(fixed_time()),
        text.to_string(),
        submitter,
        fixed_time(),
        sink,
    )
}

/// Keeps every status line it receives.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            lines: Mutex::default(),
            fail: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn update(&self, text: &str) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Unavailable("message deleted".into()));
        }
        self.lines.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Artifact "files" kept in a map, with a log of removals.
#[derive(Default)]
pub struct MemoryArtifacts {
    files: Mutex<HashMap<PathBuf, u64>>,
    removed: Mutex<Vec<PathBuf>>,
    next: AtomicUsize,
}

impl MemoryArtifacts {
    pub fn put(&self, size: u64) -> Artifact {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let path = PathBuf::from(format!("mem/audio_{n}.wav"));
        self.files.lock().unwrap().insert(path.clone(), size);
        Artifact::new(path)
    }

    pub fn delete_silently(&self, artifact: &Artifact) {
        self.files.lock().unwrap().remove(artifact.path());
    }

    pub fn removals(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

impl ArtifactStore for MemoryArtifacts {
    fn size(&self, artifact: &Artifact) -> Option<u64> {
        self.files.lock().unwrap().get(artifact.path()).copied()
    }

    fn remove(&self, artifact: &Artifact) -> io::Result<()> {
        match self.files.lock().unwrap().remove(artifact.path()) {
            Some(_) => {
                self.removed.lock().unwrap().push(artifact.path().to_path_buf());
                Ok(())
            }
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

/// Transport whose first `failures` deliveries fail.
#[derive(Default)]
pub struct ScriptedTransport {
    failures: AtomicU32,
    attempts: AtomicU32,
    delivered: Mutex<Vec<(Submitter, Artifact)>>,
    notices: Mutex<Vec<(Submitter, String)>>,
}

impl ScriptedTransport {
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<(Submitter, Artifact)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<(Submitter, String)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn deliver(&self, artifact: &Artifact, to: &Submitter) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(TransportError::Send(format!("intentional failure (left={left})")));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((to.clone(), artifact.clone()));
        Ok(())
    }

    async fn notify(&self, to: &Submitter, text: &str) -> Result<(), TransportError> {
        self.notices
            .lock()
            .unwrap()
            .push((to.clone(), text.to_string()));
        Ok(())
    }
}

/// What the scripted synthesizer does on its next call.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Produce,
    Empty,
    Fail,
    Panic,
}

/// Synthesizer that follows a script and records what it was asked to say.
pub struct ScriptedSynth {
    artifacts: Arc<MemoryArtifacts>,
    script: Mutex<VecDeque<Step>>,
    delay: Duration,
    texts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSynth {
    pub fn new(artifacts: Arc<MemoryArtifacts>, delay: Duration, script: &[Step]) -> Self {
        Self {
            artifacts,
            script: Mutex::new(script.iter().copied().collect()),
            delay,
            texts: Mutex::default(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Synthesizer for ScriptedSynth {
    fn synthesize(&self, text: &str) -> Result<Artifact, SynthesisError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        std::thread::sleep(self.delay);

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::Produce);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step {
            Step::Produce => Ok(self.artifacts.put(4096)),
            Step::Empty => Ok(self.artifacts.put(0)),
            Step::Fail => Err(SynthesisError::Failed("engine exploded".into())),
            Step::Panic => panic!("engine panicked"),
        }
    }
}

/// Memory probe returning scripted readings and counting calls.
pub struct CountingProbe {
    readings: Mutex<VecDeque<Option<f64>>>,
    calls: AtomicUsize,
}

impl CountingProbe {
    pub fn new(readings: &[Option<f64>]) -> Self {
        Self {
            readings: Mutex::new(readings.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MemoryProbe for CountingProbe {
    fn resident_mb(&self) -> Option<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.readings.lock().unwrap().pop_front().flatten()
    }
}
