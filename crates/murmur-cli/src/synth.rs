//! CommandSynthesizer - runs an external TTS engine per request.

use std::path::{Path, PathBuf};
use std::process::Command;

use murmur_core::SynthesisError;
use murmur_core::domain::Artifact;
use murmur_core::impls::LocalArtifactStore;
use murmur_core::ports::Synthesizer;
use tracing::{debug, warn};

pub struct CommandSynthesizer {
    argv: Vec<String>,
    voice: PathBuf,
    store: LocalArtifactStore,
}

impl CommandSynthesizer {
    pub fn new(argv: Vec<String>, voice: PathBuf, store: LocalArtifactStore) -> Self {
        Self { argv, voice, store }
    }

    fn render(&self, text: &str, output: &str) -> Vec<String> {
        let voice = self.voice.display().to_string();
        self.argv
            .iter()
            .map(|arg| {
                arg.replace("{text}", text)
                    .replace("{voice}", &voice)
                    .replace("{output}", output)
            })
            .collect()
    }
}

/// Line breaks become spaces; engines read one utterance per call.
fn normalize(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Remove whatever a failed run left at `output`.
fn discard_partial(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => debug!(path = %output.display(), "partial output removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %output.display(), error = %e, "could not remove partial output"),
    }
}

impl Synthesizer for CommandSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Artifact, SynthesisError> {
        let output = self.store.next_path();
        let argv = self.render(&normalize(text), &output.display().to_string());
        let Some((program, args)) = argv.split_first() else {
            return Err(SynthesisError::Failed("empty synthesis command".to_string()));
        };

        debug!(program = %program, output = %output.display(), "running synthesis command");
        let result = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| SynthesisError::Failed(format!("{program}: {e}")))?;

        if !result.status.success() {
            discard_partial(&output);
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SynthesisError::Failed(format!(
                "{program} exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        Ok(Artifact::new(output))
    }
}
