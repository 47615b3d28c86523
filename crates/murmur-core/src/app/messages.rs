//! Texts pushed to submitters.

pub const PROCESSING_STARTED: &str = "⏳ Starting audio generation...";
pub const GENERATED_SENDING: &str = "✅ Audio generated, sending...";
pub const SENT: &str = "✅ Audio sent!";
pub const GENERATION_FAILED: &str = "🚫 Audio generation failed.";
pub const ARTIFACT_MISSING: &str = "🚫 Audio file to send was not found.";
pub const DELIVERY_FAILED: &str = "🚫 Could not send the audio file.";
pub const TASK_FAULTED: &str = "🚫 An error occurred while processing the task.";
pub const FAULT_NOTICE: &str = "🚨 An error occurred. Please try again later.";

pub fn queued(position: usize) -> String {
    format!("⏳ Task added to the queue. Position: {position}.")
}

pub fn waiting(position: usize, total: usize) -> String {
    format!("⏳ Waiting in queue. Position: {position} of {total}.")
}

pub fn truncated(original: usize, max: usize) -> String {
    format!("⚠️ Your text was truncated from {original} to {max} characters.")
}

pub fn too_short(min: usize) -> String {
    format!("📝 At least {min} characters are required.")
}

pub fn queue_full(capacity: usize) -> String {
    format!(
        "🔴 The queue is full (at most {capacity} tasks). \
         Please try again later or check /status."
    )
}

pub const RATE_LIMITED: &str = "⚠️ Too many requests. Please wait a little.";
