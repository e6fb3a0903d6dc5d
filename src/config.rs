//! Client configuration.

use std::time::Duration;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/generate-stream";

/// Bounds on an acceptable prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    /// Minimum trimmed length, in characters.
    pub min_chars: usize,
    /// Maximum trimmed length, in characters.
    pub max_chars: usize,
    /// Length at which the gauge starts warning.
    pub warn_chars: usize,
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            min_chars: 10,
            max_chars: 800,
            warn_chars: 700,
        }
    }
}

impl PromptLimits {
    /// Return the trimmed prompt if it may be submitted.
    pub fn accept<'a>(&self, prompt: &'a str) -> Option<&'a str> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return None;
        }
        let len = trimmed.chars().count();
        (self.min_chars..=self.max_chars)
            .contains(&len)
            .then_some(trimmed)
    }
}

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Generation endpoint.
    pub endpoint: String,
    /// Target display refresh rate.
    pub target_fps: u32,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Overall timeout for a request; `None` lets a stream run indefinitely.
    pub read_timeout: Option<Duration>,
    /// Maximum bytes read from the body per chunk.
    pub chunk_size: usize,
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// Prompt bounds.
    pub limits: PromptLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            target_fps: 60,
            connect_timeout: Duration::from_secs(10),
            read_timeout: None,
            chunk_size: 8192,
            input_poll_timeout: Duration::from_millis(10),
            limits: PromptLimits::default(),
        }
    }
}

impl ClientConfig {
    /// Time between display ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}
