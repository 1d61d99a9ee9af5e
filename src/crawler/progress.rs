//! Human-readable progress reporting
//!
//! Every message goes to `tracing` at the given level and, when a callback is
//! installed, to the callback as a plain string.

use std::fmt;
use std::sync::Arc;

/// Callback receiving one progress message at a time
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Progress channel for a single run
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl Progress {
    /// A channel that only logs
    pub fn silent() -> Self {
        Self::default()
    }

    /// A channel that logs and forwards to `callback`
    pub fn with_callback(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!("{}", message);
        self.forward(message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!("{}", message);
        self.forward(message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::error!("{}", message);
        self.forward(message);
    }

    fn forward(&self, message: &str) {
        if let Some(callback) = &self.callback {
            callback(message);
        }
    }
}
