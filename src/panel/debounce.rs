use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::core::DiagramFile;

/// Default edit coalescing window.
pub const DEBOUNCE_MS: u64 = 300;

/// Keeps only the newest pending edit and the time it becomes due.
///
/// Pure timing; the panel decides when a due edit may actually start.
pub(super) struct Debouncer {
    window: Duration,
    pending: Option<DiagramFile>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            deadline: None,
        }
    }

    /// Replace any pending edit and restart the window.
    pub(super) fn push(&mut self, file: DiagramFile) {
        if self.pending.is_some() {
            crate::debug!("panel"; "coalescing edit of {}", file.display_name());
        }
        self.pending = Some(file);
        self.deadline = Some(Instant::now() + self.window);
    }

    pub(super) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Newest pending content, without taking it.
    pub(super) fn peek(&self) -> Option<&DiagramFile> {
        self.pending.as_ref()
    }

    /// Resolves once the window has elapsed (never, if nothing is pending).
    pub(super) async fn wait(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    pub(super) fn take(&mut self) -> Option<DiagramFile> {
        self.deadline = None;
        self.pending.take()
    }

    pub(super) fn clear(&mut self) {
        self.deadline = None;
        self.pending = None;
    }
}
