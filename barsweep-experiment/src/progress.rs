use barsweep_toolbox::{release_toolbox_progress, silence_toolbox_progress};
use tracing::info;

/// Silences toolbox progress until dropped. Guards are counted, so
/// overlapping runs may end in any order.
#[must_use = "the override is undone as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ProgressOverride {
    _private: (),
}

impl ProgressOverride {
    pub fn silence() -> Self {
        silence_toolbox_progress();
        Self { _private: () }
    }
}

impl Drop for ProgressOverride {
    fn drop(&mut self) {
        release_toolbox_progress();
    }
}

/// Logs frame-loop progress in 10% steps.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    next_decile: usize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total: usize, enabled: bool) -> Self {
        Self {
            total,
            next_decile: 1,
            enabled,
        }
    }

    /// Record that frame `done` (1-based) finished. Returns the percentage
    /// when a new 10% step was crossed.
    pub fn tick(&mut self, done: usize) -> Option<usize> {
        if self.total == 0 || self.next_decile > 10 {
            return None;
        }
        let pct = done * 100 / self.total;
        if pct < self.next_decile * 10 {
            return None;
        }
        self.next_decile = pct / 10 + 1;
        if self.enabled {
            info!("computing cone responses: {}% ({}/{})", pct, done, self.total);
        }
        Some(pct)
    }
}
