//! Progress callbacks for long-running stages.

/// Progress callback for reporting stage status.
///
/// Stages call this alongside their tracing events; the CLI backs it with
/// a spinner, tests with [`SilentProgress`].
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage enters a new phase.
    fn phase(&self, name: &str);
    /// Called once per item as the sweep advances.
    fn item_processed(&self, name: &str, current: usize, total: usize);
}

/// No-op reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_processed(&self, _name: &str, _current: usize, _total: usize) {}
}
