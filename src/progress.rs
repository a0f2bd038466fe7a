// src/progress.rs
/// Progress reporting for long-running collection (per-row fetchers, the place catalog).
/// The CLI implements this to print a counter; log lines go through `tracing` regardless.
pub trait Progress {
    /// Called at the start with the number of rows still to fetch.
    fn begin(&mut self, _concern: &str, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One row (or one state) was collected.
    fn item_done(&mut self, _label: &str) {}

    /// One row ended up `Errored`.
    fn item_failed(&mut self, _label: &str, _error: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
