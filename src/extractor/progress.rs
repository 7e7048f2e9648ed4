/// Advisory per-batch progress notifications.
///
/// The orchestrator calls `batch_started` once at the start of every batch,
/// in batch order. The callback is outside the functional contract: it must
/// not block and nothing is retried or rolled back around it. Hosts plug in
/// whatever sink fits (a progress bar, a log line); the library itself
/// stays silent by default.
pub trait ProgressSink: Sync {
    fn batch_started(&self, batch_index: usize, batch_count: usize);
}

/// Default sink: reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn batch_started(&self, _batch_index: usize, _batch_count: usize) {}
}
