use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartBatch {
        urls: Vec<String>,
        worker_count: usize,
        timeout: Duration,
    },
    StopBatch,
}
