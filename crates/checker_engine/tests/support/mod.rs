#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use checker_engine::{
    BatchId, BatchSummary, Coordinator, EngineEvent, ProbeError, ProbeFailure, ProbeOutcome,
    Prober,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(checker_logging::initialize_for_tests);
}

/// Scripted prober: unknown URLs answer 200 unless told otherwise.
#[derive(Default)]
pub struct MockProber {
    outcomes: HashMap<String, ProbeOutcome>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    trip_on_first_call: Mutex<Option<Arc<AtomicBool>>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, url: &str, code: u16) -> Self {
        self.outcomes
            .insert(url.to_string(), ProbeOutcome::from_status(code, &[200, 301]));
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.outcomes.insert(
            url.to_string(),
            ProbeOutcome::failed(ProbeError::new(ProbeFailure::Timeout, "timed out")),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets `flag` while the first probe is in flight.
    pub fn tripping(self, flag: Arc<AtomicBool>) -> Self {
        *self.trip_on_first_call.lock().unwrap() = Some(flag);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Prober for MockProber {
    async fn probe(&self, url: &str, _timeout: Duration) -> ProbeOutcome {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(flag) = self.trip_on_first_call.lock().unwrap().take() {
            flag.store(true, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcomes
            .get(url)
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::from_status(200, &[200, 301]))
    }
}

pub fn urls(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("http://host{i}.test/")).collect()
}

/// Collects events until `batch_id` completes. Panics after ten seconds.
pub fn drain_batch(coordinator: &Coordinator, batch_id: BatchId) -> (Vec<EngineEvent>, BatchSummary) {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut events = Vec::new();
    while Instant::now() < deadline {
        let Some(event) = coordinator.recv_timeout(Duration::from_millis(50)) else {
            continue;
        };
        if event.batch_id() != batch_id {
            continue;
        }
        if let EngineEvent::BatchCompleted(summary) = event {
            return (events, summary);
        }
        events.push(event);
    }
    panic!("batch {batch_id} did not complete in time");
}
