use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use checker_logging::{checker_debug, checker_error, checker_info};

use crate::{
    BatchId, BatchSummary, EngineEvent, Phase, Prober, ResultEvent, StatusEvent, WorkItem,
};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        // The consumer may have gone away; workers keep draining regardless.
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
    Stopped,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Completed | WorkerState::Stopped)
    }
}

/// Counters shared by every worker of one batch.
///
/// `active_workers` follows Running/terminal transitions. Completion is keyed
/// on `remaining_workers`, which starts at the number of workers launched, so
/// a fast worker finishing before a slow one has started cannot end the batch.
#[derive(Debug)]
pub struct BatchTracker {
    batch_id: BatchId,
    total_items: usize,
    completed_items: AtomicUsize,
    active_workers: AtomicUsize,
    remaining_workers: AtomicUsize,
    stopped: AtomicBool,
}

impl BatchTracker {
    pub fn new(batch_id: BatchId, total_items: usize, worker_count: usize) -> Self {
        Self {
            batch_id,
            total_items,
            completed_items: AtomicUsize::new(0),
            active_workers: AtomicUsize::new(0),
            remaining_workers: AtomicUsize::new(worker_count),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn completed_items(&self) -> usize {
        self.completed_items.load(Ordering::SeqCst)
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_workers.load(Ordering::SeqCst) == 0
    }

    /// Fraction of items with a result, in `[0.0, 1.0]`. An empty batch counts
    /// as fully done.
    pub fn progress(&self) -> f64 {
        if self.total_items == 0 {
            return 1.0;
        }
        self.completed_items() as f64 / self.total_items as f64
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            batch_id: self.batch_id,
            total_items: self.total_items,
            completed_items: self.completed_items(),
            stopped: self.stopped.load(Ordering::SeqCst),
        }
    }

    fn worker_started(&self) {
        self.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    fn item_completed(&self) {
        let total = self.total_items;
        let _ = self
            .completed_items
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |done| {
                (done < total).then_some(done + 1)
            });
    }

    /// Records a terminal transition. Returns the batch summary when this was
    /// the last outstanding worker.
    fn worker_finished(&self, state: WorkerState) -> Option<BatchSummary> {
        if state == WorkerState::Stopped {
            self.stopped.store(true, Ordering::SeqCst);
        }
        if decrement(&self.active_workers).is_none() {
            checker_error!("batch {}: active worker count underflow", self.batch_id);
        }
        match decrement(&self.remaining_workers) {
            Some(0) => Some(self.summary()),
            Some(_) => None,
            None => {
                checker_error!("batch {}: worker finished twice", self.batch_id);
                None
            }
        }
    }
}

/// Decrements without wrapping; returns the new value.
fn decrement(counter: &AtomicUsize) -> Option<usize> {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .ok()
        .map(|previous| previous - 1)
}

/// Drains one partition in order.
///
/// The stop flag is checked between items only: a probe already in flight
/// runs to its own timeout before the worker halts.
pub struct WorkerUnit {
    id: usize,
    items: Vec<WorkItem>,
    timeout: Duration,
    stop: Arc<AtomicBool>,
    state: WorkerState,
}

impl WorkerUnit {
    pub fn new(id: usize, items: Vec<WorkItem>, timeout: Duration, stop: Arc<AtomicBool>) -> Self {
        Self {
            id,
            items,
            timeout,
            stop,
            state: WorkerState::Idle,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn pending_items(&self) -> usize {
        self.items.len()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub async fn run(
        &mut self,
        prober: &dyn Prober,
        sink: &dyn EventSink,
        tracker: &BatchTracker,
    ) -> WorkerState {
        if self.state != WorkerState::Idle {
            return self.state;
        }
        self.state = WorkerState::Running;
        tracker.worker_started();
        let batch_id = tracker.batch_id();
        checker_debug!(
            "batch {} worker {} running with {} items",
            batch_id,
            self.id,
            self.items.len()
        );

        let items = std::mem::take(&mut self.items);
        let mut remaining = items.into_iter();
        let mut stopped = false;
        for item in remaining.by_ref() {
            if self.stop.load(Ordering::SeqCst) {
                stopped = true;
                // Put the untouched item back so `pending_items` stays honest.
                self.items.push(item);
                break;
            }
            sink.emit(EngineEvent::Status(StatusEvent {
                batch_id,
                index: item.index,
                phase: Phase::Checking,
            }));

            let outcome = prober.probe(&item.url, self.timeout).await;
            if let Some(message) = outcome.error_message() {
                checker_debug!("{} failed: {}", item.url, message);
            }

            tracker.item_completed();
            sink.emit(EngineEvent::Result(ResultEvent {
                batch_id,
                index: item.index,
                url: item.url,
                alive: outcome.alive,
                status_code: outcome.status_code,
            }));
            sink.emit(EngineEvent::Status(StatusEvent {
                batch_id,
                index: item.index,
                phase: Phase::Done,
            }));
        }
        self.items.extend(remaining);

        self.state = if stopped {
            WorkerState::Stopped
        } else {
            WorkerState::Completed
        };
        checker_debug!(
            "batch {} worker {} finished as {:?}",
            batch_id,
            self.id,
            self.state
        );

        if let Some(summary) = tracker.worker_finished(self.state) {
            checker_info!(
                "batch {} complete: {}/{} checked{}",
                summary.batch_id,
                summary.completed_items,
                summary.total_items,
                if summary.stopped { " (stopped)" } else { "" }
            );
            sink.emit(EngineEvent::BatchCompleted(summary));
        }
        self.state
    }
}
