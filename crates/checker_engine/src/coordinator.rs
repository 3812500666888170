use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use checker_logging::{checker_info, checker_warn};

use crate::partition::{partition, split_items};
use crate::probe::{ProbeSettings, Prober, ReqwestProber};
use crate::worker::{BatchTracker, ChannelEventSink, WorkerUnit};
use crate::{BatchId, EngineError, EngineEvent};

pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub worker_count: usize,
    /// Per-request timeout. A single probe may take up to twice this.
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

enum EngineCommand {
    Launch {
        units: Vec<WorkerUnit>,
        tracker: Arc<BatchTracker>,
    },
}

struct BatchRun {
    config: BatchConfig,
    partitions: Vec<Range<usize>>,
    tracker: Arc<BatchTracker>,
    stop_flags: Vec<Arc<AtomicBool>>,
}

/// Runs one batch of liveness checks at a time on a background tokio
/// runtime and relays worker events through a single channel.
pub struct Coordinator {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
    last_batch_id: BatchId,
    run: Option<BatchRun>,
}

impl Coordinator {
    pub fn new(settings: ProbeSettings) -> Result<Self, EngineError> {
        let prober = ReqwestProber::new(settings)?;
        Self::with_prober(Arc::new(prober))
    }

    pub fn with_prober(prober: Arc<dyn Prober>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("checker-worker")
            .enable_all()
            .build()?;

        let worker_event_tx = event_tx.clone();
        thread::Builder::new()
            .name("checker-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Launch { units, tracker } => {
                            for mut unit in units {
                                let prober = prober.clone();
                                let tracker = tracker.clone();
                                let sink = ChannelEventSink::new(worker_event_tx.clone());
                                runtime.spawn(async move {
                                    unit.run(prober.as_ref(), &sink, &tracker).await;
                                });
                            }
                        }
                    }
                }
            })?;

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx,
            last_batch_id: 0,
            run: None,
        })
    }

    /// Starts checking `urls` and returns without waiting.
    ///
    /// Any batch still in flight is stopped first; its remaining events keep
    /// their old batch id. An empty `urls` completes immediately.
    pub fn start(&mut self, urls: Vec<String>, config: BatchConfig) -> Result<BatchId, EngineError> {
        if config.worker_count < 1 {
            return Err(EngineError::InvalidConfiguration(format!(
                "worker count must be at least 1, got {}",
                config.worker_count
            )));
        }

        self.stop();
        self.last_batch_id += 1;
        let batch_id = self.last_batch_id;

        if urls.is_empty() {
            checker_info!("batch {} has no urls; completing immediately", batch_id);
            let tracker = Arc::new(BatchTracker::new(batch_id, 0, 0));
            let _ = self
                .event_tx
                .send(EngineEvent::BatchCompleted(tracker.summary()));
            self.run = Some(BatchRun {
                config,
                partitions: Vec::new(),
                tracker,
                stop_flags: Vec::new(),
            });
            return Ok(batch_id);
        }

        let partitions = partition(urls.len(), config.worker_count);
        let tracker = Arc::new(BatchTracker::new(
            batch_id,
            urls.len(),
            config.worker_count,
        ));
        let units: Vec<WorkerUnit> = split_items(&urls, config.worker_count)
            .into_iter()
            .enumerate()
            .map(|(id, items)| {
                WorkerUnit::new(id, items, config.timeout, Arc::new(AtomicBool::new(false)))
            })
            .collect();
        let stop_flags = units.iter().map(WorkerUnit::stop_flag).collect();

        checker_info!(
            "batch {}: {} urls across {} workers, timeout {:?}",
            batch_id,
            urls.len(),
            config.worker_count,
            config.timeout
        );
        self.cmd_tx
            .send(EngineCommand::Launch {
                units,
                tracker: tracker.clone(),
            })
            .map_err(|_| EngineError::EngineStopped)?;

        self.run = Some(BatchRun {
            config,
            partitions,
            tracker,
            stop_flags,
        });
        Ok(batch_id)
    }

    /// Asks every worker of the current batch to halt.
    ///
    /// Stop takes effect after the current check completes, within one probe
    /// (at most twice the timeout). Calling it again, or with no batch, does
    /// nothing.
    pub fn stop(&self) {
        let Some(run) = &self.run else {
            return;
        };
        let newly_set = run
            .stop_flags
            .iter()
            .filter(|flag| !flag.swap(true, Ordering::SeqCst))
            .count();
        if newly_set > 0 && !run.tracker.is_finished() {
            checker_warn!(
                "batch {}: stop requested, in-flight checks will finish first",
                run.tracker.batch_id()
            );
        }
    }

    pub fn current_batch(&self) -> Option<BatchId> {
        self.run.as_ref().map(|run| run.tracker.batch_id())
    }

    pub fn config(&self) -> Option<BatchConfig> {
        self.run.as_ref().map(|run| run.config)
    }

    pub fn partitions(&self) -> &[Range<usize>] {
        self.run
            .as_ref()
            .map(|run| run.partitions.as_slice())
            .unwrap_or(&[])
    }

    pub fn progress(&self) -> f64 {
        self.run
            .as_ref()
            .map(|run| run.tracker.progress())
            .unwrap_or(0.0)
    }

    pub fn completed_items(&self) -> usize {
        self.run
            .as_ref()
            .map(|run| run.tracker.completed_items())
            .unwrap_or(0)
    }

    pub fn total_items(&self) -> usize {
        self.run
            .as_ref()
            .map(|run| run.tracker.total_items())
            .unwrap_or(0)
    }

    pub fn active_workers(&self) -> usize {
        self.run
            .as_ref()
            .map(|run| run.tracker.active_workers())
            .unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| !run.tracker.is_finished())
    }

    /// Drops the finished batch's bookkeeping. A running batch is kept.
    pub fn clear(&mut self) {
        if !self.is_running() {
            self.run = None;
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
