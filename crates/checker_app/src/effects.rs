use std::sync::mpsc;
use std::time::Duration;

use checker_core::{Effect, Msg, RowStatus};
use checker_engine::{
    BatchConfig, BatchId, Coordinator, EngineError, EngineEvent, Phase, ProbeSettings,
};
use checker_logging::{checker_info, checker_warn};

/// Executes core effects against the engine and feeds engine events back as
/// core messages.
pub struct EffectRunner {
    coordinator: Coordinator,
    batch: Option<BatchId>,
}

impl EffectRunner {
    pub fn new(probe: ProbeSettings) -> Result<Self, EngineError> {
        Ok(Self::with_coordinator(Coordinator::new(probe)?))
    }

    pub fn with_coordinator(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            batch: None,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>, msg_tx: &mpsc::Sender<Msg>) {
        for effect in effects {
            match effect {
                Effect::StartBatch {
                    urls,
                    worker_count,
                    timeout,
                } => {
                    let config = BatchConfig {
                        worker_count,
                        timeout,
                    };
                    match self.coordinator.start(urls, config) {
                        Ok(batch_id) => {
                            checker_info!("StartBatch batch_id={}", batch_id);
                            self.batch = Some(batch_id);
                        }
                        Err(err) => {
                            checker_warn!("StartBatch rejected: {}", err);
                            let _ = msg_tx.send(Msg::BatchRejected {
                                reason: err.to_string(),
                            });
                        }
                    }
                }
                Effect::StopBatch => self.coordinator.stop(),
            }
        }
    }

    /// Waits up to `wait` for engine events, forwards everything that is
    /// pending, then reports the active worker count.
    pub fn pump(&mut self, wait: Duration, msg_tx: &mpsc::Sender<Msg>) {
        if let Some(event) = self.coordinator.recv_timeout(wait) {
            self.forward(event, msg_tx);
            while let Some(event) = self.coordinator.try_recv() {
                self.forward(event, msg_tx);
            }
        }
        let _ = msg_tx.send(Msg::ActiveWorkers(self.coordinator.active_workers()));
    }

    fn forward(&self, event: EngineEvent, msg_tx: &mpsc::Sender<Msg>) {
        if let Some(msg) = event_to_msg(event, self.batch) {
            let _ = msg_tx.send(msg);
        }
    }
}

/// Maps an engine event to a core message, dropping events that belong to
/// any batch other than `current`.
pub fn event_to_msg(event: EngineEvent, current: Option<BatchId>) -> Option<Msg> {
    if Some(event.batch_id()) != current {
        return None;
    }
    let msg = match event {
        EngineEvent::Status(status) => Msg::ItemStatus {
            index: status.index,
            status: map_phase(status.phase),
        },
        EngineEvent::Result(result) => Msg::ItemResult {
            index: result.index,
            alive: result.alive,
            status_code: result.status_code,
        },
        EngineEvent::BatchCompleted(summary) => Msg::BatchFinished {
            completed: summary.completed_items,
            stopped: summary.stopped,
        },
    };
    Some(msg)
}

fn map_phase(phase: Phase) -> RowStatus {
    match phase {
        Phase::Checking => RowStatus::Checking,
        Phase::Done => RowStatus::Done,
    }
}
