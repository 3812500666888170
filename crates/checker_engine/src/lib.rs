//! Checker engine: concurrent URL liveness checks and their IO edges.
mod coordinator;
mod export;
mod import;
mod partition;
mod persist;
mod probe;
mod types;
mod worker;

pub use coordinator::{BatchConfig, Coordinator, DEFAULT_TIMEOUT, DEFAULT_WORKER_COUNT};
pub use export::{render_export, write_export, ExportError, ExportFormat, ResultRecord, Verdict};
pub use import::{parse_url_list, read_url_list, ImportError};
pub use partition::{partition, split_items};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use probe::{
    ProbeSettings, Prober, ReqwestProber, DEFAULT_ACCEPTED_STATUS_CODES, DEFAULT_USER_AGENT,
};
pub use types::{
    BatchId, BatchSummary, EngineError, EngineEvent, Phase, ProbeError, ProbeFailure,
    ProbeOutcome, ResultEvent, StatusEvent, WorkItem,
};
pub use worker::{BatchTracker, ChannelEventSink, EventSink, WorkerState, WorkerUnit};
