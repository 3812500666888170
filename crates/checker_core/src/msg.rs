#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// URLs read from an import source, in file order.
    UrlsImported(Vec<String>),
    WorkerCountChanged(usize),
    TimeoutChanged(u64),
    /// User clicked Start.
    StartClicked,
    /// User clicked Stop (or pressed Ctrl-C).
    StopClicked,
    /// The engine refused to start the batch.
    BatchRejected { reason: String },
    /// Engine entered or left the check for a row.
    ItemStatus {
        index: usize,
        status: crate::RowStatus,
    },
    /// Engine result for a row.
    ItemResult {
        index: usize,
        alive: bool,
        status_code: Option<u16>,
    },
    /// Periodic pulse with the engine's active worker count.
    ActiveWorkers(usize),
    /// Every worker of the batch has stopped or completed.
    BatchFinished { completed: usize, stopped: bool },
    ClearTable,
    RemoveRows(Vec<usize>),
    RemoveDuplicates,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
