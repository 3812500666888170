use crate::{CheckSettings, RowStatus, SessionState, Verdict};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub rows: Vec<RowView>,
    pub progress_done: usize,
    pub progress_total: usize,
    pub progress_percent: u8,
    pub active_workers: usize,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub settings: CheckSettings,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub url: String,
    pub result: Option<Verdict>,
    pub code: Option<u16>,
    pub status: Option<RowStatus>,
}
