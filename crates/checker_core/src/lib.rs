//! Checker core: pure state machine and view-model helpers for the URL table.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    normalize_url_for_dedupe, AppState, CheckSettings, RowRecord, RowStatus, SessionState,
    UrlRow, Verdict, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKER_COUNT,
};
pub use update::update;
pub use view_model::{AppViewModel, RowView};
