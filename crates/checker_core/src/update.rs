use crate::{AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlsImported(urls) => {
            // The table is frozen while a batch owns row indices.
            if state.session() == SessionState::Idle {
                state.append_urls(urls);
            }
            Vec::new()
        }
        Msg::WorkerCountChanged(worker_count) => {
            state.set_worker_count(worker_count);
            Vec::new()
        }
        Msg::TimeoutChanged(timeout_secs) => {
            state.set_timeout_secs(timeout_secs);
            Vec::new()
        }
        Msg::StartClicked => {
            if state.session() == SessionState::Idle {
                let urls = state.begin_batch();
                let settings = state.settings();
                vec![Effect::StartBatch {
                    urls,
                    worker_count: settings.worker_count,
                    timeout: settings.timeout(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::StopClicked => {
            if state.session() == SessionState::Running {
                state.request_stop();
                vec![Effect::StopBatch]
            } else {
                Vec::new()
            }
        }
        Msg::BatchRejected { reason } => {
            state.reject_batch(reason);
            Vec::new()
        }
        Msg::ItemStatus { index, status } => {
            state.apply_status(index, status);
            Vec::new()
        }
        Msg::ItemResult {
            index,
            alive,
            status_code,
        } => {
            state.apply_result(index, alive, status_code);
            Vec::new()
        }
        Msg::ActiveWorkers(active) => {
            state.set_active_workers(active);
            Vec::new()
        }
        Msg::BatchFinished { .. } => {
            if state.session() != SessionState::Idle {
                state.finish_batch();
            }
            Vec::new()
        }
        Msg::ClearTable => {
            if state.session() == SessionState::Idle {
                state.clear_rows();
            }
            Vec::new()
        }
        Msg::RemoveRows(indices) => {
            if state.session() == SessionState::Idle {
                state.remove_rows(&indices);
            }
            Vec::new()
        }
        Msg::RemoveDuplicates => {
            if state.session() == SessionState::Idle {
                state.remove_duplicates();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
