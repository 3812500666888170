use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::view_model::{AppViewModel, RowView};

pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Stop requested; workers are finishing their in-flight checks.
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Fail => write!(f, "Fail"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Checking,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSettings {
    pub worker_count: usize,
    pub timeout_secs: u64,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CheckSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRow {
    pub url: String,
    pub result: Option<Verdict>,
    pub code: Option<u16>,
    pub status: Option<RowStatus>,
}

impl UrlRow {
    fn new(url: String) -> Self {
        Self {
            url,
            result: None,
            code: None,
            status: None,
        }
    }

    fn reset(&mut self) {
        self.result = None;
        self.code = None;
        self.status = None;
    }
}

/// Exportable row: the three fields every result sink needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    pub url: String,
    pub result: Option<Verdict>,
    pub code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    rows: Vec<UrlRow>,
    settings: CheckSettings,
    session: SessionState,
    progress_done: usize,
    progress_total: usize,
    active_workers: usize,
    last_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CheckSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let progress_percent = if self.progress_total == 0 {
            0
        } else {
            (self.progress_done * 100 / self.progress_total).min(100) as u8
        };
        AppViewModel {
            session: self.session,
            rows: self
                .rows
                .iter()
                .map(|row| RowView {
                    url: row.url.clone(),
                    result: row.result,
                    code: row.code,
                    status: row.status,
                })
                .collect(),
            progress_done: self.progress_done,
            progress_total: self.progress_total,
            progress_percent,
            active_workers: self.active_workers,
            start_enabled: self.session == SessionState::Idle,
            stop_enabled: self.session == SessionState::Running,
            settings: self.settings,
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn settings(&self) -> CheckSettings {
        self.settings
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn records(&self) -> Vec<RowRecord> {
        self.rows
            .iter()
            .map(|row| RowRecord {
                url: row.url.clone(),
                result: row.result,
                code: row.code,
            })
            .collect()
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn append_urls(&mut self, urls: Vec<String>) -> usize {
        let before = self.rows.len();
        self.rows.extend(
            urls.into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .map(UrlRow::new),
        );
        let added = self.rows.len() - before;
        if added > 0 {
            self.mark_dirty();
        }
        added
    }

    pub(crate) fn set_worker_count(&mut self, worker_count: usize) {
        if self.settings.worker_count != worker_count {
            self.settings.worker_count = worker_count;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_timeout_secs(&mut self, timeout_secs: u64) {
        if self.settings.timeout_secs != timeout_secs {
            self.settings.timeout_secs = timeout_secs;
            self.mark_dirty();
        }
    }

    /// Clears previous results and enters `Running`; returns the URLs to check.
    pub(crate) fn begin_batch(&mut self) -> Vec<String> {
        for row in &mut self.rows {
            row.reset();
        }
        self.session = SessionState::Running;
        self.progress_done = 0;
        self.progress_total = self.rows.len();
        self.last_error = None;
        self.mark_dirty();
        self.rows.iter().map(|row| row.url.clone()).collect()
    }

    pub(crate) fn request_stop(&mut self) {
        self.session = SessionState::Stopping;
        self.mark_dirty();
    }

    pub(crate) fn reject_batch(&mut self, reason: String) {
        self.session = SessionState::Idle;
        self.progress_total = 0;
        self.active_workers = 0;
        self.last_error = Some(reason);
        self.mark_dirty();
    }

    pub(crate) fn apply_status(&mut self, index: usize, status: RowStatus) {
        if let Some(row) = self.rows.get_mut(index) {
            row.status = Some(status);
            self.dirty = true;
        }
    }

    pub(crate) fn apply_result(&mut self, index: usize, alive: bool, status_code: Option<u16>) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        let first_result = row.result.is_none();
        row.result = Some(if alive { Verdict::Ok } else { Verdict::Fail });
        row.code = status_code;
        if first_result && self.progress_done < self.progress_total {
            self.progress_done += 1;
        }
        self.mark_dirty();
    }

    pub(crate) fn set_active_workers(&mut self, active: usize) {
        if self.active_workers != active {
            self.active_workers = active;
            self.mark_dirty();
        }
    }

    pub(crate) fn finish_batch(&mut self) {
        self.session = SessionState::Idle;
        self.active_workers = 0;
        self.mark_dirty();
    }

    pub(crate) fn clear_rows(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.rows.clear();
        self.progress_done = 0;
        self.progress_total = 0;
        self.mark_dirty();
    }

    pub(crate) fn remove_rows(&mut self, indices: &[usize]) {
        let doomed: HashSet<usize> = indices.iter().copied().collect();
        let before = self.rows.len();
        let mut position = 0;
        self.rows.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
        if self.rows.len() != before {
            self.mark_dirty();
        }
    }

    /// Keeps the first occurrence of every URL, comparing normalised forms.
    pub(crate) fn remove_duplicates(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.rows.len();
        self.rows
            .retain(|row| seen.insert(normalize_url_for_dedupe(&row.url)));
        let removed = before - self.rows.len();
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }
}

/// Canonical form used to spot duplicate rows: scheme and host are
/// lowercased, and a bare trailing slash is ignored.
pub fn normalize_url_for_dedupe(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) => {
            let mut normalized = url.to_string();
            if url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
                && normalized.ends_with('/')
            {
                normalized.pop();
            }
            normalized
        }
        Err(_) => trimmed.trim_end_matches('/').to_ascii_lowercase(),
    }
}
