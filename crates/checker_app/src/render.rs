use std::time::Duration;

use checker_core::{AppViewModel, SessionState, Verdict};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub struct Renderer {
    bar: ProgressBar,
}

impl Renderer {
    pub fn new(show_progress: bool) -> Self {
        if !show_progress {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("█▓▒░ "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn render(&self, view: &AppViewModel) {
        self.bar.set_length(view.progress_total as u64);
        self.bar.set_position(view.progress_done as u64);
        let message = match view.session {
            SessionState::Stopping => format!(
                "stopping, {} active workers (finishing current checks)",
                view.active_workers
            ),
            _ => format!("{} active workers", view.active_workers),
        };
        self.bar.set_message(message);
    }

    pub fn notice(&self, line: &str) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Prints one line per row plus totals. Failing rows are always listed;
/// passing rows only when `verbose`.
pub fn print_summary(view: &AppViewModel, verbose: bool) {
    let mut ok = 0;
    let mut failed = 0;
    let mut unchecked = 0;
    for row in &view.rows {
        let code = row
            .code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "---".to_string());
        match row.result {
            Some(Verdict::Ok) => {
                ok += 1;
                if verbose {
                    println!("{} {:>3} {}", "OK  ".green().bold(), code, row.url);
                }
            }
            Some(Verdict::Fail) => {
                failed += 1;
                println!("{} {:>3} {}", "Fail".red().bold(), code, row.url);
            }
            None => {
                unchecked += 1;
                if verbose {
                    println!("{} {:>3} {}", "----".dimmed(), code, row.url);
                }
            }
        }
    }

    println!();
    println!(
        "{} ok, {} failed, {} not checked ({} total)",
        ok.to_string().green(),
        failed.to_string().red(),
        unchecked.to_string().yellow(),
        view.rows.len()
    );
}
