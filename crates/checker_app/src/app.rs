use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Context;
use checker_core::{update, AppState, Effect, Msg, RowRecord, SessionState};
use checker_engine::{read_url_list, write_export, ExportFormat, ResultRecord, Verdict};
use checker_logging::{checker_info, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;

use crate::cli::Cli;
use crate::effects::EffectRunner;
use crate::render::{print_summary, Renderer};
use crate::settings::Settings;

/// How long one loop iteration waits for engine events; also the render tick.
const TICK: Duration = Duration::from_millis(75);

pub fn run_app(args: Cli) -> anyhow::Result<ExitCode> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    checker_logging::initialize(log_destination(&args), level);

    let mut settings = Settings::load(&args.config);
    settings.apply_overrides(&args);
    if args.save_config {
        settings.save(&args.config)?;
    }

    let export_format = match &args.export {
        Some(path) => Some(ExportFormat::from_path(path).with_context(|| {
            format!("unsupported export format for {path:?} (use .txt, .csv or .json)")
        })?),
        None => None,
    };

    let urls = read_url_list(&args.input)?;
    checker_info!("Imported {} urls from {:?}", urls.len(), args.input);

    let mut runner =
        EffectRunner::new(settings.probe_settings()).context("Failed to start checker engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let stop_tx = msg_tx.clone();
    let interrupts = Arc::new(AtomicUsize::new(0));
    let interrupts_handler = Arc::clone(&interrupts);
    ctrlc::set_handler(move || match interrupt_action(&interrupts_handler) {
        InterruptAction::Stop => {
            eprintln!("\nInterrupt received, press Ctrl+C again to exit immediately.");
            let _ = stop_tx.send(Msg::StopClicked);
        }
        InterruptAction::Exit => {
            eprintln!("\nForced exit!");
            std::process::exit(130);
        }
    })
    .context("Failed to set signal handler")?;

    let mut state = AppState::with_settings(settings.check_settings());
    dispatch(&mut state, Msg::UrlsImported(urls));
    if args.dedupe {
        dispatch(&mut state, Msg::RemoveDuplicates);
    }

    let renderer = Renderer::new(!args.no_progress);
    let effects = dispatch(&mut state, Msg::StartClicked);
    runner.enqueue(effects, &msg_tx);

    while state.session() != SessionState::Idle {
        runner.pump(TICK, &msg_tx);
        for msg in msg_rx.try_iter() {
            if msg == Msg::StopClicked && state.session() == SessionState::Running {
                renderer.notice("Stopping: waiting for in-flight checks to finish...");
            }
            let effects = dispatch(&mut state, msg);
            runner.enqueue(effects, &msg_tx);
        }
        if state.consume_dirty() {
            renderer.render(&state.view());
        }
    }
    renderer.finish();

    let view = state.view();
    if let Some(reason) = &view.last_error {
        anyhow::bail!("batch rejected: {reason}");
    }
    print_summary(&view, args.verbose);

    if let (Some(path), Some(format)) = (&args.export, export_format) {
        let records: Vec<ResultRecord> = state.records().into_iter().map(to_result_record).collect();
        let written = write_export(path, &records, format)
            .with_context(|| format!("Failed to export results to {path:?}"))?;
        println!("Results written to {}", written.display());
    }

    let all_alive = view
        .rows
        .iter()
        .all(|row| row.result == Some(checker_core::Verdict::Ok));
    Ok(if all_alive {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// First Ctrl-C: stop the batch cooperatively.
    Stop,
    Exit,
}

fn interrupt_action(presses: &AtomicUsize) -> InterruptAction {
    if presses.fetch_add(1, Ordering::SeqCst) == 0 {
        InterruptAction::Stop
    } else {
        InterruptAction::Exit
    }
}

fn log_destination(args: &Cli) -> LogDestination {
    let path = PathBuf::from(DEFAULT_LOG_FILE);
    if args.log_file_only {
        LogDestination::File(path)
    } else if args.log_file {
        LogDestination::Both(path)
    } else {
        LogDestination::Terminal
    }
}

fn dispatch(state: &mut AppState, msg: Msg) -> Vec<Effect> {
    let (next, effects) = update(std::mem::take(state), msg);
    *state = next;
    effects
}

fn to_result_record(record: RowRecord) -> ResultRecord {
    ResultRecord {
        url: record.url,
        result: record.result.map(|verdict| match verdict {
            checker_core::Verdict::Ok => Verdict::Ok,
            checker_core::Verdict::Fail => Verdict::Fail,
        }),
        status_code: record.code,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn second_interrupt_forces_exit() {
        let presses = AtomicUsize::new(0);
        assert_eq!(interrupt_action(&presses), InterruptAction::Stop);
        assert_eq!(interrupt_action(&presses), InterruptAction::Exit);
        assert_eq!(interrupt_action(&presses), InterruptAction::Exit);
    }

    #[test]
    fn log_flags_select_destination() {
        let terminal = Cli::parse_from(["url-checker", "urls.txt"]);
        assert_eq!(log_destination(&terminal), LogDestination::Terminal);

        let both = Cli::parse_from(["url-checker", "urls.txt", "--log-file"]);
        assert_eq!(
            log_destination(&both),
            LogDestination::Both(PathBuf::from(DEFAULT_LOG_FILE))
        );

        let file_only = Cli::parse_from(["url-checker", "urls.txt", "--log-file-only"]);
        assert_eq!(
            log_destination(&file_only),
            LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE))
        );
    }
}
