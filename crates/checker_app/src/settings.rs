use std::fs;
use std::path::Path;

use checker_core::{CheckSettings, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKER_COUNT};
use checker_engine::{
    AtomicFileWriter, ProbeSettings, DEFAULT_ACCEPTED_STATUS_CODES, DEFAULT_USER_AGENT,
};
use checker_logging::{checker_info, checker_warn};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub worker_count: usize,
    pub timeout_secs: u64,
    pub accepted_status_codes: Vec<u16>,
    pub user_agent: String,
    pub redirect_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let probe = ProbeSettings::default();
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accepted_status_codes: DEFAULT_ACCEPTED_STATUS_CODES.to_vec(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            redirect_limit: probe.redirect_limit,
        }
    }
}

impl Settings {
    /// Missing or unreadable files fall back to defaults with a warning.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::default();
            }
            Err(err) => {
                checker_warn!("Failed to read settings from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match ron::from_str::<Self>(&content) {
            Ok(mut settings) => {
                checker_info!("Loaded settings from {:?}", path);
                settings.clamp_timeout();
                settings
            }
            Err(err) => {
                checker_warn!("Failed to parse settings from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("settings path {:?} has no file name", path))?;
        AtomicFileWriter::for_path(path).write(filename, &content)?;
        checker_info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(workers) = cli.workers {
            self.worker_count = workers;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
        if !cli.accept.is_empty() {
            self.accepted_status_codes = cli.accept.clone();
        }
        self.clamp_timeout();
    }

    /// A zero timeout would fail every check instantly; it falls back to the
    /// default.
    fn clamp_timeout(&mut self) {
        if self.timeout_secs == 0 {
            checker_warn!(
                "timeout_secs must be at least 1; using {}s",
                DEFAULT_TIMEOUT_SECS
            );
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
    }

    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            worker_count: self.worker_count,
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            user_agent: self.user_agent.clone(),
            redirect_limit: self.redirect_limit,
            accepted_status_codes: self.accepted_status_codes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&temp.path().join("absent.ron"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.accepted_status_codes, vec![200, 301]);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, "(worker_count: 3, timeout_secs: 9)").unwrap();

        let settings = Settings::load(&path);

        assert_eq!(settings.worker_count, 3);
        assert_eq!(settings.timeout_secs, 9);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn zero_timeout_in_file_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, "(worker_count: 4, timeout_secs: 0)").unwrap();

        let settings = Settings::load(&path);

        assert_eq!(settings.worker_count, 4);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(settings.check_settings().timeout() > std::time::Duration::ZERO);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, "worker_count = 3").unwrap();

        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        let settings = Settings {
            worker_count: 2,
            accepted_status_codes: vec![200],
            ..Settings::default()
        };

        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "url-checker",
            "urls.txt",
            "--workers",
            "6",
            "--accept",
            "204",
        ])
        .unwrap();
        let mut settings = Settings {
            worker_count: 2,
            timeout_secs: 8,
            ..Settings::default()
        };

        settings.apply_overrides(&cli);

        assert_eq!(settings.worker_count, 6);
        assert_eq!(settings.timeout_secs, 8);
        assert_eq!(settings.accepted_status_codes, vec![204]);
        assert_eq!(settings.check_settings().worker_count, 6);
        assert_eq!(settings.probe_settings().accepted_status_codes, vec![204]);
    }
}
