use std::time::Duration;

use checker_logging::checker_debug;
use reqwest::StatusCode;

use crate::{EngineError, ProbeError, ProbeFailure, ProbeOutcome};

/// Status codes that count as "alive" unless configured otherwise.
pub const DEFAULT_ACCEPTED_STATUS_CODES: &[u16] = &[200, 301];

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub user_agent: String,
    pub redirect_limit: usize,
    pub accepted_status_codes: Vec<u16>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            redirect_limit: 10,
            accepted_status_codes: DEFAULT_ACCEPTED_STATUS_CODES.to_vec(),
        }
    }
}

/// A single liveness check against one URL.
///
/// Implementations must be safe to call concurrently for different URLs and
/// must never fail: every problem is folded into the returned outcome.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: reqwest::Client,
    accepted_status_codes: Vec<u16>,
}

impl ReqwestProber {
    pub fn new(settings: ProbeSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| EngineError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            accepted_status_codes: settings.accepted_status_codes,
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<StatusCode, ProbeError> {
        request
            .timeout(timeout)
            .send()
            .await
            .map(|response| response.status())
            .map_err(|err| map_reqwest_error(err, timeout))
    }
}

#[async_trait::async_trait]
impl Prober for ReqwestProber {
    /// HEAD first; anything but 200 gets one GET, since some servers reject
    /// HEAD. Worst case this blocks for twice `timeout`.
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                return ProbeOutcome::failed(ProbeError::new(
                    ProbeFailure::InvalidUrl,
                    format!("{url}: {err}"),
                ));
            }
        };

        let head = self.send(self.client.head(parsed.clone()), timeout).await;
        let status = match head {
            Ok(status) if status == StatusCode::OK => Ok(status),
            Ok(status) => {
                checker_debug!("HEAD {} returned {}, retrying with GET", url, status);
                self.send(self.client.get(parsed), timeout).await
            }
            Err(err) => Err(err),
        };

        match status {
            Ok(status) => ProbeOutcome::from_status(status.as_u16(), &self.accepted_status_codes),
            Err(err) => {
                checker_debug!("probe of {} failed: {}", url, err.message);
                ProbeOutcome::failed(err)
            }
        }
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::new(
            ProbeFailure::Timeout,
            format!("timed out after {timeout:?}: {err}"),
        );
    }
    ProbeError::new(ProbeFailure::Transport, err.to_string())
}
