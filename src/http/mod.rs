// Shared blocking HTTP plumbing for the embedding, LLM and page fetch clients

#[cfg(test)]
mod tests;

use anyhow::{Result, anyhow};
use std::time::Duration;
use tracing::{debug, error, warn};

pub const USER_AGENT: &str = "Neuron Archive RAG App";

const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Build a ureq agent with a global timeout and the app's user agent
#[inline]
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .user_agent(USER_AGENT)
        .build()
        .into()
}

/// Outcome classification for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retry {
    /// Transport failure or server error, worth another attempt
    Transient,
    /// Client error or malformed request, give up immediately
    Fatal,
}

/// Decide whether a ureq error is worth retrying
#[inline]
pub fn classify(error: &ureq::Error) -> Retry {
    match error {
        ureq::Error::StatusCode(status) if *status >= 500 || *status == 429 => Retry::Transient,
        ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound
        | ureq::Error::Timeout(_)
        | ureq::Error::Io(_) => Retry::Transient,
        _ => Retry::Fatal,
    }
}

/// Run `request_fn` up to `attempts` times, backing off exponentially between
/// transient failures. With `attempts == 1` the first error is returned as-is.
pub fn send_with_retry<F>(target: &str, attempts: u32, mut request_fn: F) -> Result<String>
where
    F: FnMut() -> Result<String, ureq::Error>,
{
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!("HTTP request attempt {}/{} to {}", attempt, attempts, target);

        match request_fn() {
            Ok(response_text) => {
                debug!("Request succeeded on attempt {}", attempt);
                return Ok(response_text);
            }
            Err(error) => {
                if classify(&error) == Retry::Fatal {
                    warn!("Non-retryable error from {}: {}", target, error);
                    return Err(describe(&error));
                }

                warn!(
                    "Transient error from {}: {}, attempt {}/{}",
                    target, error, attempt, attempts
                );
                last_error = Some(describe(&error));

                if attempt < attempts {
                    let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                    let delay = Duration::from_millis(delay_ms);
                    debug!("Waiting {:?} before retry", delay);
                    std::thread::sleep(delay);
                }
            }
        }
    }

    error!("All {} attempts failed for request to {}", attempts, target);

    Err(last_error.unwrap_or_else(|| anyhow!("Request failed after retries")))
}

fn describe(error: &ureq::Error) -> anyhow::Error {
    match error {
        ureq::Error::StatusCode(status) => anyhow!("HTTP error {}", status),
        other => anyhow!("Request error: {}", other),
    }
}
