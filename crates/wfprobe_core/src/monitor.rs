//! Polling protocols for run completion and run discovery.
//!
//! Both protocols block the caller and back off linearly: the sleep after
//! attempt `n` is `n * base_delay`. Only the "still running" and "not yet
//! visible" conditions are retried; any fetch error ends the poll at once.

use crate::config::PollingConfig;
use crate::error::{ProbeError, Result};
use crate::model::RunDetails;
use crate::Sleeper;
use std::borrow::Borrow;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Linear backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
}

impl LinearBackoff {
    /// Creates a schedule with the given delay unit.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay to sleep after the 1-based `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt)
    }
}

/// Polls the management API until a run settles or appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMonitor {
    backoff: LinearBackoff,
    max_wait: Option<Duration>,
    since_max_attempts: u32,
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(&PollingConfig::default())
    }
}

impl RunMonitor {
    /// Creates a monitor from polling configuration.
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            backoff: LinearBackoff::new(config.base_delay()),
            max_wait: config.max_wait(),
            since_max_attempts: config.since_max_attempts,
        }
    }

    /// Overrides the wait budget of [`poll_until_terminal`](Self::poll_until_terminal).
    /// `None` polls until the run settles, however long that takes.
    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Overrides the attempt cap of [`poll_for_run_since`](Self::poll_for_run_since).
    pub fn with_since_max_attempts(mut self, attempts: u32) -> Self {
        self.since_max_attempts = attempts;
        self
    }

    /// Fetches run details until the status is no longer transient.
    ///
    /// Returns the first non-transient document. Fails with
    /// [`ProbeError::PollTimeout`] when the next sleep would push the total
    /// wait past the budget.
    pub fn poll_until_terminal<D, F>(&self, sleeper: &dyn Sleeper, mut fetch: F) -> Result<D>
    where
        D: Borrow<RunDetails>,
        F: FnMut() -> Result<D>,
    {
        let mut attempt = 1u32;
        let mut waited = Duration::ZERO;

        loop {
            let doc = fetch()?;
            let details: &RunDetails = doc.borrow();
            let status = details.status();
            if !status.is_transient() {
                info!(run_id = %details.name, %status, attempts = attempt, "run settled");
                return Ok(doc);
            }

            let delay = self.backoff.delay(attempt);
            if let Some(max_wait) = self.max_wait {
                if waited + delay > max_wait {
                    warn!(run_id = %details.name, attempts = attempt, "run did not settle within wait budget");
                    return Err(ProbeError::PollTimeout {
                        run_id: details.name.clone(),
                        attempts: attempt,
                        waited_ms: waited.as_millis() as u64,
                    });
                }
            }

            debug!(run_id = %details.name, attempt, delay_ms = delay.as_millis() as u64, "run still running");
            sleeper.sleep(delay);
            waited += delay;
            attempt += 1;
        }
    }

    /// Looks for a run until one is found or the attempt cap is reached.
    ///
    /// `fetch` reports the most recent matching run, if any. Exhausting the
    /// cap is not an error: the result is `Ok(None)`.
    pub fn poll_for_run_since<F>(&self, sleeper: &dyn Sleeper, mut fetch: F) -> Result<Option<RunDetails>>
    where
        F: FnMut() -> Result<Option<RunDetails>>,
    {
        for attempt in 1..=self.since_max_attempts {
            if let Some(run) = fetch()? {
                info!(run_id = %run.name, attempts = attempt, "found run");
                return Ok(Some(run));
            }

            if attempt < self.since_max_attempts {
                let delay = self.backoff.delay(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "no run visible yet");
                sleeper.sleep(delay);
            }
        }

        warn!(attempts = self.since_max_attempts, "no run found within attempt cap");
        Ok(None)
    }
}
