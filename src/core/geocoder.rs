use crate::core::progress::{GeocodeEvent, ProgressSink};
use crate::domain::model::Coordinates;
use crate::domain::ports::{GeocodingService, LookupError, Sleeper};
use std::time::Duration;

/// Timing policy for one address: how many lookups, and how long to wait between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the retry that follows the first transient failure; doubles each time.
    pub backoff_base: Duration,
    /// Fixed pause after a "no match" answer before the next attempt.
    pub not_found_delay: Duration,
    pub request_timeout: Duration,
    /// Pause after every address in a batch, whatever its outcome.
    pub request_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            not_found_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            request_interval: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait after the transient failure of `attempt` (0-based): base * 2^attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Sum of the waits after `failures` consecutive transient failures.
    pub fn total_backoff(&self, failures: u32) -> Duration {
        (0..failures).map(|attempt| self.backoff(attempt)).sum()
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Located(Coordinates),
    /// Every attempt ended in a transient error or "no match".
    Exhausted { attempts: u32, last_error: String },
    PermanentFailure(String),
}

impl GeocodeOutcome {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            GeocodeOutcome::Located(coords) => Some(*coords),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        match self {
            GeocodeOutcome::Located(_) => None,
            GeocodeOutcome::Exhausted {
                attempts,
                last_error,
            } => Some(format!("gave up after {} attempts: {}", attempts, last_error)),
            GeocodeOutcome::PermanentFailure(reason) => Some(reason.clone()),
        }
    }
}

pub struct GeocodingClient<G: GeocodingService, K: Sleeper> {
    pub(crate) service: G,
    pub(crate) sleeper: K,
    pub(crate) policy: RetryPolicy,
}

impl<G: GeocodingService, K: Sleeper> GeocodingClient<G, K> {
    pub fn new(service: G, sleeper: K, policy: RetryPolicy) -> Self {
        Self {
            service,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    /// Resolve one address, retrying transient failures and "no match" answers
    /// until the attempt budget runs out.
    pub async fn geocode(&self, address: &str, sink: &dyn ProgressSink) -> GeocodeOutcome {
        let attempts = self.policy.attempts();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;

            let retry_in = match self
                .service
                .lookup(address, self.policy.request_timeout)
                .await
            {
                Ok(Some(coordinates)) => return GeocodeOutcome::Located(coordinates),
                Ok(None) => {
                    let retry_in = (!is_last).then_some(self.policy.not_found_delay);
                    sink.on_event(&GeocodeEvent::NotFound {
                        address: address.to_string(),
                        attempt: attempt + 1,
                        retry_in,
                    });
                    last_error = "no match found".to_string();
                    retry_in
                }
                Err(LookupError::Transient(message)) => {
                    let retry_in = (!is_last).then(|| self.policy.backoff(attempt));
                    sink.on_event(&GeocodeEvent::TransientFailure {
                        address: address.to_string(),
                        attempt: attempt + 1,
                        error: message.clone(),
                        retry_in,
                    });
                    last_error = message;
                    retry_in
                }
                Err(LookupError::Permanent(message)) => {
                    return GeocodeOutcome::PermanentFailure(message);
                }
            };

            if let Some(delay) = retry_in {
                self.sleeper.sleep(delay).await;
            }
        }

        GeocodeOutcome::Exhausted {
            attempts,
            last_error,
        }
    }
}
