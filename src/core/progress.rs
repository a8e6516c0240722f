use crate::domain::model::Coordinates;
use std::time::Duration;

/// Progress of a geocoding batch, published instead of printed.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeEvent {
    BranchStarted {
        index: usize,
        total: usize,
        name: String,
    },
    NotFound {
        address: String,
        attempt: u32,
        retry_in: Option<Duration>,
    },
    TransientFailure {
        address: String,
        attempt: u32,
        error: String,
        retry_in: Option<Duration>,
    },
    Located {
        name: String,
        coordinates: Coordinates,
    },
    Failed {
        name: String,
        address: String,
        reason: String,
    },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &GeocodeEvent);
}

/// Discards every event.
impl ProgressSink for () {
    fn on_event(&self, _event: &GeocodeEvent) {}
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_event(&self, event: &GeocodeEvent) {
        match event {
            GeocodeEvent::BranchStarted { index, total, name } => {
                tracing::info!("📍 Geocoding {}/{}: {}...", index, total, name);
            }
            GeocodeEvent::NotFound {
                address,
                attempt,
                retry_in,
            } => match retry_in {
                Some(delay) => tracing::debug!(
                    "No match for '{}' (attempt {}), retrying in {:?}",
                    address,
                    attempt,
                    delay
                ),
                None => tracing::debug!("No match for '{}' (attempt {})", address, attempt),
            },
            GeocodeEvent::TransientFailure {
                address,
                attempt,
                error,
                retry_in,
            } => match retry_in {
                Some(delay) => tracing::warn!(
                    "⚠️ Attempt {} for '{}' failed: {}, retrying in {:?}",
                    attempt,
                    address,
                    error,
                    delay
                ),
                None => tracing::warn!(
                    "⚠️ Attempt {} for '{}' failed: {}",
                    attempt,
                    address,
                    error
                ),
            },
            GeocodeEvent::Located { name, coordinates } => {
                tracing::info!(
                    "  ✓ {} found: ({:.4}, {:.4})",
                    name,
                    coordinates.latitude(),
                    coordinates.longitude()
                );
            }
            GeocodeEvent::Failed {
                name,
                address,
                reason,
            } => {
                tracing::warn!("  ✗ Failed to geocode {} ({}): {}", name, address, reason);
            }
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: std::sync::Mutex<Vec<GeocodeEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<GeocodeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn on_event(&self, event: &GeocodeEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
