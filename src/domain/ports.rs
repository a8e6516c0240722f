use crate::domain::model::{
    BoundarySet, Coordinates, LocatedBranch, OverlayData, SourceData,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(&self, path: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;
    /// Where `path` ends up once written, for reporting.
    fn location_of(&self, path: &str) -> String;
}

/// Pauses the current task. Swapped for a recording fake in tests.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Timeout, connection failure, throttling, or a 5xx answer. Worth retrying.
    Transient(String),
    /// Rejected request or unusable answer. Retrying will not help.
    Permanent(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Transient(msg) => write!(f, "transient error: {}", msg),
            LookupError::Permanent(msg) => write!(f, "permanent error: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {}

/// Forward geocoding. `Ok(None)` is a valid "no match" answer, not an error.
pub trait GeocodingService: Send + Sync {
    fn lookup(
        &self,
        address: &str,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<Option<Coordinates>, LookupError>> + Send;
}

pub trait BoundaryProvider: Send + Sync {
    fn fetch_boundaries(&self) -> impl Future<Output = Result<BoundarySet>> + Send;
}

pub trait MapRenderer: Send + Sync {
    fn render(&self, boundaries: &BoundarySet, branches: &[LocatedBranch]) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceData>;
    async fn transform(&self, data: SourceData) -> Result<OverlayData>;
    async fn load(&self, data: OverlayData) -> Result<String>;
}
