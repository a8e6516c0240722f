pub mod batch;
pub mod engine;
pub mod geocoder;
pub mod pipeline;
pub mod progress;

pub use crate::domain::model::{OverlayData, RunSummary, SourceData};
pub use crate::domain::ports::{
    BoundaryProvider, GeocodingService, MapRenderer, Pipeline, Sleeper, Storage,
};
pub use crate::utils::error::Result;
