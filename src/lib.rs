pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use app::build_pipeline;
pub use config::MapConfig;
pub use core::{engine::MapEngine, pipeline::OverlayPipeline};
pub use utils::error::{MapError, Result};
