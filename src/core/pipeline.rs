use crate::core::geocoder::GeocodingClient;
use crate::core::progress::{ProgressSink, TracingProgress};
use crate::core::{
    BoundaryProvider, GeocodingService, MapRenderer, OverlayData, Pipeline, Sleeper, SourceData,
    Storage,
};
use crate::domain::registry;
use crate::utils::error::Result;

/// Boundaries + registry → geocoding → rendered HTML written through `Storage`.
pub struct OverlayPipeline<S, B, G, K, R>
where
    S: Storage,
    B: BoundaryProvider,
    G: GeocodingService,
    K: Sleeper,
    R: MapRenderer,
{
    storage: S,
    boundaries: B,
    geocoder: GeocodingClient<G, K>,
    renderer: R,
    output_file: String,
    progress: Box<dyn ProgressSink>,
}

impl<S, B, G, K, R> OverlayPipeline<S, B, G, K, R>
where
    S: Storage,
    B: BoundaryProvider,
    G: GeocodingService,
    K: Sleeper,
    R: MapRenderer,
{
    pub fn new(
        storage: S,
        boundaries: B,
        geocoder: GeocodingClient<G, K>,
        renderer: R,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            boundaries,
            geocoder,
            renderer,
            output_file: output_file.into(),
            progress: Box::new(TracingProgress),
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }
}

#[async_trait::async_trait]
impl<S, B, G, K, R> Pipeline for OverlayPipeline<S, B, G, K, R>
where
    S: Storage,
    B: BoundaryProvider,
    G: GeocodingService,
    K: Sleeper,
    R: MapRenderer,
{
    async fn extract(&self) -> Result<SourceData> {
        let boundaries = self.boundaries.fetch_boundaries().await?;
        tracing::info!("✓ Loaded {} Florida counties", boundaries.len());

        let branches = registry::florida_branches();
        tracing::debug!("Branch registry holds {} branches", branches.len());

        Ok(SourceData {
            boundaries,
            branches,
        })
    }

    async fn transform(&self, data: SourceData) -> Result<OverlayData> {
        let SourceData {
            boundaries,
            branches,
        } = data;

        tracing::info!("🌐 Geocoding {} branch addresses...", branches.len());
        let batch = self
            .geocoder
            .geocode_branches(branches, self.progress.as_ref())
            .await;

        Ok(OverlayData {
            boundaries,
            located: batch.located,
            failed: batch.failed,
        })
    }

    async fn load(&self, data: OverlayData) -> Result<String> {
        tracing::info!("🗺️ Creating interactive map...");
        let html = self.renderer.render(&data.boundaries, &data.located)?;

        tracing::debug!("Writing map ({} bytes) to storage", html.len());
        self.storage
            .write_file(&self.output_file, html.as_bytes())
            .await?;

        Ok(self.storage.location_of(&self.output_file))
    }
}
