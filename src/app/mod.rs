// Application wiring: concrete adapters plugged into the overlay pipeline.

use crate::adapters::clock::TokioSleeper;
use crate::adapters::leaflet::LeafletRenderer;
use crate::adapters::nominatim::NominatimGeocoder;
use crate::adapters::storage::LocalStorage;
use crate::adapters::tiger::TigerCountyProvider;
use crate::config::MapConfig;
use crate::core::geocoder::GeocodingClient;
use crate::core::pipeline::OverlayPipeline;
use crate::utils::error::Result;

pub type DefaultPipeline = OverlayPipeline<
    LocalStorage,
    TigerCountyProvider,
    NominatimGeocoder,
    TokioSleeper,
    LeafletRenderer,
>;

pub fn build_pipeline(config: &MapConfig) -> Result<DefaultPipeline> {
    let storage = LocalStorage::new(config.output.directory.clone());
    let boundaries = TigerCountyProvider::new(
        config.boundaries.url.clone(),
        config.download_path(),
        config.download_timeout(),
    )?;
    let geocoder = GeocodingClient::new(
        NominatimGeocoder::new(config.geocoding.endpoint.clone(), &config.geocoding.user_agent)?,
        TokioSleeper,
        config.retry_policy(),
    );
    let renderer = LeafletRenderer::new(config.map_settings());

    Ok(OverlayPipeline::new(
        storage,
        boundaries,
        geocoder,
        renderer,
        config.output.filename.clone(),
    ))
}
