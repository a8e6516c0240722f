use florida_branch_map::adapters::clock::TokioSleeper;
use florida_branch_map::adapters::leaflet::LeafletRenderer;
use florida_branch_map::core::geocoder::{GeocodingClient, RetryPolicy};
use florida_branch_map::core::{BoundaryProvider, GeocodingService, Pipeline};
use florida_branch_map::domain::model::{BoundarySet, Coordinates, CountyBoundary};
use florida_branch_map::domain::ports::LookupError;
use florida_branch_map::{LocalStorage, MapEngine, MapError, OverlayPipeline, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

const OUTPUT_FILE: &str = "fortiline_florida_map.html";

struct FixedBoundaries;

impl BoundaryProvider for FixedBoundaries {
    async fn fetch_boundaries(&self) -> Result<BoundarySet> {
        Ok(BoundarySet::new(vec![
            county("Miami-Dade", "12086", -80.9, 25.1),
            county("Polk", "12105", -82.1, 27.6),
        ]))
    }
}

fn county(name: &str, geoid: &str, lon: f64, lat: f64) -> CountyBoundary {
    CountyBoundary {
        name: name.to_string(),
        name_lsad: Some(format!("{} County", name)),
        geoid: geoid.to_string(),
        polygons: vec![vec![vec![
            [lon, lat],
            [lon, lat + 0.5],
            [lon + 0.5, lat + 0.5],
            [lon + 0.5, lat],
            [lon, lat],
        ]]],
    }
}

/// Resolves only the addresses it knows; every other lookup times out.
#[derive(Default)]
struct KnownAddresses {
    known: HashMap<String, Coordinates>,
    calls: Mutex<HashMap<String, usize>>,
}

impl KnownAddresses {
    fn with(mut self, address: &str, lat: f64, lon: f64) -> Self {
        self.known
            .insert(address.to_string(), Coordinates::new(lat, lon).unwrap());
        self
    }

    fn calls_for(&self, address: &str) -> usize {
        self.calls.lock().unwrap().get(address).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl GeocodingService for KnownAddresses {
    async fn lookup(
        &self,
        address: &str,
        _timeout: Duration,
    ) -> std::result::Result<Option<Coordinates>, LookupError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default() += 1;

        match self.known.get(address) {
            Some(coords) => Ok(Some(*coords)),
            None => Err(LookupError::Transient("operation timed out".to_string())),
        }
    }
}

fn instant_policy() -> RetryPolicy {
    RetryPolicy {
        backoff_base: Duration::ZERO,
        not_found_delay: Duration::ZERO,
        request_interval: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

fn overlay_pipeline(
    dir: &TempDir,
    service: KnownAddresses,
) -> OverlayPipeline<LocalStorage, FixedBoundaries, KnownAddresses, TokioSleeper, LeafletRenderer>
{
    OverlayPipeline::new(
        LocalStorage::new(dir.path().to_string_lossy().to_string()),
        FixedBoundaries,
        GeocodingClient::new(service, TokioSleeper, instant_policy()),
        LeafletRenderer::default(),
        OUTPUT_FILE,
    )
    .with_progress(())
}

#[tokio::test]
async fn test_map_written_with_only_located_branches() {
    let temp_dir = TempDir::new().unwrap();
    let service = KnownAddresses::default()
        .with("14202 SW 142nd Ave, Miami, FL 33186", 25.6516, -80.4295)
        .with("1031 S 86th Street, Tampa, FL 33619", 27.9326, -82.3415);

    let engine = MapEngine::new(overlay_pipeline(&temp_dir, service));
    let summary = engine.run().await.unwrap();

    assert_eq!(summary.county_count, 2);
    assert_eq!(summary.branch_count, 2);
    assert_eq!(summary.failed.len(), 15);
    assert!(summary.failed.iter().all(|f| f.reason.contains("3 attempts")));

    let output = temp_dir.path().join(OUTPUT_FILE);
    assert!(output.exists());
    assert_eq!(summary.output_path, output.to_string_lossy());

    let html = std::fs::read_to_string(output).unwrap();
    assert_eq!(html.matches("\"type\":\"Feature\"").count(), 2);
    assert_eq!(html.matches("L.marker(").count(), 2);
    assert!(html.contains("Miami"));
    assert!(html.contains("Tampa"));
    assert!(!html.contains("Panama City"));
}

#[tokio::test]
async fn test_unknown_addresses_use_whole_attempt_budget() {
    let temp_dir = TempDir::new().unwrap();
    let service = KnownAddresses::default()
        .with("14202 SW 142nd Ave, Miami, FL 33186", 25.6516, -80.4295);
    let pipeline = overlay_pipeline(&temp_dir, service);

    let source = pipeline.extract().await.unwrap();
    assert_eq!(source.branches.len(), 17);

    let overlay = pipeline.transform(source).await.unwrap();
    assert_eq!(overlay.located.len(), 1);
    assert_eq!(overlay.located[0].name, "Miami");
    assert_eq!(overlay.failed.len(), 16);
}

#[tokio::test]
async fn test_call_counts_per_address() {
    let service = KnownAddresses::default()
        .with("14202 SW 142nd Ave, Miami, FL 33186", 25.6516, -80.4295);
    let client = GeocodingClient::new(service, TokioSleeper, instant_policy());

    let batch = client
        .geocode_branches(florida_branch_map::domain::registry::florida_branches(), &())
        .await;

    assert_eq!(batch.located.len(), 1);
    let service = client.service();
    assert_eq!(service.calls_for("14202 SW 142nd Ave, Miami, FL 33186"), 1);
    assert_eq!(service.calls_for("1417 Transmitter Rd, Fl 32401"), 3);
    assert_eq!(service.total_calls(), 1 + 16 * 3);
}

#[tokio::test]
async fn test_no_output_when_nothing_geocodes() {
    let temp_dir = TempDir::new().unwrap();
    let engine = MapEngine::new(overlay_pipeline(&temp_dir, KnownAddresses::default()));

    let err = engine.run().await.unwrap_err();

    assert!(matches!(err, MapError::NoBranchesGeocoded { attempted: 17 }));
    assert_ne!(err.exit_code(), 0);
    assert!(!temp_dir.path().join(OUTPUT_FILE).exists());
}
