use crate::core::{Pipeline, RunSummary};
use crate::utils::error::{MapError, Result};
use crate::utils::monitor::SystemMonitor;

pub struct MapEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting map generation...");

        // Extract
        tracing::info!("📥 Downloading Florida county boundaries...");
        let source = self.pipeline.extract().await?;
        self.monitor.log_stage("Boundaries");

        // Transform
        let attempted = source.branches.len();
        let overlay = self.pipeline.transform(source).await?;
        tracing::info!(
            "Geocoded {}/{} branches",
            overlay.located.len(),
            attempted
        );
        self.monitor.log_stage("Geocoding");

        if overlay.located.is_empty() {
            return Err(MapError::NoBranchesGeocoded { attempted });
        }

        let county_count = overlay.boundaries.len();
        let branch_count = overlay.located.len();
        let failed = overlay.failed.clone();

        // Load
        let output_path = self.pipeline.load(overlay).await?;
        self.monitor.log_stage("Rendering");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            county_count,
            branch_count,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OverlayData, SourceData};
    use crate::domain::model::{
        BoundarySet, Branch, Coordinates, CountyBoundary, FailedBranch,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct FakePipeline {
        geocode_nothing: bool,
        loads: Arc<AtomicUsize>,
    }

    fn county(name: &str) -> CountyBoundary {
        CountyBoundary {
            name: name.to_string(),
            name_lsad: Some(format!("{} County", name)),
            geoid: "12086".to_string(),
            polygons: vec![vec![vec![[-80.9, 25.1], [-80.4, 25.1], [-80.4, 25.6], [-80.9, 25.1]]]],
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for FakePipeline {
        async fn extract(&self) -> Result<SourceData> {
            Ok(SourceData {
                boundaries: BoundarySet::new(vec![county("Miami-Dade"), county("Broward")]),
                branches: vec![
                    Branch::new("Miami", "14202 SW 142nd Ave, Miami, FL 33186"),
                    Branch::new("Nowhere", "0 Timeout Way"),
                ],
            })
        }

        async fn transform(&self, data: SourceData) -> Result<OverlayData> {
            let mut branches = data.branches.into_iter();
            let miami = branches.next().unwrap();
            let nowhere = branches.next().unwrap();

            let (located, failed) = if self.geocode_nothing {
                (vec![], vec![miami, nowhere])
            } else {
                (
                    vec![miami.locate(Coordinates::new(25.65, -80.43).unwrap())],
                    vec![nowhere],
                )
            };

            Ok(OverlayData {
                boundaries: data.boundaries,
                located,
                failed: failed
                    .into_iter()
                    .map(|branch| FailedBranch {
                        branch,
                        reason: "gave up after 3 attempts: request timed out".to_string(),
                    })
                    .collect(),
            })
        }

        async fn load(&self, _data: OverlayData) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok("./fortiline_florida_map.html".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reports_counts_and_failures() {
        let pipeline = FakePipeline::default();
        let engine = MapEngine::new(pipeline.clone());

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.output_path, "./fortiline_florida_map.html");
        assert_eq!(summary.county_count, 2);
        assert_eq!(summary.branch_count, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].branch.name, "Nowhere");
        assert_eq!(pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_successes_abort_before_load() {
        let pipeline = FakePipeline {
            geocode_nothing: true,
            ..FakePipeline::default()
        };
        let engine = MapEngine::new(pipeline.clone());

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, MapError::NoBranchesGeocoded { attempted: 2 }));
        assert_eq!(pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
