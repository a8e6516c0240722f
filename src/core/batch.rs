use crate::core::geocoder::GeocodingClient;
use crate::core::progress::{GeocodeEvent, ProgressSink};
use crate::domain::model::{Branch, FailedBranch, LocatedBranch};
use crate::domain::ports::{GeocodingService, Sleeper};

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub located: Vec<LocatedBranch>,
    pub failed: Vec<FailedBranch>,
}

impl<G: GeocodingService, K: Sleeper> GeocodingClient<G, K> {
    /// Geocode branches one at a time. Failures are dropped into `failed`;
    /// `request_interval` is slept after every branch to respect the service's rate limit.
    pub async fn geocode_branches(
        &self,
        branches: Vec<Branch>,
        sink: &dyn ProgressSink,
    ) -> BatchOutcome {
        let total = branches.len();
        let mut outcome = BatchOutcome::default();

        for (i, branch) in branches.into_iter().enumerate() {
            sink.on_event(&GeocodeEvent::BranchStarted {
                index: i + 1,
                total,
                name: branch.name.clone(),
            });

            let result = self.geocode(&branch.address, sink).await;
            match (result.coordinates(), result.failure_reason()) {
                (Some(coordinates), _) => {
                    sink.on_event(&GeocodeEvent::Located {
                        name: branch.name.clone(),
                        coordinates,
                    });
                    outcome.located.push(branch.locate(coordinates));
                }
                (None, reason) => {
                    let reason = reason.unwrap_or_default();
                    sink.on_event(&GeocodeEvent::Failed {
                        name: branch.name.clone(),
                        address: branch.address.clone(),
                        reason: reason.clone(),
                    });
                    outcome.failed.push(FailedBranch { branch, reason });
                }
            }

            self.sleeper.sleep(self.policy.request_interval).await;
        }

        outcome
    }
}
