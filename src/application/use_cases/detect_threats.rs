use crate::config::ScanConfig;
use crate::ports::outbound::PackageRegistry;
use crate::risk_analysis::domain::{Dependency, PackageInfo, SupplyChainThreat};
use crate::risk_analysis::services::heuristics::{default_checks, ThreatCheck};
use chrono::Utc;
use futures::stream::{self, StreamExt};

/// ThreatDetector - runs the supply-chain heuristics over a dependency
/// list.
///
/// Registry metadata is prefetched concurrently (bounded by the batch
/// size); a package whose registry lookup fails is skipped for the
/// metadata-backed checks, logged at warning level, and still examined
/// by the metadata-free checks. The detector never errors for a
/// reachable-but-incomplete registry.
///
/// # Type Parameters
/// * `R` - PackageRegistry implementation
pub struct ThreatDetector<R: PackageRegistry> {
    registry: R,
    checks: Vec<Box<dyn ThreatCheck>>,
    batch_size: usize,
}

impl<R: PackageRegistry> ThreatDetector<R> {
    pub fn new(registry: R, checks: Vec<Box<dyn ThreatCheck>>, batch_size: usize) -> Self {
        Self {
            registry,
            checks,
            batch_size: batch_size.max(1),
        }
    }

    /// Builds a detector with the standard check set, reference lists
    /// taken from the configuration.
    pub fn with_default_checks(registry: R, config: &ScanConfig) -> Self {
        Self::new(
            registry,
            default_checks(
                config.popular_packages.clone(),
                config.trusted_packages.clone(),
            ),
            config.batch_size,
        )
    }

    /// Runs every check over every dependency, returning the combined
    /// findings. Findings are append-only and never merged.
    pub async fn detect(&self, dependencies: &[Dependency]) -> Vec<SupplyChainThreat> {
        let now = Utc::now();

        let fetched: Vec<(&Dependency, Option<PackageInfo>)> = stream::iter(dependencies)
            .map(|dependency| async move {
                let info = match self.registry.get_package_info(&dependency.name).await {
                    Ok(info) => Some(info),
                    Err(error) => {
                        tracing::warn!(
                            package = %dependency.name,
                            %error,
                            "registry lookup failed, skipping metadata checks for package"
                        );
                        None
                    }
                };
                (dependency, info)
            })
            .buffer_unordered(self.batch_size)
            .collect()
            .await;

        let mut threats = Vec::new();
        for (dependency, info) in &fetched {
            for check in &self.checks {
                let findings = check.check(dependency, info.as_ref(), now);
                if !findings.is_empty() {
                    tracing::debug!(
                        check = check.name(),
                        package = %dependency.name,
                        count = findings.len(),
                        "threat check produced findings"
                    );
                }
                threats.extend(findings);
            }
        }
        threats
    }
}
