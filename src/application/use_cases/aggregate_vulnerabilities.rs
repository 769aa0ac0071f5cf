use crate::ports::outbound::VulnerabilitySource;
use crate::risk_analysis::domain::{Dependency, Vulnerability};
use crate::risk_analysis::services::merge_vulnerabilities;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// VulnerabilityAggregator - queries every configured source for every
/// dependency and merges the results into one deduplicated set.
///
/// Dependencies are partitioned into fixed-size batches; within a batch
/// each (dependency, source) query runs concurrently. A single query's
/// failure is recovered as "zero vulnerabilities from this source for
/// this dependency" and never aborts the batch or the scan, so a scan
/// that cannot reach one source still reports results from the others.
///
/// Sources are trait objects because the set is heterogeneous: OSV is
/// always present, Snyk only when a token is configured.
pub struct VulnerabilityAggregator {
    sources: Vec<Arc<dyn VulnerabilitySource>>,
    batch_size: usize,
}

impl VulnerabilityAggregator {
    pub fn new(sources: Vec<Arc<dyn VulnerabilitySource>>, batch_size: usize) -> Self {
        Self {
            sources,
            batch_size: batch_size.max(1),
        }
    }

    /// Aggregates vulnerabilities for the whole dependency list.
    ///
    /// The returned collection is order-irrelevant; no stable ordering
    /// is guaranteed or required downstream.
    pub async fn aggregate(&self, dependencies: &[Dependency]) -> Vec<Vulnerability> {
        let mut merged: Vec<Vulnerability> = Vec::new();

        for batch in dependencies.chunks(self.batch_size) {
            let queries = batch.iter().flat_map(|dependency| {
                self.sources
                    .iter()
                    .cloned()
                    .map(move |source| (dependency, source))
            });

            let results: Vec<Vec<Vulnerability>> = stream::iter(queries)
                .map(|(dependency, source)| async move {
                    query_one(source.as_ref(), dependency).await
                })
                .buffer_unordered(self.batch_size)
                .collect()
                .await;

            for result in results {
                merged = merge_vulnerabilities(merged, result);
            }
            tracing::debug!(
                batch_len = batch.len(),
                running_total = merged.len(),
                "aggregated vulnerability batch"
            );
        }

        merged
    }

    /// Queries all sources for a single package/version pair, merged,
    /// with the same per-source failure isolation as `aggregate`.
    pub async fn query_package(&self, package_name: &str, version: &str) -> Vec<Vulnerability> {
        let mut merged: Vec<Vulnerability> = Vec::new();
        for source in &self.sources {
            match source.query(package_name, Some(version)).await {
                Ok(vulns) => merged = merge_vulnerabilities(merged, vulns),
                Err(error) => {
                    tracing::warn!(
                        source = source.source_name(),
                        package = %package_name,
                        %version,
                        %error,
                        "source query failed, treating as empty"
                    );
                }
            }
        }
        merged
    }
}

async fn query_one(
    source: &dyn VulnerabilitySource,
    dependency: &Dependency,
) -> Vec<Vulnerability> {
    match source
        .query(&dependency.name, dependency.resolved_version.as_deref())
        .await
    {
        Ok(vulns) => vulns,
        Err(error) => {
            tracing::warn!(
                source = source.source_name(),
                package = %dependency.name,
                %error,
                "source query failed, treating as empty"
            );
            Vec::new()
        }
    }
}
