use crate::risk_analysis::domain::Vulnerability;
use crate::shared::Result;
use async_trait::async_trait;

/// VulnerabilitySource port for querying one vulnerability database.
///
/// Implementations wrap a concrete backend (OSV, Snyk, ...). They must
/// be `Send + Sync`: the aggregator fans queries out concurrently.
///
/// # Failure contract
/// A failed query is an error *for that one package/version pair*; the
/// aggregator recovers it as an empty result. Implementations should
/// fail fast rather than retry - retries belong to the HTTP client
/// collaborator, not this engine.
#[async_trait]
pub trait VulnerabilitySource: Send + Sync {
    /// Short name used for log attribution ("osv", "snyk", ...).
    fn source_name(&self) -> &'static str;

    /// Fetches vulnerabilities for one package, optionally scoped to a
    /// concrete version.
    async fn query(&self, package_name: &str, version: Option<&str>)
        -> Result<Vec<Vulnerability>>;

    /// Batch form as an optimization; the default implementation issues
    /// sequential single queries with the same per-item failure
    /// isolation (an item that errors contributes nothing).
    async fn query_batch(&self, packages: &[(String, String)]) -> Result<Vec<Vulnerability>> {
        let mut all = Vec::new();
        for (name, version) in packages {
            match self.query(name, Some(version)).await {
                Ok(mut vulns) => all.append(&mut vulns),
                Err(error) => {
                    tracing::warn!(
                        source = self.source_name(),
                        package = %name,
                        %error,
                        "vulnerability query failed, treating as empty"
                    );
                }
            }
        }
        Ok(all)
    }
}
