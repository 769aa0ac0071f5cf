use crate::risk_analysis::domain::PackageInfo;
use crate::shared::Result;
use async_trait::async_trait;

/// PackageRegistry port for per-package registry metadata.
///
/// Abstracts the package registry (npm) behind the shape the engine
/// consumes: published versions, per-version install scripts,
/// maintainers, and publish timestamps.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Fetches the full metadata document for one package.
    ///
    /// # Errors
    /// Network failures and non-2xx responses propagate; callers
    /// degrade them to "no metadata for this package" and log.
    async fn get_package_info(&self, package_name: &str) -> Result<PackageInfo>;

    /// Convenience accessor for just the published version list.
    async fn published_versions(&self, package_name: &str) -> Result<Vec<String>> {
        Ok(self.get_package_info(package_name).await?.published_versions)
    }
}

// Lets callers share one client between the detector and the resolver.
#[async_trait]
impl<T: PackageRegistry + ?Sized> PackageRegistry for std::sync::Arc<T> {
    async fn get_package_info(&self, package_name: &str) -> Result<PackageInfo> {
        (**self).get_package_info(package_name).await
    }
}
