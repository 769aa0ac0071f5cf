use async_trait::async_trait;
use dep_sentry::prelude::*;

/// Mock PackageRegistry for testing
pub struct MockPackageRegistry {
    pub packages: Vec<PackageInfo>,
    pub should_fail: bool,
}

impl MockPackageRegistry {
    pub fn new() -> Self {
        Self {
            packages: Vec::new(),
            should_fail: false,
        }
    }

    pub fn with_failure() -> Self {
        Self {
            packages: Vec::new(),
            should_fail: true,
        }
    }

    pub fn with_package(mut self, info: PackageInfo) -> Self {
        self.packages.push(info);
        self
    }

    pub fn with_versions(mut self, package: &str, versions: &[&str]) -> Self {
        let mut info = PackageInfo::new(package);
        info.published_versions = versions.iter().map(|s| s.to_string()).collect();
        self.packages.push(info);
        self
    }
}

impl Default for MockPackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageRegistry for MockPackageRegistry {
    async fn get_package_info(&self, package_name: &str) -> Result<PackageInfo> {
        if self.should_fail {
            anyhow::bail!("mock registry failure");
        }
        self.packages
            .iter()
            .find(|info| info.name == package_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("package {} not found in mock registry", package_name))
    }
}
