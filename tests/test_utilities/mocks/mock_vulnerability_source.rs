use async_trait::async_trait;
use dep_sentry::prelude::*;
use std::collections::HashMap;

/// Mock VulnerabilitySource for testing
///
/// Vulnerabilities are keyed by `package@version`; queries without a
/// version fall back to the package name alone.
pub struct MockVulnerabilitySource {
    pub name: &'static str,
    pub vulnerabilities: HashMap<String, Vec<Vulnerability>>,
    pub should_fail: bool,
}

impl MockVulnerabilitySource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            vulnerabilities: HashMap::new(),
            should_fail: false,
        }
    }

    pub fn with_failure(name: &'static str) -> Self {
        Self {
            name,
            vulnerabilities: HashMap::new(),
            should_fail: true,
        }
    }

    pub fn with_vulnerability(mut self, package: &str, version: &str, vuln: Vulnerability) -> Self {
        self.vulnerabilities
            .entry(format!("{}@{}", package, version))
            .or_default()
            .push(vuln);
        self
    }
}

#[async_trait]
impl VulnerabilitySource for MockVulnerabilitySource {
    fn source_name(&self) -> &'static str {
        self.name
    }

    async fn query(
        &self,
        package_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<Vulnerability>> {
        if self.should_fail {
            anyhow::bail!("mock vulnerability source failure");
        }
        let key = match version {
            Some(version) => format!("{}@{}", package_name, version),
            None => package_name.to_string(),
        };
        Ok(self.vulnerabilities.get(&key).cloned().unwrap_or_default())
    }
}
