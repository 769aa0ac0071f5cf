use crate::ports::outbound::{PackageRegistry, VulnerabilitySource};
use crate::risk_analysis::domain::{Dependency, Severity, UpgradePath, Vulnerability};
use crate::risk_analysis::services::{
    merge_vulnerabilities, upgrade_scoring, version_compare,
};
use std::collections::HashMap;
use std::sync::Arc;

/// UpgradeResolver - computes the safest available upgrade for a
/// vulnerable package.
///
/// The selection policy is "smallest step that still closes the
/// vulnerability", not "latest available": among patched versions
/// strictly greater than the current one, the highest non-breaking
/// candidate wins; only when no non-breaking candidate exists does the
/// resolver fall back to the lowest breaking one.
///
/// # Type Parameters
/// * `R` - PackageRegistry implementation
pub struct UpgradeResolver<R: PackageRegistry> {
    registry: R,
    sources: Vec<Arc<dyn VulnerabilitySource>>,
}

impl<R: PackageRegistry> UpgradeResolver<R> {
    pub fn new(registry: R, sources: Vec<Arc<dyn VulnerabilitySource>>) -> Self {
        Self { registry, sources }
    }

    /// Resolves the best upgrade target for one package.
    ///
    /// Returns `None` when the registry has no versions, no published
    /// version is patched, or no patched version is strictly greater
    /// than `current_version` - "no safe upgrade" is an explicit
    /// result, never an error.
    pub async fn resolve(
        &self,
        package_name: &str,
        current_version: &str,
        vulnerabilities: &[Vulnerability],
    ) -> Option<UpgradePath> {
        let published = match self.registry.published_versions(package_name).await {
            Ok(versions) => versions,
            Err(error) => {
                tracing::warn!(package = %package_name, %error, "registry lookup failed during resolution");
                return None;
            }
        };
        if published.is_empty() {
            return None;
        }

        // Published versions that appear in any vulnerability's patched set.
        let fixed: Vec<&String> = published
            .iter()
            .filter(|version| {
                vulnerabilities
                    .iter()
                    .any(|vuln| vuln.patched_versions.iter().any(|p| p == *version))
            })
            .collect();
        if fixed.is_empty() {
            return None;
        }

        let candidates: Vec<&String> = fixed
            .into_iter()
            .filter(|version| version_compare::greater_than(version, current_version))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let (non_breaking, breaking): (Vec<&String>, Vec<&String>) = candidates
            .into_iter()
            .partition(|candidate| !version_compare::is_breaking_upgrade(current_version, candidate));

        let (target, is_breaking) = if let Some(highest) = pick_highest(&non_breaking) {
            (highest.clone(), false)
        } else {
            (pick_lowest(&breaking)?.clone(), true)
        };

        // Newly introduced issues at the target inform the risk score
        // only; they never block selection.
        let target_vulns = self.query_target(package_name, &target).await;
        let new_vulnerabilities: Vec<Vulnerability> = target_vulns
            .into_iter()
            .filter(|candidate| !vulnerabilities.iter().any(|v| v.id == candidate.id))
            .collect();

        let fixed_vulnerability_ids: Vec<String> = vulnerabilities
            .iter()
            .filter(|vuln| resolves(vuln, &target))
            .map(|vuln| vuln.id.clone())
            .collect();

        let confidence =
            upgrade_scoring::classify_confidence(current_version, &target, vulnerabilities);
        let risk_score = upgrade_scoring::compute_risk_score(
            vulnerabilities,
            fixed_vulnerability_ids.len(),
            &new_vulnerabilities,
            is_breaking,
        );

        Some(UpgradePath {
            package_name: package_name.to_string(),
            current_version: current_version.to_string(),
            target_version: target,
            is_breaking,
            fixed_vulnerability_ids,
            confidence,
            risk_score,
        })
    }

    /// Finds the highest version satisfying `range` that carries no
    /// critical-severity vulnerability.
    ///
    /// Walks satisfying versions from highest to lowest, querying the
    /// sources at each candidate; returns `None` when the range matches
    /// no published version or every candidate has a critical issue.
    pub async fn find_safe_version(&self, package_name: &str, range: &str) -> Option<String> {
        let published = match self.registry.published_versions(package_name).await {
            Ok(versions) => versions,
            Err(error) => {
                tracing::warn!(package = %package_name, %error, "registry lookup failed during safe-version search");
                return None;
            }
        };

        let in_range = version_compare::versions_in_range(&published, range);
        for candidate in in_range.iter().rev() {
            let vulns = self.query_target(package_name, candidate).await;
            if !vulns.iter().any(|v| v.severity == Severity::Critical) {
                return Some(candidate.clone());
            }
        }
        None
    }

    /// Resolves upgrades for every vulnerable package present in the
    /// dependency list.
    ///
    /// Vulnerable packages absent from the list (or lacking a resolved
    /// current version) are silently skipped: they cannot be resolved
    /// without a known current version. Vulnerabilities with no patched
    /// versions are excluded from the upgrade search.
    pub async fn resolve_all(
        &self,
        dependencies: &[Dependency],
        vulnerabilities: &[Vulnerability],
    ) -> Vec<UpgradePath> {
        let mut by_package: HashMap<&str, Vec<Vulnerability>> = HashMap::new();
        for vuln in vulnerabilities {
            if vuln.patched_versions.is_empty() {
                tracing::debug!(
                    vulnerability = %vuln.id,
                    package = %vuln.package_name,
                    "no patched versions, excluded from upgrade search"
                );
                continue;
            }
            by_package
                .entry(vuln.package_name.as_str())
                .or_default()
                .push(vuln.clone());
        }

        let mut paths = Vec::new();
        for dependency in dependencies {
            let Some(package_vulns) = by_package.get(dependency.name.as_str()) else {
                continue;
            };
            let Some(current) = dependency.resolved_version.as_deref() else {
                tracing::debug!(
                    package = %dependency.name,
                    "no resolved current version, skipping resolution"
                );
                continue;
            };
            if let Some(path) = self.resolve(&dependency.name, current, package_vulns).await {
                paths.push(path);
            }
        }
        paths
    }

    async fn query_target(&self, package_name: &str, version: &str) -> Vec<Vulnerability> {
        let mut merged = Vec::new();
        for source in &self.sources {
            match source.query(package_name, Some(version)).await {
                Ok(vulns) => merged = merge_vulnerabilities(merged, vulns),
                Err(error) => {
                    tracing::warn!(
                        source = source.source_name(),
                        package = %package_name,
                        %version,
                        %error,
                        "target-version query failed, treating as empty"
                    );
                }
            }
        }
        merged
    }
}

/// A vulnerability counts as resolved when the target is at or beyond
/// one of its declared patched versions.
fn resolves(vuln: &Vulnerability, target: &str) -> bool {
    vuln.patched_versions
        .iter()
        .any(|patched| patched == target || version_compare::greater_than(target, patched))
}

fn pick_highest<'a>(versions: &[&'a String]) -> Option<&'a String> {
    versions.iter().copied().reduce(|best, candidate| {
        if version_compare::greater_than(candidate, best) {
            candidate
        } else {
            best
        }
    })
}

fn pick_lowest<'a>(versions: &[&'a String]) -> Option<&'a String> {
    versions.iter().copied().reduce(|best, candidate| {
        if version_compare::greater_than(best, candidate) {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk_analysis::domain::{Confidence, PackageInfo, VulnSource};
    use crate::shared::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticRegistry {
        versions: HashMap<String, Vec<String>>,
    }

    impl StaticRegistry {
        fn with_versions(package: &str, versions: &[&str]) -> Self {
            let mut map = HashMap::new();
            map.insert(
                package.to_string(),
                versions.iter().map(|s| s.to_string()).collect(),
            );
            Self { versions: map }
        }
    }

    #[async_trait]
    impl PackageRegistry for StaticRegistry {
        async fn get_package_info(&self, package_name: &str) -> Result<PackageInfo> {
            let mut info = PackageInfo::new(package_name);
            info.published_versions = self
                .versions
                .get(package_name)
                .cloned()
                .unwrap_or_default();
            Ok(info)
        }
    }

    struct StaticSource {
        by_version: HashMap<String, Vec<Vulnerability>>,
    }

    impl StaticSource {
        fn empty() -> Self {
            Self {
                by_version: HashMap::new(),
            }
        }

        fn with_vuln_at(mut self, version: &str, id: &str, severity: Severity) -> Self {
            let vuln = Vulnerability::new(id, "pkg", version, severity, VulnSource::Osv);
            self.by_version
                .entry(version.to_string())
                .or_default()
                .push(vuln);
            self
        }
    }

    #[async_trait]
    impl VulnerabilitySource for StaticSource {
        fn source_name(&self) -> &'static str {
            "static"
        }

        async fn query(
            &self,
            _package_name: &str,
            version: Option<&str>,
        ) -> Result<Vec<Vulnerability>> {
            Ok(version
                .and_then(|v| self.by_version.get(v).cloned())
                .unwrap_or_default())
        }
    }

    fn vuln_with_patches(id: &str, severity: Severity, patched: &[&str]) -> Vulnerability {
        let mut vuln = Vulnerability::new(id, "pkg", "1.0.0", severity, VulnSource::Osv);
        vuln.patched_versions = patched.iter().map(|s| s.to_string()).collect();
        vuln
    }

    fn resolver(
        published: &[&str],
        source: StaticSource,
    ) -> UpgradeResolver<StaticRegistry> {
        UpgradeResolver::new(
            StaticRegistry::with_versions("pkg", published),
            vec![Arc::new(source)],
        )
    }

    #[tokio::test]
    async fn test_prefers_highest_non_breaking() {
        let vulns = vec![vuln_with_patches(
            "GHSA-1",
            Severity::High,
            &["1.0.1", "1.2.0", "2.0.0"],
        )];
        let resolver = resolver(&["1.0.0", "1.0.1", "1.2.0", "2.0.0"], StaticSource::empty());

        let path = resolver.resolve("pkg", "1.0.0", &vulns).await.unwrap();
        assert_eq!(path.target_version, "1.2.0");
        assert!(!path.is_breaking);
        assert!(version_compare::greater_than(
            &path.target_version,
            &path.current_version
        ));
    }

    #[tokio::test]
    async fn test_breaking_preference_scenario() {
        // Fixed {1.0.1, 2.0.0}, current 1.0.0: the non-breaking 1.0.1 wins.
        let vulns = vec![vuln_with_patches(
            "GHSA-1",
            Severity::High,
            &["1.0.1", "2.0.0"],
        )];
        let resolver = resolver(&["1.0.0", "1.0.1", "2.0.0"], StaticSource::empty());

        let path = resolver.resolve("pkg", "1.0.0", &vulns).await.unwrap();
        assert_eq!(path.target_version, "1.0.1");
        assert!(!path.is_breaking);
    }

    #[tokio::test]
    async fn test_breaking_fallback_picks_lowest_breaking() {
        let vulns = vec![vuln_with_patches(
            "GHSA-1",
            Severity::High,
            &["2.0.0", "3.0.0"],
        )];
        let resolver = resolver(&["1.0.0", "2.0.0", "3.0.0"], StaticSource::empty());

        let path = resolver.resolve("pkg", "1.0.0", &vulns).await.unwrap();
        assert_eq!(path.target_version, "2.0.0");
        assert!(path.is_breaking);
    }

    #[tokio::test]
    async fn test_no_result_when_fix_not_published() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        // 1.0.1 is patched but absent from the published set.
        let resolver = resolver(&["1.0.0"], StaticSource::empty());
        assert!(resolver.resolve("pkg", "1.0.0", &vulns).await.is_none());
    }

    #[tokio::test]
    async fn test_no_result_when_no_version_above_current() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        let resolver = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());
        assert!(resolver.resolve("pkg", "1.0.1", &vulns).await.is_none());
    }

    #[tokio::test]
    async fn test_no_result_on_empty_published_set() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        let resolver = resolver(&[], StaticSource::empty());
        assert!(resolver.resolve("pkg", "1.0.0", &vulns).await.is_none());
    }

    #[tokio::test]
    async fn test_confidence_high_for_declared_patched_target() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        let resolver = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());
        let path = resolver.resolve("pkg", "1.0.0", &vulns).await.unwrap();
        assert_eq!(path.confidence, Confidence::High);
        assert_eq!(path.fixed_vulnerability_ids, vec!["GHSA-1".to_string()]);
    }

    #[tokio::test]
    async fn test_new_vulnerabilities_at_target_raise_risk_not_block() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];

        let clean = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());
        let clean_path = clean.resolve("pkg", "1.0.0", &vulns).await.unwrap();

        let dirty_source =
            StaticSource::empty().with_vuln_at("1.0.1", "GHSA-NEW", Severity::Critical);
        let dirty = resolver(&["1.0.0", "1.0.1"], dirty_source);
        let dirty_path = dirty.resolve("pkg", "1.0.0", &vulns).await.unwrap();

        assert_eq!(dirty_path.target_version, "1.0.1");
        assert!(dirty_path.risk_score > clean_path.risk_score);
    }

    #[tokio::test]
    async fn test_find_safe_version_skips_critical_candidates() {
        let source = StaticSource::empty()
            .with_vuln_at("1.2.0", "GHSA-CRIT", Severity::Critical)
            .with_vuln_at("1.1.0", "GHSA-LOW", Severity::Low);
        let resolver = resolver(&["1.0.0", "1.1.0", "1.2.0"], source);

        let safe = resolver.find_safe_version("pkg", "^1.0.0").await;
        // 1.2.0 carries a critical issue; 1.1.0 only a low one.
        assert_eq!(safe.as_deref(), Some("1.1.0"));
    }

    #[tokio::test]
    async fn test_find_safe_version_none_when_all_critical() {
        let source = StaticSource::empty()
            .with_vuln_at("1.0.0", "GHSA-A", Severity::Critical)
            .with_vuln_at("1.1.0", "GHSA-B", Severity::Critical);
        let resolver = resolver(&["1.0.0", "1.1.0"], source);
        assert!(resolver.find_safe_version("pkg", "^1.0.0").await.is_none());
    }

    #[tokio::test]
    async fn test_find_safe_version_none_on_empty_range() {
        let resolver = resolver(&["1.0.0"], StaticSource::empty());
        assert!(resolver.find_safe_version("pkg", "^2.0.0").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_all_skips_packages_absent_from_dependency_list() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        let resolver = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());

        let deps = vec![Dependency::new("unrelated", "*").with_resolved_version("1.0.0")];
        assert!(resolver.resolve_all(&deps, &vulns).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_resolves_listed_packages() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &["1.0.1"])];
        let resolver = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());

        let deps = vec![Dependency::new("pkg", "^1.0.0").with_resolved_version("1.0.0")];
        let paths = resolver.resolve_all(&deps, &vulns).await;
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].target_version, "1.0.1");
    }

    #[tokio::test]
    async fn test_resolve_all_excludes_unpatched_vulnerabilities() {
        let vulns = vec![vuln_with_patches("GHSA-1", Severity::High, &[])];
        let resolver = resolver(&["1.0.0", "1.0.1"], StaticSource::empty());

        let deps = vec![Dependency::new("pkg", "^1.0.0").with_resolved_version("1.0.0")];
        assert!(resolver.resolve_all(&deps, &vulns).await.is_empty());
    }
}
