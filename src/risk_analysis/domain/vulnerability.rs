use serde::{Deserialize, Serialize};

/// Vulnerability severity levels.
///
/// `Ord` follows the natural escalation order (low < medium < high <
/// critical) so that merging two records for the same vulnerability can
/// take the numeric maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a CVSS base score to a severity bucket (CVSS v3 ranges).
    pub fn from_cvss_score(score: f32) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Parses severity strings as used by OSV `database_specific` and
    /// Snyk payloads. Unknown values map to `Low` rather than failing,
    /// consistent with the engine's degrade-not-abort policy.
    pub fn parse_lenient(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "CRITICAL" => Severity::Critical,
            "HIGH" => Severity::High,
            "MODERATE" | "MEDIUM" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Which external source first reported a vulnerability.
///
/// Preserved under merging: enrichment from a second source never
/// rewrites the original attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VulnSource {
    Osv,
    Snyk,
    RegistryHeuristic,
}

/// A single vulnerability record for one package at one version.
///
/// `id` is source-qualified (e.g. "GHSA-...", "SNYK-JS-...") so records
/// from different sources never collide accidentally; `cve_id` is the
/// looser cross-source merge key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub package_name: String,
    pub package_version: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvss_vector: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,
    pub patched_versions: Vec<String>,
    pub vulnerable_version_ranges: Vec<String>,
    pub source: VulnSource,
    pub references: Vec<String>,
}

impl Vulnerability {
    /// Minimal constructor used by adapters and tests; optional fields
    /// start empty and are filled by the mapping code or during merge.
    pub fn new(
        id: impl Into<String>,
        package_name: impl Into<String>,
        package_version: impl Into<String>,
        severity: Severity,
        source: VulnSource,
    ) -> Self {
        Self {
            id: id.into(),
            package_name: package_name.into(),
            package_version: package_version.into(),
            severity,
            cvss_score: None,
            cvss_vector: None,
            title: String::new(),
            description: String::new(),
            cve_id: None,
            patched_versions: Vec::new(),
            vulnerable_version_ranges: Vec::new(),
            source,
            references: Vec::new(),
        }
    }
}
