use super::vulnerability::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categories of supply-chain attack indicators the detector can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThreatKind {
    Typosquatting,
    MaliciousScript,
    SuspiciousActivity,
    CompromisedMaintainer,
}

/// A single supply-chain finding for one package.
///
/// Findings are append-only: a package may accumulate many threats of
/// different kinds, and no two findings are ever merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyChainThreat {
    pub kind: ThreatKind,
    pub package_name: String,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<String>,
    pub recommendations: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

impl SupplyChainThreat {
    pub fn new(
        kind: ThreatKind,
        package_name: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            package_name: package_name.into(),
            severity,
            description: description.into(),
            evidence: Vec::new(),
            recommendations: Vec::new(),
            detected_at,
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }
}
