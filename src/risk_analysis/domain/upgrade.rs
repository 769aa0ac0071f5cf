use serde::{Deserialize, Serialize};

/// How directly an upgrade target is known to resolve a vulnerability.
///
/// `High`: the target is literally one of a vulnerability's declared
/// patched versions. `Medium`: the target stays within the current major
/// version. `Low`: a major bump with no direct patched-version match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The computed upgrade recommendation for one vulnerable package.
///
/// Computed fresh per resolution call and never cached; it is stale the
/// instant the registry publishes a new version. `target_version` is
/// always strictly greater than `current_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradePath {
    pub package_name: String,
    pub current_version: String,
    pub target_version: String,
    pub is_breaking: bool,
    pub fixed_vulnerability_ids: Vec<String>,
    pub confidence: Confidence,
    pub risk_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_path_roundtrip() {
        let path = UpgradePath {
            package_name: "lodash".to_string(),
            current_version: "4.17.20".to_string(),
            target_version: "4.17.21".to_string(),
            is_breaking: false,
            fixed_vulnerability_ids: vec!["GHSA-35jh-r3h4-6jhm".to_string()],
            confidence: Confidence::High,
            risk_score: 2.0,
        };
        let json = serde_json::to_string(&path).unwrap();
        let back: UpgradePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
    }
}
