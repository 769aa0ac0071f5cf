use crate::ports::outbound::VulnerabilitySource;
use crate::risk_analysis::domain::{Severity, VulnSource, Vulnerability};
use crate::shared::{Result, ScanError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// OSV API client for the npm ecosystem.
///
/// Queries the OSV.dev query API per package/version. Failed requests
/// are not retried here - the aggregator treats a per-item failure as
/// an empty result, and retries belong to an outer HTTP policy if
/// anyone wants them.
pub struct OsvClient {
    client: reqwest::Client,
    api_url: String,
}

impl OsvClient {
    const API_ENDPOINT: &'static str = "https://api.osv.dev/v1/query";
    const ECOSYSTEM: &'static str = "npm";

    pub fn new(timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("dep-sentry/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url: Self::API_ENDPOINT.to_string(),
        })
    }

    #[cfg(test)]
    fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn convert(&self, osv: &OsvVulnerability, package_name: &str, version: &str) -> Vulnerability {
        let cvss_vector = osv.severity.as_ref().and_then(|entries| {
            entries
                .iter()
                .find(|s| s.severity_type == "CVSS_V3")
                .or_else(|| entries.iter().find(|s| s.severity_type == "CVSS_V4"))
                .map(|s| s.score.clone())
        });
        let cvss_score = cvss_vector.as_deref().and_then(cvss_base_score);

        // Severity fallback chain: CVSS score, then the database_specific
        // severity string, then Low.
        let severity = match cvss_score {
            Some(score) => Severity::from_cvss_score(score),
            None => osv
                .database_specific
                .as_ref()
                .and_then(|db| db.severity.as_deref())
                .map(Severity::parse_lenient)
                .unwrap_or(Severity::Low),
        };

        let cve_id = osv
            .aliases
            .iter()
            .find(|alias| alias.starts_with("CVE-"))
            .cloned();

        let mut patched_versions = Vec::new();
        let mut vulnerable_version_ranges = Vec::new();
        for affected in &osv.affected {
            if let Some(pkg) = &affected.package {
                if pkg.name != package_name {
                    continue;
                }
            }
            for range in affected.ranges.iter().flatten() {
                let mut introduced: Option<String> = None;
                for event in &range.events {
                    if let Some(v) = &event.introduced {
                        introduced = Some(v.clone());
                    }
                    if let Some(fixed) = &event.fixed {
                        if !patched_versions.contains(fixed) {
                            patched_versions.push(fixed.clone());
                        }
                        let lower = introduced.clone().unwrap_or_else(|| "0".to_string());
                        vulnerable_version_ranges.push(format!(">={}, <{}", lower, fixed));
                    }
                }
            }
        }

        let references = osv
            .references
            .iter()
            .map(|reference| reference.url.clone())
            .collect();

        Vulnerability {
            id: osv.id.clone(),
            package_name: package_name.to_string(),
            package_version: version.to_string(),
            severity,
            cvss_score,
            cvss_vector,
            title: osv.summary.clone().unwrap_or_default(),
            description: osv.details.clone().unwrap_or_default(),
            cve_id,
            patched_versions,
            vulnerable_version_ranges,
            source: VulnSource::Osv,
            references,
        }
    }
}

#[async_trait]
impl VulnerabilitySource for OsvClient {
    fn source_name(&self) -> &'static str {
        "osv"
    }

    async fn query(
        &self,
        package_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<Vulnerability>> {
        let query = OsvQuery {
            package: OsvPackage {
                name: package_name.to_string(),
                ecosystem: Self::ECOSYSTEM.to_string(),
            },
            version: version.map(|v| v.to_string()),
        };

        let response = self.client.post(&self.api_url).json(&query).send().await?;
        if !response.status().is_success() {
            return Err(ScanError::SourceStatus {
                source_name: "OSV".to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: OsvQueryResponse = response.json().await?;
        Ok(body
            .vulns
            .iter()
            .map(|osv| self.convert(osv, package_name, version.unwrap_or("")))
            .collect())
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvQuery {
    package: OsvPackage,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct OsvPackage {
    name: String,
    ecosystem: String,
}

#[derive(Debug, Deserialize)]
struct OsvQueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    severity: Option<Vec<OsvSeverity>>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
    #[serde(default)]
    affected: Vec<OsvAffected>,
    #[serde(default)]
    references: Vec<OsvReference>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    severity_type: String,
    score: String, // CVSS vector string
}

#[derive(Debug, Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvAffected {
    #[serde(default)]
    package: Option<OsvAffectedPackage>,
    #[serde(default)]
    ranges: Option<Vec<OsvRange>>,
}

#[derive(Debug, Deserialize)]
struct OsvAffectedPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OsvRange {
    events: Vec<OsvEvent>,
}

#[derive(Debug, Deserialize)]
struct OsvEvent {
    #[serde(default)]
    introduced: Option<String>,
    #[serde(default)]
    fixed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsvReference {
    url: String,
}

/// Computes the CVSS v3 base score from a vector string, e.g.
/// "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H" -> Some(9.8).
fn cvss_base_score(vector: &str) -> Option<f32> {
    let metrics: HashMap<&str, &str> = vector
        .split('/')
        .skip(1) // "CVSS:3.x"
        .filter_map(|part| {
            let mut split = part.split(':');
            Some((split.next()?, split.next()?))
        })
        .collect();

    let scope_changed = *metrics.get("S")? == "C";

    let av = lookup(metrics.get("AV")?, &[("N", 0.85), ("A", 0.62), ("L", 0.55), ("P", 0.2)])?;
    let ac = lookup(metrics.get("AC")?, &[("L", 0.77), ("H", 0.44)])?;
    let pr = match (*metrics.get("PR")?, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        _ => return None,
    };
    let ui = lookup(metrics.get("UI")?, &[("N", 0.85), ("R", 0.62)])?;

    let impact_values = &[("N", 0.0), ("L", 0.22), ("H", 0.56)];
    let c = lookup(metrics.get("C")?, impact_values)?;
    let i = lookup(metrics.get("I")?, impact_values)?;
    let a = lookup(metrics.get("A")?, impact_values)?;

    let iss = 1.0 - ((1.0 - c) * (1.0 - i) * (1.0 - a));
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02_f64).powi(15)
    } else {
        6.42 * iss
    };
    let exploitability = 8.22 * av * ac * pr * ui;

    let base = if impact <= 0.0 {
        0.0
    } else if scope_changed {
        f64::min(1.08 * (impact + exploitability), 10.0)
    } else {
        f64::min(impact + exploitability, 10.0)
    };

    // CVSS rounds up to one decimal place.
    Some(((base * 10.0).ceil() / 10.0) as f32)
}

fn lookup(value: &str, table: &[(&str, f64)]) -> Option<f64> {
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, score)| *score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(OsvClient::new(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_cvss_base_score_critical() {
        let score = cvss_base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").unwrap();
        assert!((9.0..=10.0).contains(&score));
    }

    #[test]
    fn test_cvss_base_score_high() {
        let score = cvss_base_score("CVSS:3.1/AV:N/AC:L/PR:L/UI:N/S:U/C:H/I:H/A:H").unwrap();
        assert!((7.0..9.0).contains(&score));
    }

    #[test]
    fn test_cvss_base_score_medium() {
        let score = cvss_base_score("CVSS:3.1/AV:N/AC:L/PR:L/UI:R/S:U/C:L/I:L/A:L").unwrap();
        assert!((4.0..7.0).contains(&score));
    }

    #[test]
    fn test_cvss_base_score_zero_impact() {
        let score = cvss_base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:N").unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_cvss_base_score_invalid_vector() {
        assert!(cvss_base_score("not a vector").is_none());
    }

    #[test]
    fn test_convert_maps_patched_versions_and_cve() {
        let json = r#"{
            "id": "GHSA-p6mc-m468-83gw",
            "summary": "Prototype pollution in lodash",
            "aliases": ["CVE-2020-8203"],
            "severity": [
                {"type": "CVSS_V3", "score": "CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:H/I:H/A:H"}
            ],
            "affected": [
                {
                    "package": {"name": "lodash"},
                    "ranges": [
                        {"events": [{"introduced": "3.7.0"}, {"fixed": "4.17.19"}]}
                    ]
                }
            ],
            "references": [{"url": "https://github.com/lodash/lodash/issues/4744"}]
        }"#;
        let osv: OsvVulnerability = serde_json::from_str(json).unwrap();
        let client = OsvClient::new(Duration::from_secs(5)).unwrap();
        let vuln = client.convert(&osv, "lodash", "4.17.15");

        assert_eq!(vuln.id, "GHSA-p6mc-m468-83gw");
        assert_eq!(vuln.cve_id.as_deref(), Some("CVE-2020-8203"));
        assert_eq!(vuln.patched_versions, vec!["4.17.19".to_string()]);
        assert_eq!(
            vuln.vulnerable_version_ranges,
            vec![">=3.7.0, <4.17.19".to_string()]
        );
        assert_eq!(vuln.source, VulnSource::Osv);
        assert_eq!(vuln.references.len(), 1);
        assert!(vuln.cvss_score.is_some());
    }

    #[test]
    fn test_convert_falls_back_to_database_specific_severity() {
        let json = r#"{
            "id": "GHSA-2xpw-w6gg-jr37",
            "database_specific": {"severity": "HIGH"}
        }"#;
        let osv: OsvVulnerability = serde_json::from_str(json).unwrap();
        let client = OsvClient::new(Duration::from_secs(5)).unwrap();
        let vuln = client.convert(&osv, "express", "4.0.0");
        assert_eq!(vuln.severity, Severity::High);
        assert!(vuln.cvss_score.is_none());
    }

    #[test]
    fn test_query_response_deserialize_empty() {
        let body: OsvQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.vulns.is_empty());
    }

    #[test]
    fn test_query_serializes_ecosystem_and_version() {
        let query = OsvQuery {
            package: OsvPackage {
                name: "express".to_string(),
                ecosystem: "npm".to_string(),
            },
            version: Some("4.17.1".to_string()),
        };
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"npm\""));
        assert!(json.contains("4.17.1"));
    }

    #[tokio::test]
    async fn test_query_unreachable_endpoint_errors() {
        // The aggregator degrades this error to an empty result; the
        // client itself must surface it.
        let client = OsvClient::new(Duration::from_millis(100))
            .unwrap()
            .with_api_url("http://127.0.0.1:9/v1/query");
        assert!(client.query("lodash", Some("4.17.15")).await.is_err());
    }
}
