use crate::ports::outbound::VulnerabilitySource;
use crate::risk_analysis::domain::{Severity, VulnSource, Vulnerability};
use crate::shared::{Result, ScanError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Snyk vulnerability-database client (npm test endpoint).
///
/// Snyk requires an API token; constructing the client with a blank
/// token fails hard with `ScanError::MissingCredentials` - unlike
/// transient query failures, a misconfigured source means the caller's
/// intent cannot be honored at all.
pub struct SnykClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl SnykClient {
    const API_BASE: &'static str = "https://api.snyk.io/v1";

    pub fn new(token: &str, timeout: Duration) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ScanError::MissingCredentials {
                source_name: "Snyk".to_string(),
            }
            .into());
        }

        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("dep-sentry/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_base: Self::API_BASE.to_string(),
            token: token.to_string(),
        })
    }

    #[cfg(test)]
    fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn convert(issue: &SnykIssue, package_name: &str, version: &str) -> Vulnerability {
        let severity = Severity::parse_lenient(&issue.severity);
        let cve_id = issue
            .identifiers
            .as_ref()
            .and_then(|ids| ids.cve.first().cloned());

        Vulnerability {
            id: issue.id.clone(),
            package_name: package_name.to_string(),
            package_version: version.to_string(),
            severity,
            cvss_score: issue.cvss_score,
            cvss_vector: issue.cvssv3.clone(),
            title: issue.title.clone().unwrap_or_default(),
            description: issue.description.clone().unwrap_or_default(),
            cve_id,
            patched_versions: issue.fixed_in.clone(),
            vulnerable_version_ranges: issue
                .semver
                .as_ref()
                .map(|s| s.vulnerable.clone())
                .unwrap_or_default(),
            source: VulnSource::Snyk,
            references: issue
                .references
                .iter()
                .map(|reference| reference.url.clone())
                .collect(),
        }
    }
}

#[async_trait]
impl VulnerabilitySource for SnykClient {
    fn source_name(&self) -> &'static str {
        "snyk"
    }

    async fn query(
        &self,
        package_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<Vulnerability>> {
        // The test endpoint is version-scoped; without a version there
        // is nothing to test against.
        let Some(version) = version else {
            return Ok(Vec::new());
        };

        let url = format!(
            "{}/test/npm/{}/{}",
            self.api_base,
            urlencoding::encode(package_name),
            urlencoding::encode(version)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ScanError::SourceStatus {
                source_name: "Snyk".to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body: SnykTestResponse = response.json().await?;
        Ok(body
            .issues
            .vulnerabilities
            .iter()
            .map(|issue| Self::convert(issue, package_name, version))
            .collect())
    }
}

// Snyk API response structures

#[derive(Debug, Deserialize)]
struct SnykTestResponse {
    #[serde(default)]
    issues: SnykIssues,
}

#[derive(Debug, Default, Deserialize)]
struct SnykIssues {
    #[serde(default)]
    vulnerabilities: Vec<SnykIssue>,
}

#[derive(Debug, Deserialize)]
struct SnykIssue {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    severity: String,
    #[serde(default, rename = "cvssScore")]
    cvss_score: Option<f32>,
    #[serde(default, rename = "CVSSv3")]
    cvssv3: Option<String>,
    #[serde(default)]
    identifiers: Option<SnykIdentifiers>,
    #[serde(default, rename = "fixedIn")]
    fixed_in: Vec<String>,
    #[serde(default)]
    semver: Option<SnykSemver>,
    #[serde(default)]
    references: Vec<SnykReference>,
}

#[derive(Debug, Deserialize)]
struct SnykIdentifiers {
    #[serde(default, rename = "CVE")]
    cve: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SnykSemver {
    #[serde(default)]
    vulnerable: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SnykReference {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        let result = SnykClient::new("", Duration::from_secs(5));
        assert!(result.is_err());
        let error = result.err().unwrap();
        assert!(error.downcast_ref::<ScanError>().is_some());
    }

    #[test]
    fn test_whitespace_token_rejected() {
        assert!(SnykClient::new("   ", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_valid_token_accepted() {
        assert!(SnykClient::new("a-token", Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_query_without_version_is_empty() {
        let client = SnykClient::new("a-token", Duration::from_secs(5)).unwrap();
        let vulns = client.query("lodash", None).await.unwrap();
        assert!(vulns.is_empty());
    }

    #[test]
    fn test_issue_conversion() {
        let json = r#"{
            "id": "SNYK-JS-LODASH-567746",
            "title": "Prototype Pollution",
            "severity": "high",
            "cvssScore": 7.4,
            "CVSSv3": "CVSS:3.1/AV:N/AC:H/PR:N/UI:N/S:U/C:H/I:H/A:L",
            "identifiers": {"CVE": ["CVE-2020-8203"]},
            "fixedIn": ["4.17.16"],
            "semver": {"vulnerable": ["<4.17.16"]},
            "references": [{"url": "https://snyk.io/vuln/SNYK-JS-LODASH-567746"}]
        }"#;
        let issue: SnykIssue = serde_json::from_str(json).unwrap();
        let vuln = SnykClient::convert(&issue, "lodash", "4.17.15");

        assert_eq!(vuln.id, "SNYK-JS-LODASH-567746");
        assert_eq!(vuln.severity, Severity::High);
        assert_eq!(vuln.cvss_score, Some(7.4));
        assert_eq!(vuln.cve_id.as_deref(), Some("CVE-2020-8203"));
        assert_eq!(vuln.patched_versions, vec!["4.17.16".to_string()]);
        assert_eq!(vuln.vulnerable_version_ranges, vec!["<4.17.16".to_string()]);
        assert_eq!(vuln.source, VulnSource::Snyk);
    }

    #[test]
    fn test_response_deserialize_empty_body() {
        let body: SnykTestResponse = serde_json::from_str("{}").unwrap();
        assert!(body.issues.vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn test_query_unreachable_endpoint_errors() {
        let client = SnykClient::new("a-token", Duration::from_millis(100))
            .unwrap()
            .with_api_base("http://127.0.0.1:9/v1");
        assert!(client.query("lodash", Some("4.17.15")).await.is_err());
    }
}
