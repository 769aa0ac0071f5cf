use crate::ports::outbound::PackageRegistry;
use crate::risk_analysis::domain::{Maintainer, PackageInfo};
use crate::shared::{Result, ScanError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Lifecycle hooks the registry runs around installation; other script
/// entries (test, build, ...) never execute on install and are not
/// interesting to the script heuristic.
const LIFECYCLE_HOOKS: &[&str] = &[
    "preinstall",
    "install",
    "postinstall",
    "preuninstall",
    "postuninstall",
    "prepublish",
    "prepare",
];

/// npm registry metadata client.
///
/// Maps the full registry document (`GET /{package}`) onto the
/// `PackageInfo` shape the heuristics consume. Partial documents are
/// tolerated: missing `time`, `maintainers`, or `scripts` blocks map to
/// empty collections.
pub struct NpmRegistryClient {
    client: reqwest::Client,
    registry_url: String,
}

impl NpmRegistryClient {
    const REGISTRY_URL: &'static str = "https://registry.npmjs.org";

    pub fn new(timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("dep-sentry/{}", version);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            registry_url: Self::REGISTRY_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    /// Encodes a package name as an npm registry path segment. Scoped
    /// names keep the leading `@` with the scope separator encoded, the
    /// form the registry expects.
    fn encode_name(package_name: &str) -> Result<String> {
        validate_url_component(package_name)?;
        if let Some(rest) = package_name.strip_prefix('@') {
            match rest.split_once('/') {
                Some((scope, name)) => Ok(format!(
                    "@{}%2F{}",
                    urlencoding::encode(scope),
                    urlencoding::encode(name)
                )),
                None => Ok(format!("@{}", urlencoding::encode(rest))),
            }
        } else {
            Ok(urlencoding::encode(package_name).into_owned())
        }
    }

    fn convert(document: RegistryDocument, package_name: &str) -> PackageInfo {
        let mut info = PackageInfo::new(package_name);

        for (version, manifest) in document.versions {
            let scripts: HashMap<String, String> = manifest
                .scripts
                .into_iter()
                .filter(|(hook, _)| LIFECYCLE_HOOKS.contains(&hook.as_str()))
                .collect();
            if !scripts.is_empty() {
                info.install_scripts.insert(version.clone(), scripts);
            }
            info.published_versions.push(version);
        }
        info.published_versions.sort();

        info.maintainers = document
            .maintainers
            .into_iter()
            .map(|m| Maintainer::new(m.name, m.email.unwrap_or_default()))
            .collect();

        // The time block also carries "created"/"modified" entries; only
        // keys naming a published version are publish timestamps.
        info.publish_timestamps = document
            .time
            .into_iter()
            .filter(|(key, _)| info.published_versions.contains(key))
            .collect();

        info
    }
}

#[async_trait]
impl PackageRegistry for NpmRegistryClient {
    async fn get_package_info(&self, package_name: &str) -> Result<PackageInfo> {
        let url = format!(
            "{}/{}",
            self.registry_url,
            Self::encode_name(package_name)?
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ScanError::RegistryStatus {
                package_name: package_name.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let document: RegistryDocument = response.json().await?;
        Ok(Self::convert(document, package_name))
    }
}

/// Rejects package names that could escape the registry path.
fn validate_url_component(component: &str) -> Result<()> {
    if component.is_empty() {
        return Err(ScanError::InvalidUrlComponent {
            component_type: "package name".to_string(),
            reason: "empty".to_string(),
        }
        .into());
    }
    if component.contains("..") || component.contains('\\') {
        return Err(ScanError::InvalidUrlComponent {
            component_type: "package name".to_string(),
            reason: "contains path traversal characters".to_string(),
        }
        .into());
    }
    if component.contains('#') || component.contains('?') || component.contains(char::is_whitespace)
    {
        return Err(ScanError::InvalidUrlComponent {
            component_type: "package name".to_string(),
            reason: "contains URL-unsafe characters".to_string(),
        }
        .into());
    }
    Ok(())
}

// npm registry document structures

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    versions: HashMap<String, VersionManifest>,
    #[serde(default)]
    maintainers: Vec<RegistryMaintainer>,
    #[serde(default)]
    time: HashMap<String, DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct VersionManifest {
    #[serde(default)]
    scripts: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RegistryMaintainer {
    name: String,
    #[serde(default)]
    email: Option<String>,
}
