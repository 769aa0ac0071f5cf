//! Maintainer-risk signals from registry metadata.

use super::ThreatCheck;
use crate::risk_analysis::domain::{
    Dependency, PackageInfo, Severity, SupplyChainThreat, ThreatKind,
};
use chrono::{DateTime, Utc};

/// Substrings that mark disposable or placeholder addresses.
const PLACEHOLDER_MARKERS: &[&str] = &["temp", "fake", "test", "example"];

/// Known throwaway-mail domains.
const THROWAWAY_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "trashmail.com",
    "dispostable.com",
    "yopmail.com",
];

/// Flags maintainer lists that look compromised or structurally risky.
///
/// Two independent signals: High severity for disposable/placeholder
/// maintainer emails, and Low severity for single-maintainer packages
/// outside the trusted reference set. Both may fire for one package.
pub struct MaintainerRiskCheck {
    trusted_packages: Vec<String>,
}

impl MaintainerRiskCheck {
    pub fn new(trusted_packages: Vec<String>) -> Self {
        Self { trusted_packages }
    }

    fn email_concern(email: &str) -> Option<String> {
        if !email.contains('@') {
            return Some(format!("email '{}' is missing an @", email));
        }
        let lowered = email.to_lowercase();
        for marker in PLACEHOLDER_MARKERS {
            if lowered.contains(marker) {
                return Some(format!("email '{}' contains placeholder marker '{}'", email, marker));
            }
        }
        if let Some(domain) = lowered.rsplit('@').next() {
            if THROWAWAY_DOMAINS.contains(&domain) {
                return Some(format!("email '{}' uses throwaway domain '{}'", email, domain));
            }
        }
        None
    }
}

impl ThreatCheck for MaintainerRiskCheck {
    fn name(&self) -> &'static str {
        "maintainer-risk"
    }

    fn check(
        &self,
        dependency: &Dependency,
        info: Option<&PackageInfo>,
        now: DateTime<Utc>,
    ) -> Vec<SupplyChainThreat> {
        let info = match info {
            Some(info) => info,
            None => return Vec::new(),
        };

        let mut threats = Vec::new();

        let concerns: Vec<String> = info
            .maintainers
            .iter()
            .filter_map(|m| {
                Self::email_concern(&m.email).map(|c| format!("maintainer '{}': {}", m.name, c))
            })
            .collect();

        if !concerns.is_empty() {
            threats.push(
                SupplyChainThreat::new(
                    ThreatKind::CompromisedMaintainer,
                    &dependency.name,
                    Severity::High,
                    format!(
                        "{} maintainer account(s) of {} use disposable or placeholder email addresses",
                        concerns.len(),
                        dependency.name
                    ),
                    now,
                )
                .with_evidence(concerns)
                .with_recommendations(vec![
                    "Verify the package's maintainers through out-of-band channels".to_string(),
                ]),
            );
        }

        if info.maintainers.len() == 1
            && !self.trusted_packages.iter().any(|t| t == &dependency.name)
        {
            threats.push(
                SupplyChainThreat::new(
                    ThreatKind::CompromisedMaintainer,
                    &dependency.name,
                    Severity::Low,
                    format!(
                        "{} has a single maintainer, a structural single point of compromise",
                        dependency.name
                    ),
                    now,
                )
                .with_evidence(vec![format!(
                    "sole maintainer: {}",
                    info.maintainers[0].name
                )])
                .with_recommendations(vec![
                    "Prefer packages with multiple active maintainers where possible".to_string(),
                ]),
            );
        }

        threats
    }
}
