//! Time-window analysis of registry publish activity.

use super::ThreatCheck;
use crate::risk_analysis::domain::{
    Dependency, PackageInfo, Severity, SupplyChainThreat, ThreatKind,
};
use chrono::{DateTime, Duration, Utc};

/// More than this many versions inside the trailing 24-hour window is
/// considered a publish burst.
const BURST_THRESHOLD: usize = 5;

/// A package with a single version younger than this is flagged as
/// brand new.
const NEW_PACKAGE_WINDOW_DAYS: i64 = 7;

/// Flags anomalous publish activity: rapid version bursts (a common
/// tail of account takeovers) and brand-new single-version packages.
/// The two triggers are independent; a package can produce zero, one,
/// or both findings.
pub struct PublishActivityCheck;

impl PublishActivityCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PublishActivityCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatCheck for PublishActivityCheck {
    fn name(&self) -> &'static str {
        "publish-activity"
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

        let window_start = now - Duration::hours(24);
        let recent: Vec<&String> = info
            .publish_timestamps
            .iter()
            .filter(|(_, published)| **published > window_start && **published <= now)
            .map(|(version, _)| version)
            .collect();

        if recent.len() > BURST_THRESHOLD {
            threats.push(
                SupplyChainThreat::new(
                    ThreatKind::SuspiciousActivity,
                    &dependency.name,
                    Severity::Medium,
                    format!(
                        "{} versions of {} were published within the last 24 hours",
                        recent.len(),
                        dependency.name
                    ),
                    now,
                )
                .with_evidence(vec![format!(
                    "{} versions published since {}",
                    recent.len(),
                    window_start.to_rfc3339()
                )])
                .with_recommendations(vec![
                    "Review the recent releases for unexpected changes".to_string(),
                    "Pin the dependency to a version published before the burst".to_string(),
                ]),
            );
        }

        if info.published_versions.len() == 1 {
            let only_version = &info.published_versions[0];
            if let Some(published) = info.publish_timestamps.get(only_version) {
                let age = now.signed_duration_since(*published);
                if age <= Duration::days(NEW_PACKAGE_WINDOW_DAYS) {
                    threats.push(
                        SupplyChainThreat::new(
                            ThreatKind::SuspiciousActivity,
                            &dependency.name,
                            Severity::Medium,
                            format!(
                                "{} is a brand-new package with a single published version",
                                dependency.name
                            ),
                            now,
                        )
                        .with_evidence(vec![format!(
                            "only version {} published at {}",
                            only_version,
                            published.to_rfc3339()
                        )])
                        .with_recommendations(vec![
                            "Treat very new packages with extra scrutiny".to_string(),
                        ]),
                    );
                }
            }
        }

        threats
    }
}
