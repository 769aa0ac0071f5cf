//! Confidence classification and risk scoring for upgrade candidates.
//!
//! Kept pure so the resolver's ranking decisions are testable without
//! any registry or vulnerability-source traffic.

use super::version_compare;
use crate::risk_analysis::domain::{Confidence, Severity, Vulnerability};

/// Fixed credit subtracted per vulnerability the upgrade resolves.
const FIX_CREDIT: f64 = 3.0;

/// Fixed penalty added when the upgrade crosses a major version.
const BREAKING_PENALTY: f64 = 5.0;

fn current_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 10.0,
        Severity::High => 5.0,
        Severity::Medium => 2.0,
        Severity::Low => 1.0,
    }
}

fn introduced_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 8.0,
        Severity::High => 4.0,
        Severity::Medium => 2.0,
        Severity::Low => 1.0,
    }
}

/// Classifies how directly `target` is known to resolve the given
/// vulnerabilities.
pub fn classify_confidence(
    current: &str,
    target: &str,
    vulnerabilities: &[Vulnerability],
) -> Confidence {
    let directly_patched = vulnerabilities
        .iter()
        .any(|v| v.patched_versions.iter().any(|p| p == target));
    if directly_patched {
        Confidence::High
    } else if version_compare::same_major_version(current, target) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Aggregates a non-negative risk score for an upgrade decision.
///
/// Weighted severity points for every current vulnerability, minus a
/// fixed credit per vulnerability the upgrade resolves, plus weighted
/// points for vulnerabilities the target itself carries, plus a flat
/// penalty for breaking upgrades, floored at zero. The score trends
/// downward as more current vulnerabilities are fixed and upward as
/// breaking changes or newly introduced vulnerabilities appear.
pub fn compute_risk_score(
    current_vulnerabilities: &[Vulnerability],
    fixed_count: usize,
    new_vulnerabilities: &[Vulnerability],
    is_breaking: bool,
) -> f64 {
    let mut score: f64 = current_vulnerabilities
        .iter()
        .map(|v| current_weight(v.severity))
        .sum();

    score -= FIX_CREDIT * fixed_count as f64;

    score += new_vulnerabilities
        .iter()
        .map(|v| introduced_weight(v.severity))
        .sum::<f64>();

    if is_breaking {
        score += BREAKING_PENALTY;
    }

    score.max(0.0)
}
