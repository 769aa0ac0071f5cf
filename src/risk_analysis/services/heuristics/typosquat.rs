//! Typosquatting detection against a reference set of widely-used
//! package names.

use super::ThreatCheck;
use crate::risk_analysis::domain::{
    Dependency, PackageInfo, Severity, SupplyChainThreat, ThreatKind,
};
use chrono::{DateTime, Utc};

/// Visually-confusable substring pairs tested in both directions.
const CONFUSABLE_PAIRS: &[(&str, &str)] = &[("l", "1"), ("o", "0"), ("rn", "m"), ("vv", "w")];

/// Flags dependency names one "typo edit" away from a reference name.
///
/// The reference set is injected so it can be extended without touching
/// the detector logic. Names in the reference set are always exempt,
/// even when they would otherwise match another reference entry.
pub struct TyposquatCheck {
    reference_names: Vec<String>,
}

impl TyposquatCheck {
    pub fn new(reference_names: Vec<String>) -> Self {
        Self { reference_names }
    }

    /// Tests the candidate against one reference name, returning a
    /// human-readable description of the first matching edit.
    fn resembles(candidate: &str, reference: &str) -> Option<&'static str> {
        if single_substitution(candidate, reference) {
            return Some("single character substitution");
        }
        if single_insertion_or_omission(candidate, reference) {
            return Some("single character insertion or omission");
        }
        if adjacent_transposition(candidate, reference) {
            return Some("adjacent character transposition");
        }
        if confusable_substitution(candidate, reference) {
            return Some("visually confusable characters");
        }
        None
    }
}

impl ThreatCheck for TyposquatCheck {
    fn name(&self) -> &'static str {
        "typosquat"
    }

    fn check(
        &self,
        dependency: &Dependency,
        _info: Option<&PackageInfo>,
        now: DateTime<Utc>,
    ) -> Vec<SupplyChainThreat> {
        let candidate = dependency.name.as_str();
        if self.reference_names.iter().any(|r| r == candidate) {
            return Vec::new();
        }

        // First match wins; no multi-evidence accumulation.
        for reference in &self.reference_names {
            if let Some(edit) = Self::resembles(candidate, reference) {
                let threat = SupplyChainThreat::new(
                    ThreatKind::Typosquatting,
                    candidate,
                    Severity::High,
                    format!(
                        "Package name '{}' closely resembles the popular package '{}'",
                        candidate, reference
                    ),
                    now,
                )
                .with_evidence(vec![format!("resembles '{}' ({})", reference, edit)])
                .with_recommendations(vec![
                    format!("Verify that '{}' is the package you intended to install", candidate),
                    format!("If you meant '{}', replace the dependency", reference),
                ]);
                return vec![threat];
            }
        }

        Vec::new()
    }
}

/// Equal length, exactly one character differs.
fn single_substitution(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() != b.len() {
        return false;
    }
    let differing = a.iter().zip(&b).filter(|(x, y)| x != y).count();
    differing == 1
}

/// One side is the other with exactly one character removed, tested at
/// every position.
fn single_insertion_or_omission(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() + 1 == b.len() {
        (a, b)
    } else if b.len() + 1 == a.len() {
        (b, a)
    } else {
        return false;
    };

    for skip in 0..longer.len() {
        let without: Vec<char> = longer
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, c)| *c)
            .collect();
        if without == shorter {
            return true;
        }
    }
    false
}

/// Equal length, exactly one adjacent pair swapped.
fn adjacent_transposition(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() != b.len() {
        return false;
    }
    for i in 0..a.len().saturating_sub(1) {
        // Swapping two equal characters would "match" the unchanged name.
        if a[i] == a[i + 1] {
            continue;
        }
        let mut swapped = a.clone();
        swapped.swap(i, i + 1);
        if swapped == b {
            return true;
        }
    }
    false
}

/// Substituting a confusable substring at any single occurrence yields
/// the reference name.
fn confusable_substitution(candidate: &str, reference: &str) -> bool {
    for &(left, right) in CONFUSABLE_PAIRS {
        if substituting_once_matches(candidate, left, right, reference)
            || substituting_once_matches(candidate, right, left, reference)
        {
            return true;
        }
    }
    false
}

fn substituting_once_matches(candidate: &str, from: &str, to: &str, reference: &str) -> bool {
    let mut search = 0;
    while let Some(offset) = candidate[search..].find(from) {
        let index = search + offset;
        let mut replaced = String::with_capacity(candidate.len());
        replaced.push_str(&candidate[..index]);
        replaced.push_str(to);
        replaced.push_str(&candidate[index + from.len()..]);
        if replaced == reference {
            return true;
        }
        // Advance by one character so overlapping occurrences are tried too.
        match candidate[index..].chars().next() {
            Some(ch) => search = index + ch.len_utf8(),
            None => break,
        }
    }
    false
}
