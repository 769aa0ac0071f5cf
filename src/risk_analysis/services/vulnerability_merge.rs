//! Pure merge/deduplication of vulnerability records from multiple
//! disagreeing sources.
//!
//! The primary identity key is `(package_name, id)`; ids are
//! source-qualified, so that key never produces cross-source false
//! merges. A deliberately looser secondary key merges records whose ids
//! differ but whose `cve_id` matches for the same package, covering the
//! common case of OSV and Snyk describing the same CVE under different
//! advisory ids.

use crate::risk_analysis::domain::Vulnerability;
use std::collections::HashMap;

/// Merges `incoming` records into `merged`, deduplicating per the
/// identity keys above. On collision the existing record is kept and
/// enriched in place:
///
/// - severity becomes the higher of the two
/// - references are appended if not already present
/// - absent optional scalars (`cvss_score`, `cvss_vector`, `cve_id`)
///   are filled from the incoming side; first-seen non-empty value wins
/// - patched versions and vulnerable ranges are unioned
/// - `source` is never overwritten, preserving first-seen provenance
///   for audit even after enrichment
pub fn merge_vulnerabilities(
    merged: Vec<Vulnerability>,
    incoming: Vec<Vulnerability>,
) -> Vec<Vulnerability> {
    // (package_name, id) -> index into out
    let mut by_id: HashMap<(String, String), usize> = HashMap::new();
    // (package_name, cve_id) -> index into out
    let mut by_cve: HashMap<(String, String), usize> = HashMap::new();
    let mut out: Vec<Vulnerability> = Vec::with_capacity(merged.len());

    for record in merged.into_iter().chain(incoming) {
        let primary = (record.package_name.clone(), record.id.clone());
        let secondary = record
            .cve_id
            .as_ref()
            .map(|cve| (record.package_name.clone(), cve.clone()));

        let existing = by_id.get(&primary).copied().or_else(|| {
            secondary
                .as_ref()
                .and_then(|key| by_cve.get(key))
                .copied()
        });

        match existing {
            Some(index) => {
                // Register the alias id too, so later copies of this
                // record dedupe by the primary key even without a cve id.
                by_id.entry(primary).or_insert(index);
                enrich(&mut out[index], record);
            }
            None => {
                let index = out.len();
                by_id.insert(primary, index);
                if let Some(key) = secondary {
                    by_cve.entry(key).or_insert(index);
                }
                out.push(record);
            }
        }
    }

    out
}

fn enrich(existing: &mut Vulnerability, incoming: Vulnerability) {
    existing.severity = existing.severity.max(incoming.severity);

    for reference in incoming.references {
        if !existing.references.contains(&reference) {
            existing.references.push(reference);
        }
    }
    for patched in incoming.patched_versions {
        if !existing.patched_versions.contains(&patched) {
            existing.patched_versions.push(patched);
        }
    }
    for range in incoming.vulnerable_version_ranges {
        if !existing.vulnerable_version_ranges.contains(&range) {
            existing.vulnerable_version_ranges.push(range);
        }
    }

    if existing.cvss_score.is_none() {
        existing.cvss_score = incoming.cvss_score;
    }
    if existing.cvss_vector.is_none() {
        existing.cvss_vector = incoming.cvss_vector;
    }
    if existing.cve_id.is_none() {
        existing.cve_id = incoming.cve_id;
    }
    if existing.title.is_empty() {
        existing.title = incoming.title;
    }
    if existing.description.is_empty() {
        existing.description = incoming.description;
    }
    // source intentionally untouched
}
