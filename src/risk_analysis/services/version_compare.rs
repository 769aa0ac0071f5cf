//! Semantic-version predicates over raw registry version strings.
//!
//! Every function here is total: malformed version or range strings
//! yield a defined false/empty/None result instead of an error, so
//! callers never have to branch on parse failures. The trade-off is
//! that malformed registry data is silently ignored; the aggregator
//! and resolver accept that and log at the fetch boundary instead.

use semver::{Version, VersionReq};

/// Lenient version parse. Registry data commonly carries a leading `v`
/// or `=`; strip those before handing off to the semver parser.
fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches(['v', '=']);
    Version::parse(trimmed).ok()
}

fn parse_range(raw: &str) -> Option<VersionReq> {
    VersionReq::parse(raw.trim()).ok()
}

/// True when `version` satisfies `range`. Malformed input yields false.
pub fn satisfies(version: &str, range: &str) -> bool {
    match (parse_version(version), parse_range(range)) {
        (Some(v), Some(r)) => r.matches(&v),
        _ => false,
    }
}

/// The highest version in `versions` satisfying `range`, if any.
pub fn max_satisfying(versions: &[String], range: &str) -> Option<String> {
    let req = parse_range(range)?;
    versions
        .iter()
        .filter_map(|raw| parse_version(raw).map(|v| (v, raw)))
        .filter(|(v, _)| req.matches(v))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}

/// True when `a` is strictly greater than `b` by semver ordering.
/// Malformed input yields false.
pub fn greater_than(a: &str, b: &str) -> bool {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

/// Classifies an upgrade as breaking when the major component increases.
///
/// Unparsable input is treated as breaking by policy: when we cannot
/// tell, fail safe and make the resolver prefer other candidates.
pub fn is_breaking_upgrade(from: &str, to: &str) -> bool {
    match (parse_version(from), parse_version(to)) {
        (Some(from), Some(to)) => to.major > from.major,
        _ => true,
    }
}

/// True when both versions parse and share a major component.
pub fn same_major_version(a: &str, b: &str) -> bool {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.major == b.major,
        _ => false,
    }
}

/// The subset of `versions` satisfying `range`, in ascending semver
/// order. Malformed entries and malformed ranges yield an empty or
/// reduced result.
pub fn versions_in_range(versions: &[String], range: &str) -> Vec<String> {
    let req = match parse_range(range) {
        Some(req) => req,
        None => return Vec::new(),
    };
    let mut matching: Vec<(Version, String)> = versions
        .iter()
        .filter_map(|raw| parse_version(raw).map(|v| (v, raw.clone())))
        .filter(|(v, _)| req.matches(v))
        .collect();
    matching.sort_by(|(a, _), (b, _)| a.cmp(b));
    matching.into_iter().map(|(_, raw)| raw).collect()
}
