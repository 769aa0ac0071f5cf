//! Pure domain services: no I/O, fully deterministic, tested in
//! isolation. The use-case layer composes these with the outbound
//! ports.

pub mod heuristics;
pub mod upgrade_scoring;
pub mod version_compare;
pub mod vulnerability_merge;

pub use heuristics::{default_checks, ThreatCheck};
pub use vulnerability_merge::merge_vulnerabilities;
