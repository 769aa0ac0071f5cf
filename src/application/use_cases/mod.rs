pub mod aggregate_vulnerabilities;
pub mod detect_threats;
pub mod resolve_upgrade;

pub use aggregate_vulnerabilities::VulnerabilityAggregator;
pub use detect_threats::ThreatDetector;
pub use resolve_upgrade::UpgradeResolver;
