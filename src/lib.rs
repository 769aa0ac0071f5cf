//! dep-sentry - dependency risk-resolution engine
//!
//! This library turns raw per-package facts (versions, registry
//! metadata, multi-source vulnerability reports) into three decisions:
//! which vulnerabilities apply to a dependency set, which dependencies
//! show supply-chain attack indicators, and what the safest available
//! upgrade is for a vulnerable package.
//!
//! # Architecture
//!
//! The library follows a hexagonal layout:
//!
//! - **Domain Layer** (`risk_analysis`): value objects and pure services
//!   (version predicates, vulnerability merging, threat heuristics,
//!   upgrade scoring)
//! - **Application Layer** (`application`): the aggregator, detector,
//!   and resolver use cases, plus factories wiring sources from config
//! - **Ports** (`ports`): async interfaces for vulnerability sources
//!   and the package registry
//! - **Adapters** (`adapters`): OSV, Snyk, and npm registry clients
//! - **Shared** (`shared`): common result and error types
//!
//! # Example
//!
//! ```no_run
//! use dep_sentry::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn scan() -> Result<()> {
//! let config = ScanConfig::default();
//! let sources = build_sources(&config)?;
//! let registry = Arc::new(NpmRegistryClient::new(Duration::from_secs(30))?);
//!
//! let dependencies = vec![
//!     Dependency::new("lodash", "^4.17.0").with_resolved_version("4.17.15"),
//! ];
//!
//! let aggregator = VulnerabilityAggregator::new(sources.clone(), config.batch_size);
//! let vulnerabilities = aggregator.aggregate(&dependencies).await;
//!
//! let detector = ThreatDetector::with_default_checks(registry.clone(), &config);
//! let threats = detector.detect(&dependencies).await;
//!
//! let resolver = UpgradeResolver::new(registry, sources);
//! let upgrades = resolver.resolve_all(&dependencies, &vulnerabilities).await;
//! # let _ = (threats, upgrades);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod ports;
pub mod risk_analysis;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::network::{NpmRegistryClient, OsvClient, SnykClient};
    pub use crate::application::factories::build_sources;
    pub use crate::application::use_cases::{
        ThreatDetector, UpgradeResolver, VulnerabilityAggregator,
    };
    pub use crate::config::ScanConfig;
    pub use crate::ports::outbound::{PackageRegistry, VulnerabilitySource};
    pub use crate::risk_analysis::domain::{
        Confidence, Dependency, DependencyKind, Maintainer, PackageInfo, Severity,
        SupplyChainThreat, ThreatKind, UpgradePath, VulnSource, Vulnerability,
    };
    pub use crate::risk_analysis::services::heuristics::{default_checks, ThreatCheck};
    pub use crate::risk_analysis::services::version_compare;
    pub use crate::shared::{Result, ScanError};
}
