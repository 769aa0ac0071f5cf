//! Supply-chain threat heuristics.
//!
//! Each heuristic is an independent, pure predicate over immutable
//! inputs, composed as an ordered list of [`ThreatCheck`] strategies
//! run by the threat detector. No check depends on another check's
//! output, so each one is testable in isolation.

pub mod install_scripts;
pub mod maintainer_risk;
pub mod publish_activity;
pub mod typosquat;

pub use install_scripts::InstallScriptCheck;
pub use maintainer_risk::MaintainerRiskCheck;
pub use publish_activity::PublishActivityCheck;
pub use typosquat::TyposquatCheck;

use crate::risk_analysis::domain::{Dependency, PackageInfo, SupplyChainThreat};
use chrono::{DateTime, Utc};

/// A single supply-chain heuristic.
///
/// `info` is `None` when the registry lookup for the package failed;
/// checks that need registry metadata return no findings in that case,
/// while metadata-free checks (typosquatting) still run.
pub trait ThreatCheck: Send + Sync {
    /// Short identifier used in log lines.
    fn name(&self) -> &'static str;

    fn check(
        &self,
        dependency: &Dependency,
        info: Option<&PackageInfo>,
        now: DateTime<Utc>,
    ) -> Vec<SupplyChainThreat>;
}

/// The standard check set in its standard order.
pub fn default_checks(
    reference_packages: Vec<String>,
    trusted_packages: Vec<String>,
) -> Vec<Box<dyn ThreatCheck>> {
    vec![
        Box::new(TyposquatCheck::new(reference_packages)),
        Box::new(InstallScriptCheck::new()),
        Box::new(PublishActivityCheck::new()),
        Box::new(MaintainerRiskCheck::new(trusted_packages)),
    ]
}
