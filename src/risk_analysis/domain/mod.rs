pub mod dependency;
pub mod registry;
pub mod threat;
pub mod upgrade;
pub mod vulnerability;

pub use dependency::{Dependency, DependencyKind};
pub use registry::{Maintainer, PackageInfo};
pub use threat::{SupplyChainThreat, ThreatKind};
pub use upgrade::{Confidence, UpgradePath};
pub use vulnerability::{Severity, VulnSource, Vulnerability};
