/// Outbound ports (driven ports) - infrastructure interfaces.
///
/// These ports define the interfaces the engine uses to reach external
/// systems (vulnerability databases, the package registry).
pub mod package_registry;
pub mod vulnerability_source;

pub use package_registry::PackageRegistry;
pub use vulnerability_source::VulnerabilitySource;
