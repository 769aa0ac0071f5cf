/// Mock implementations for testing
mod mock_package_registry;
mod mock_vulnerability_source;

pub use mock_package_registry::MockPackageRegistry;
pub use mock_vulnerability_source::MockVulnerabilitySource;
