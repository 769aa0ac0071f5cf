pub mod npm_registry_client;
pub mod osv_client;
pub mod snyk_client;

pub use npm_registry_client::NpmRegistryClient;
pub use osv_client::OsvClient;
pub use snyk_client::SnykClient;
