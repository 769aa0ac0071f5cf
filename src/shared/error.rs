use thiserror::Error;

/// Application-specific errors for the risk-resolution engine.
///
/// Uses thiserror to derive Display and Error traits automatically.
/// Almost every failure in this engine degrades gracefully to an empty
/// per-item result (see the aggregator and detector); the variants here
/// cover the conditions that must surface as hard errors instead, plus
/// structured causes adapters attach before degrading.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A vulnerability source was enabled without the credentials it
    /// requires. The caller's intent cannot be honored, so this is the
    /// one misconfiguration that propagates instead of degrading.
    #[error("{source_name} source is enabled but no API token was provided")]
    MissingCredentials { source_name: String },

    #[error("{source_name} API returned status code {status}")]
    SourceStatus { source_name: String, status: u16 },

    #[error("registry returned status code {status} for package {package_name}")]
    RegistryStatus { package_name: String, status: u16 },

    #[error("invalid {component_type}: {reason}")]
    InvalidUrlComponent {
        component_type: String,
        reason: String,
    },
}
