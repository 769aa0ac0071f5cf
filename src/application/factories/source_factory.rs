use crate::adapters::outbound::network::{OsvClient, SnykClient};
use crate::config::ScanConfig;
use crate::ports::outbound::VulnerabilitySource;
use crate::shared::Result;
use std::sync::Arc;

/// Builds the vulnerability-source set for a scan.
///
/// OSV is always enabled; Snyk only when a token is configured. A
/// configured-but-blank token is the one misconfiguration that must
/// surface as a hard error (the caller's intent cannot be honored), so
/// it propagates out of here instead of degrading.
pub fn build_sources(config: &ScanConfig) -> Result<Vec<Arc<dyn VulnerabilitySource>>> {
    let mut sources: Vec<Arc<dyn VulnerabilitySource>> =
        vec![Arc::new(OsvClient::new(config.request_timeout)?)];

    if let Some(token) = &config.snyk_token {
        sources.push(Arc::new(SnykClient::new(token, config.request_timeout)?));
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osv_only_without_token() {
        let sources = build_sources(&ScanConfig::default()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_name(), "osv");
    }

    #[test]
    fn test_snyk_enabled_with_token() {
        let config = ScanConfig::default().with_snyk_token("an-api-token");
        let sources = build_sources(&config).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].source_name(), "snyk");
    }

    #[test]
    fn test_blank_token_is_hard_error() {
        let config = ScanConfig::default().with_snyk_token("  ");
        assert!(build_sources(&config).is_err());
    }
}
