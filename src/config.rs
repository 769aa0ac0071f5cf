//! Engine configuration.
//!
//! `ScanConfig` is a plain value object handed to the use cases by the
//! caller; there is no global resolver and no config-file loading here.
//! The popular/trusted package lists used by the heuristics are part of
//! the configuration so they can be extended without touching detector
//! logic.

use anyhow::bail;
use std::time::Duration;

use crate::shared::Result;

/// Widely-used npm package names used as the typosquatting reference
/// set and the trusted set for the single-maintainer signal.
pub const DEFAULT_POPULAR_PACKAGES: &[&str] = &[
    "react",
    "react-dom",
    "express",
    "lodash",
    "axios",
    "chalk",
    "commander",
    "next",
    "typescript",
    "webpack",
    "eslint",
    "prettier",
    "jest",
    "mocha",
    "mongoose",
    "sequelize",
    "prisma",
    "fastify",
    "socket.io",
    "dotenv",
    "cors",
    "jsonwebtoken",
    "bcrypt",
    "nodemailer",
    "moment",
    "dayjs",
    "uuid",
    "zod",
    "rxjs",
    "vue",
    "angular",
    "svelte",
    "vite",
    "rollup",
    "babel",
    "minimist",
    "glob",
    "rimraf",
    "request",
    "node-fetch",
];

/// Tunables and credentials for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of dependencies queried concurrently per batch. A
    /// throughput/politeness knob, not a correctness parameter.
    pub batch_size: usize,
    /// Per-request timeout applied by the network adapters.
    pub request_timeout: Duration,
    /// Snyk API token; the Snyk source is only enabled when present.
    pub snyk_token: Option<String>,
    /// Reference names for the typosquatting check.
    pub popular_packages: Vec<String>,
    /// Packages exempt from the single-maintainer signal.
    pub trusted_packages: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let popular: Vec<String> = DEFAULT_POPULAR_PACKAGES
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            batch_size: 10,
            request_timeout: Duration::from_secs(30),
            snyk_token: None,
            popular_packages: popular.clone(),
            trusted_packages: popular,
        }
    }
}

impl ScanConfig {
    pub fn with_snyk_token(mut self, token: impl Into<String>) -> Self {
        self.snyk_token = Some(token.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validates the configuration before a scan starts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if let Some(token) = &self.snyk_token {
            if token.trim().is_empty() {
                bail!("snyk_token must not be blank when set");
            }
        }
        Ok(())
    }
}
