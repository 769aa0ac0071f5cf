use serde::{Deserialize, Serialize};

/// How a dependency is declared in the consuming project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    Direct,
    Dev,
    Peer,
    Optional,
}

/// A single resolved dependency, as produced by the external
/// package/lockfile parser.
///
/// Identity within one scan is `(name, kind)`. `resolved_version` is the
/// concrete installed version the parser resolved from `declared_range`;
/// the upgrade resolver needs it as the starting point, so dependencies
/// without one are skipped during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub declared_range: String,
    pub kind: DependencyKind,
    pub resolved_version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, declared_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.into(),
            kind: DependencyKind::Direct,
            resolved_version: None,
        }
    }

    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_resolved_version(mut self, version: impl Into<String>) -> Self {
        self.resolved_version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_builder() {
        let dep = Dependency::new("lodash", "^4.17.0")
            .with_kind(DependencyKind::Dev)
            .with_resolved_version("4.17.20");
        assert_eq!(dep.name, "lodash");
        assert_eq!(dep.declared_range, "^4.17.0");
        assert_eq!(dep.kind, DependencyKind::Dev);
        assert_eq!(dep.resolved_version.as_deref(), Some("4.17.20"));
    }

    #[test]
    fn test_dependency_defaults_to_direct() {
        let dep = Dependency::new("express", "^4.18.0");
        assert_eq!(dep.kind, DependencyKind::Direct);
        assert!(dep.resolved_version.is_none());
    }

    #[test]
    fn test_dependency_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&DependencyKind::Dev).unwrap();
        assert_eq!(json, "\"dev\"");
    }
}
