use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A package maintainer as listed in registry metadata.
///
/// `email` is kept as a raw string; registry documents frequently carry
/// empty or malformed addresses and the maintainer-risk heuristic
/// inspects them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Maintainer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Registry metadata for one package, as consumed from the registry
/// lookup collaborator.
///
/// Absent registry fields map to empty collections; the heuristics treat
/// "no data" as "nothing to flag" for that check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub published_versions: Vec<String>,
    /// version -> lifecycle hook name -> script body
    pub install_scripts: HashMap<String, HashMap<String, String>>,
    pub maintainers: Vec<Maintainer>,
    pub publish_timestamps: HashMap<String, DateTime<Utc>>,
}

impl PackageInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
