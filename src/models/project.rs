//! AppVeyor project model.

use serde::{Deserialize, Serialize};

/// A CI project as returned by `GET /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Numeric account ID
    #[serde(default)]
    pub account_id: Option<i64>,
    /// Account the project lives under (first URL segment)
    pub account_name: String,
    /// Numeric project ID
    #[serde(default)]
    pub project_id: Option<i64>,
    /// Display name, used for lookups
    pub name: String,
    /// URL slug (e.g. "azure-webjobs-sdk-script-y8o14")
    pub slug: String,
    /// Source repository (e.g. "Azure/azure-webjobs-sdk-script")
    #[serde(default)]
    pub repository_name: Option<String>,
    /// Default branch configured on the project
    #[serde(default)]
    pub repository_branch: Option<String>,
}

impl Project {
    /// Check whether this project answers to `name` (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
