//! Typed configuration of a server-side repository.
//!
//! GraphDB creates repositories from a JSON document posted to
//! `/rest/repositories` and returns the same document from
//! `/rest/repositories/{id}`:
//!
//! ```json
//! {
//!   "id": "repo1",
//!   "title": "Countries",
//!   "type": "graphdb",
//!   "location": "",
//!   "params": {
//!     "ruleset": {"name": "ruleset", "label": "Ruleset", "value": "rdfsplus-optimized"}
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of repository the server creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    /// GraphDB 10 and later
    #[default]
    Graphdb,
    /// GraphDB Free
    Free,
    /// GraphDB Standard Edition
    Se,
    /// GraphDB Enterprise Edition
    Ee,
    /// Virtual repository over a relational database
    Ontop,
    /// Federation of other repositories
    Fedx,
}

impl RepositoryType {
    /// Value of the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::Graphdb => "graphdb",
            RepositoryType::Free => "free",
            RepositoryType::Se => "se",
            RepositoryType::Ee => "ee",
            RepositoryType::Ontop => "ontop",
            RepositoryType::Fedx => "fedx",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One repository parameter, such as the ruleset or the base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryParam {
    /// Parameter name
    pub name: String,
    /// Human readable label
    #[serde(default)]
    pub label: String,
    /// Parameter value, usually a string, number or boolean
    pub value: Value,
}

/// Configuration a repository is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    repository_type: RepositoryType,
    #[serde(default)]
    location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sesame_type: Option<String>,
    #[serde(default)]
    params: BTreeMap<String, RepositoryParam>,
}

impl RepositoryConfig {
    /// A repository with default parameters on the server's local location.
    pub fn new(id: impl Into<String>, repository_type: RepositoryType) -> Self {
        RepositoryConfig {
            id: id.into(),
            title: String::new(),
            repository_type,
            location: String::new(),
            sesame_type: None,
            params: BTreeMap::new(),
        }
    }

    /// Set the title shown in the workbench.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Create the repository on a remote location instead of the local one.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the RDF4J SAIL type, e.g. `graphdb:SailRepository`.
    pub fn with_sesame_type(mut self, sesame_type: impl Into<String>) -> Self {
        self.sesame_type = Some(sesame_type.into());
        self
    }

    /// Set a parameter; the label defaults to the name.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.params.insert(
            name.clone(),
            RepositoryParam {
                label: name.clone(),
                name,
                value: value.into(),
            },
        );
        self
    }

    /// Repository identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Repository title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Kind of repository.
    pub fn repository_type(&self) -> RepositoryType {
        self.repository_type
    }

    /// Location the repository lives on; empty for the local one.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// RDF4J SAIL type, if set.
    pub fn sesame_type(&self) -> Option<&str> {
        self.sesame_type.as_deref()
    }

    /// Parameter by name.
    pub fn param(&self, name: &str) -> Option<&RepositoryParam> {
        self.params.get(name)
    }

    /// Every parameter, by name.
    pub fn params(&self) -> &BTreeMap<String, RepositoryParam> {
        &self.params
    }
}
