//! Orchestrator configuration parsed from TOML
//!
//! ```toml
//! start_order = ["bookmarks", "preferences", "autofill", "typed_urls"]
//! first_run = true
//! initial_types = ["bookmarks"]
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainId, DomainSet};
use crate::error::{Error, Result};
use crate::priority::{DEFAULT_START_ORDER, PriorityTable};

fn default_start_order() -> Vec<DomainId> {
    DEFAULT_START_ORDER.to_vec()
}

fn default_first_run() -> bool {
    true
}

/// Settings for building an [`crate::Orchestrator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Domains in start order; position is the rank
    #[serde(default = "default_start_order")]
    pub start_order: Vec<DomainId>,

    /// Flag passed to every controller start
    #[serde(default = "default_first_run")]
    pub first_run: bool,

    /// Configuration to request once the orchestrator is up
    #[serde(default)]
    pub initial_types: Vec<DomainId>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            start_order: default_start_order(),
            first_run: default_first_run(),
            initial_types: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML for this schema, or
    /// if `start_order` lists a domain twice.
    ///
    /// # Example
    ///
    /// ```
    /// use syncconf_core::OrchestratorConfig;
    ///
    /// let config = OrchestratorConfig::parse(r#"
    /// start_order = ["preferences", "bookmarks"]
    /// first_run = false
    /// "#).unwrap();
    ///
    /// assert!(!config.first_run);
    /// assert_eq!(config.start_order.len(), 2);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: OrchestratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading orchestrator config");
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        self.priority_table()
            .map(|_| ())
            .map_err(|e| Error::InvalidConfig {
                message: e.to_string(),
            })
    }

    pub fn priority_table(&self) -> Result<PriorityTable> {
        PriorityTable::from_order(self.start_order.iter().cloned())
    }

    pub fn initial_set(&self) -> DomainSet {
        self.initial_types.iter().cloned().collect()
    }
}
