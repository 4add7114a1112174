//! Matcher configuration.

use crate::matcher::{ArrayMatching, Comparator};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by the stub store and the command line tool.
///
/// ```yaml
/// arrayMatching: exclusive
/// logFilter: stub_matcher=debug
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Whether one target array element may satisfy several pattern elements.
    #[serde(default)]
    pub array_matching: ArrayMatching,

    /// `tracing` filter directive used when `RUST_LOG` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl MatcherConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: MatcherConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                anyhow::bail!("logFilter must not be empty when set");
            }
        }
        Ok(())
    }

    pub fn comparator(&self) -> Comparator {
        Comparator::new(self.array_matching)
    }
}
