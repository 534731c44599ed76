//! The tracked roster: VIP entities, tracked issues, custom keywords, and
//! per-source overrides, loaded from a YAML file once per cycle.
//!
//! Validation failures are fatal — a roster with duplicate VIP ids or empty
//! keyword lists never reaches the poll pipeline.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A statically configured entity monitored with a closed keyword list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipEntityConfig {
    pub id: String,
    pub name: String,
    /// Search keywords for this entity. Must be non-empty; order is the
    /// order keywords are queried in.
    pub keywords: Vec<String>,
    /// Priority tier: 1, 2, or 3. Tier 1 polls every cycle.
    pub tier: u8,
}

/// A keyword of special interest that can raise hot-issue alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedIssueConfig {
    pub keyword: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub related_keywords: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub auto_generate: bool,
    /// Mention count at which this issue goes hot. Falls back to the
    /// app-level threshold when absent.
    #[serde(default)]
    pub mention_threshold: Option<u64>,
}

fn default_priority() -> i32 {
    3
}

/// Enable/weight override for one mention source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOverride {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Reliability weight in `(0, 1]`.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub vips: Vec<VipEntityConfig>,
    #[serde(default)]
    pub issues: Vec<TrackedIssueConfig>,
    #[serde(default)]
    pub custom_keywords: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SourceOverride>,
}

impl Roster {
    /// Look up the override for a source by name.
    #[must_use]
    pub fn source_override(&self, name: &str) -> Option<&SourceOverride> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// Load and validate the roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_roster(path: &Path) -> Result<Roster, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RosterFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let roster: Roster = serde_yaml::from_str(&content)?;
    validate_roster(&roster)?;
    Ok(roster)
}

fn validate_roster(roster: &Roster) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for vip in &roster.vips {
        if vip.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "VIP id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(vip.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate VIP id: '{}'",
                vip.id
            )));
        }
        if vip.keywords.is_empty() || vip.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "VIP '{}' has no usable keywords",
                vip.id
            )));
        }
        if ![1, 2, 3].contains(&vip.tier) {
            return Err(ConfigError::Validation(format!(
                "VIP '{}' has invalid tier {}; must be 1, 2, or 3",
                vip.id, vip.tier
            )));
        }
    }

    let mut seen_issue_keywords = HashSet::new();
    for issue in &roster.issues {
        if issue.keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "issue keyword must be non-empty".to_string(),
            ));
        }
        if !seen_issue_keywords.insert(issue.keyword.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate issue keyword: '{}'",
                issue.keyword
            )));
        }
    }

    for source in &roster.sources {
        if !(source.weight > 0.0 && source.weight <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has weight {} outside (0, 1]",
                source.name, source.weight
            )));
        }
    }

    Ok(())
}
