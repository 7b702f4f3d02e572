//! The persisted settings record.

use serde::{Deserialize, Serialize};

/// Well-known key the settings record is stored under.
pub const SETTINGS_KEY: &str = "settings";

/// Cosmetic selector aggressiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Basic,
    #[default]
    Balanced,
    Aggressive,
}

/// Match counters. Only the stats classifier increments these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub blocked_ads: u64,
    pub blocked_trackers: u64,
    pub hidden_elements: u64,
}

/// User settings, one record per installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Master switch. When off, every category and dynamic rule is removed.
    pub enabled: bool,
    pub block_trackers: bool,
    pub block_social: bool,
    pub block_cosmetic: bool,
    pub profile: Profile,
    /// Exempted domains, in insertion order.
    pub whitelist: Vec<String>,
    /// Install allow-rules for the relax matrix.
    pub auto_relax: bool,
    pub stats: Stats,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            block_trackers: true,
            block_social: false,
            block_cosmetic: true,
            profile: Profile::Balanced,
            whitelist: Vec::new(),
            auto_relax: true,
            stats: Stats::default(),
        }
    }
}
