//! Match event classification.

use crate::ids::{RuleId, ADS_RANGE, TRACKERS_RANGE};
use crate::settings::Stats;

/// Counter a match event is booked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatBucket {
    Ads,
    Trackers,
}

/// Map a matched rule id to its bucket.
///
/// Only ad and tracker static rules count. Engine allow-rules and every other
/// range return `None`.
pub fn classify(rule_id: RuleId) -> Option<StatBucket> {
    if ADS_RANGE.contains(&rule_id) {
        Some(StatBucket::Ads)
    } else if TRACKERS_RANGE.contains(&rule_id) {
        Some(StatBucket::Trackers)
    } else {
        None
    }
}

impl Stats {
    /// Increment the counter for `bucket`.
    pub fn record(&mut self, bucket: StatBucket) {
        let counter = match bucket {
            StatBucket::Ads => &mut self.blocked_ads,
            StatBucket::Trackers => &mut self.blocked_trackers,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Compact counter for display: `999`, `1.2k`, `34.0k`.
pub fn format_stat(n: u64) -> String {
    if n >= 1000 {
        format!("{:.1}k", n as f64 / 1000.0)
    } else {
        n.to_string()
    }
}
