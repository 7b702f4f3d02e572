//! Static category selection.

use crate::settings::Settings;
use crate::types::Category;

/// Categories to keep enabled for `settings`.
///
/// Ads is always on while the master switch is on. With the master switch off
/// the result is empty.
pub fn select_categories(settings: &Settings) -> Vec<Category> {
    if !settings.enabled {
        return Vec::new();
    }

    let mut active = vec![Category::Ads];
    if settings.block_trackers {
        active.push(Category::Trackers);
    }
    if settings.block_social {
        active.push(Category::Social);
    }
    active
}

/// Instruction for the evaluator's static ruleset toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPlan {
    pub enable: Vec<Category>,
    pub disable: Vec<Category>,
}

/// Compute enable/disable sets from what is enabled now and what should be.
pub fn plan_static(current: &[Category], active: &[Category]) -> CategoryPlan {
    CategoryPlan {
        enable: active.to_vec(),
        disable: current
            .iter()
            .copied()
            .filter(|category| !active.contains(category))
            .collect(),
    }
}
