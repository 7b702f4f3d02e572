//! Rule id space partitioning.
//!
//! The id space is shared between static category rulesets and the dynamic
//! rules this engine installs. Each range has exactly one meaning:
//!
//! | Range           | Owner                         | Counted as     |
//! |-----------------|-------------------------------|----------------|
//! | `[0, 2000)`     | ads static ruleset            | blocked ad     |
//! | `[2000, 3000)`  | trackers static ruleset       | blocked tracker|
//! | `[3000, 4000)`  | social static ruleset         | nothing        |
//! | `[10000, ∞)`    | engine dynamic allow-rules    | nothing        |

use std::ops::Range;

/// Rule identifier as understood by the evaluator.
pub type RuleId = u32;

/// First id owned by the engine's dynamic rules.
pub const DYNAMIC_ID_BASE: RuleId = 10_000;

/// Static ad rules.
pub const ADS_RANGE: Range<RuleId> = 0..2_000;
/// Static tracker rules.
pub const TRACKERS_RANGE: Range<RuleId> = 2_000..3_000;
/// Static social widget rules.
pub const SOCIAL_RANGE: Range<RuleId> = 3_000..4_000;

/// Id of the dynamic rule at `index` within one synthesis pass.
///
/// Ids are positional: the same index always yields the same id, and nothing
/// carries over between passes. `None` once the index runs past
/// `RuleId::MAX`.
#[inline]
pub fn dynamic_rule_id(index: usize) -> Option<RuleId> {
    RuleId::try_from(index)
        .ok()
        .and_then(|offset| DYNAMIC_ID_BASE.checked_add(offset))
}

/// Whether `id` belongs to the engine's dynamic range.
#[inline]
pub fn is_engine_owned(id: RuleId) -> bool {
    id >= DYNAMIC_ID_BASE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_ids_are_positional() {
        assert_eq!(dynamic_rule_id(0), Some(10_000));
        assert_eq!(dynamic_rule_id(1), Some(10_001));
        assert_eq!(dynamic_rule_id(41), Some(10_041));
    }

    #[test]
    fn test_dynamic_ids_never_collide_at_the_top() {
        let last = (RuleId::MAX - DYNAMIC_ID_BASE) as usize;
        assert_eq!(dynamic_rule_id(last), Some(RuleId::MAX));
        assert_eq!(dynamic_rule_id(last + 1), None);
        assert_eq!(dynamic_rule_id(usize::MAX), None);
    }

    #[test]
    fn test_static_ranges_stay_below_dynamic_base() {
        for range in [ADS_RANGE, TRACKERS_RANGE, SOCIAL_RANGE] {
            assert!(range.end <= DYNAMIC_ID_BASE);
        }
        assert_eq!(ADS_RANGE.end, TRACKERS_RANGE.start);
        assert_eq!(TRACKERS_RANGE.end, SOCIAL_RANGE.start);
    }

    #[test]
    fn test_engine_ownership_boundary() {
        assert!(!is_engine_owned(9_999));
        assert!(is_engine_owned(10_000));
        assert!(is_engine_owned(RuleId::MAX));
    }
}
