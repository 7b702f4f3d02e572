//! Ruleset builder
//!
//! Assigns ids from the category's range and emits evaluator rules.
//!
//! Every match on a rule in the ads or trackers range is booked as a block,
//! so `@@` exceptions are only kept for categories whose matches are not
//! counted.

use pw_core::ids::RuleId;
use pw_core::stats::classify;
use pw_core::types::{Category, Rule, RuleAction, RuleCondition};

use crate::parser::ParsedRule;

/// Priority of static block rules.
pub const BLOCK_PRIORITY: u32 = 1;
/// Priority of exceptions inside a static list. Still below relax rules.
pub const EXCEPTION_PRIORITY: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{category} holds at most {capacity} rules, got {requested}")]
    RangeExhausted {
        category: Category,
        capacity: usize,
        requested: usize,
    },
}

/// Build the static ruleset for `category`.
///
/// Ids are `range.start + index` in input order. Exceptions are dropped from
/// counted categories. Fails rather than spilling into the next category's
/// range.
pub fn build_ruleset(category: Category, rules: &[ParsedRule]) -> Result<Vec<Rule>, CompileError> {
    let range = category.id_range();
    let capacity = range.len();

    let counted = classify(range.start).is_some();
    let kept: Vec<&ParsedRule> = rules
        .iter()
        .filter(|rule| !(counted && rule.action == RuleAction::Allow))
        .collect();
    if kept.len() < rules.len() {
        log::warn!(
            "{}: dropped {} exception rule(s), matches in this range count as blocks",
            category,
            rules.len() - kept.len()
        );
    }

    if kept.len() > capacity {
        return Err(CompileError::RangeExhausted {
            category,
            capacity,
            requested: kept.len(),
        });
    }

    let built: Vec<Rule> = kept
        .into_iter()
        .zip(range)
        .map(|(rule, id): (&ParsedRule, RuleId)| Rule {
            id,
            priority: match rule.action {
                RuleAction::Allow => EXCEPTION_PRIORITY,
                RuleAction::Block => BLOCK_PRIORITY,
            },
            action: rule.action,
            condition: RuleCondition {
                url_filter: rule.url_filter.clone(),
                resource_types: rule.resource_types,
            },
        })
        .collect();

    log::info!("built {} with {} of {} ids", category, built.len(), capacity);
    Ok(built)
}

#[cfg(test)]
mod tests {
    use pw_core::stats::{classify, StatBucket};

    use super::*;
    use crate::optimizer::optimize_rules;
    use crate::parser::parse_rule_list;

    #[test]
    fn ids_follow_category_range() {
        let rules = parse_rule_list("||t1.example^\n@@||ok.example^\n||t2.example^");
        let built = build_ruleset(Category::Trackers, &rules).unwrap();
        let ids: Vec<_> = built.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2_000, 2_001]);
        assert_eq!(built[1].condition.url_filter, "||t2.example^");
        assert!(built.iter().all(|r| r.priority == BLOCK_PRIORITY));
        assert!(built
            .iter()
            .all(|r| classify(r.id) == Some(StatBucket::Trackers)));
    }

    #[test]
    fn exceptions_are_never_counted_as_blocks() {
        let text = "||ads.example^\n@@||cdn.example^$script\n@@||ok.example^";
        for category in Category::ALL {
            let built = build_ruleset(category, &parse_rule_list(text)).unwrap();
            for rule in built.iter().filter(|r| r.action == RuleAction::Allow) {
                assert_eq!(classify(rule.id), None, "{category} exception {}", rule.id);
            }
        }

        let ads = build_ruleset(Category::Ads, &parse_rule_list(text)).unwrap();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].action, RuleAction::Block);
    }

    #[test]
    fn social_keeps_exceptions() {
        let rules = parse_rule_list("||widgets.social.example^\n@@||widgets.social.example/share^");
        let built = build_ruleset(Category::Social, &rules).unwrap();
        assert_eq!(built[0].id, 3_000);
        assert_eq!(classify(built[0].id), None);
        assert_eq!(built[1].action, RuleAction::Allow);
        assert_eq!(built[1].priority, EXCEPTION_PRIORITY);
    }

    #[test]
    fn rejects_overflowing_list() {
        let text: String = (0..2_001).map(|i| format!("||host{i}.example^\n")).collect();
        let mut rules = parse_rule_list(&text);
        optimize_rules(&mut rules);
        let err = build_ruleset(Category::Ads, &rules).unwrap_err();
        assert!(matches!(
            err,
            CompileError::RangeExhausted { capacity: 2_000, requested: 2_001, .. }
        ));
    }

    #[test]
    fn output_is_evaluator_json() {
        let rules = parse_rule_list("||ads.example^$script");
        let built = build_ruleset(Category::Ads, &rules).unwrap();
        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(json[0]["action"]["type"], "block");
        assert_eq!(json[0]["condition"]["urlFilter"], "||ads.example^");
        assert_eq!(json[0]["condition"]["resourceTypes"][0], "script");
    }
}
