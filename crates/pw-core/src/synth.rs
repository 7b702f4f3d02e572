//! Dynamic rule synthesis
//!
//! Turns the user's whitelist and the relax matrix into allow-rules. The
//! output is a pure function of the settings: ids are the rule's position in
//! the pass offset by [`DYNAMIC_ID_BASE`](crate::ids::DYNAMIC_ID_BASE), so two
//! passes over equal settings produce identical rules.

use crate::ids::{dynamic_rule_id, RuleId};
use crate::relax;
use crate::settings::Settings;
use crate::types::{DynamicRule, ResourceType, Rule};

/// Priority of whitelist allow-rules. Highest tier.
pub const WHITELIST_PRIORITY: u32 = 10;
/// Priority of relax allow-rules. Below the whitelist, above static blocks.
pub const RELAX_PRIORITY: u32 = 5;

/// Whitelisted sites are fully exempt, including navigation.
pub const WHITELIST_TYPES: ResourceType = ResourceType::MAIN_FRAME
    .union(ResourceType::SUB_FRAME)
    .union(ResourceType::SCRIPT)
    .union(ResourceType::XMLHTTPREQUEST);

/// Relaxed sites keep scripts and APIs working; frames are not covered.
pub const RELAX_TYPES: ResourceType = ResourceType::SCRIPT.union(ResourceType::XMLHTTPREQUEST);

/// Synthesize the dynamic rule set for `settings`.
///
/// Whitelist rules come first in stored order, then one rule per relax
/// fragment in declaration order when auto-relax is on. A fragment present in
/// both gets two rules; the evaluator picks the higher priority one.
pub fn synthesize(settings: &Settings) -> Vec<DynamicRule> {
    if !settings.enabled {
        return Vec::new();
    }

    let relax_count = if settings.auto_relax { relax::fragment_count() } else { 0 };
    let mut rules = Vec::with_capacity(settings.whitelist.len() + relax_count);

    for domain in &settings.whitelist {
        let Some(id) = next_id(&rules) else {
            return rules;
        };
        rules.push(Rule::allow(id, WHITELIST_PRIORITY, domain, WHITELIST_TYPES));
    }

    if settings.auto_relax {
        for fragment in relax::fragments() {
            let Some(id) = next_id(&rules) else {
                return rules;
            };
            rules.push(Rule::allow(id, RELAX_PRIORITY, fragment, RELAX_TYPES));
        }
    }

    log::debug!(
        "synthesized {} dynamic rules ({} whitelist, {} relax)",
        rules.len(),
        settings.whitelist.len(),
        relax_count
    );

    rules
}

/// Id for the next rule. Rules past the end of the id space are dropped
/// instead of reusing an id.
fn next_id(rules: &[DynamicRule]) -> Option<RuleId> {
    let id = dynamic_rule_id(rules.len());
    if id.is_none() {
        log::warn!("dynamic rule ids exhausted after {} rules, rest dropped", rules.len());
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::DYNAMIC_ID_BASE;
    use crate::settings::Profile;
    use crate::types::RuleAction;

    fn scenario() -> Settings {
        Settings {
            enabled: true,
            block_trackers: true,
            block_social: false,
            whitelist: vec!["example.com".to_string()],
            auto_relax: true,
            ..Settings::default()
        }
    }

    #[test]
    fn test_example_scenario() {
        let rules = synthesize(&scenario());
        assert_eq!(rules.len(), 1 + relax::fragment_count());

        assert_eq!(rules[0].id, 10_000);
        assert_eq!(rules[0].priority, WHITELIST_PRIORITY);
        assert_eq!(rules[0].condition.url_filter, "example.com");
        assert_eq!(rules[0].condition.resource_types, WHITELIST_TYPES);

        assert_eq!(rules[1].id, 10_001);
        assert_eq!(rules[1].priority, RELAX_PRIORITY);
        assert_eq!(rules[1].condition.url_filter, "netflix.com");
        assert_eq!(rules[1].condition.resource_types, RELAX_TYPES);

        let paypal = rules
            .iter()
            .find(|r| r.condition.url_filter == "paypal.com")
            .unwrap();
        assert_eq!(paypal.id, 10_006);

        assert!(rules.iter().all(|r| r.action == RuleAction::Allow));
        for (index, rule) in rules.iter().enumerate() {
            assert_eq!(rule.id, DYNAMIC_ID_BASE + index as u32);
        }
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let settings = scenario();
        assert_eq!(synthesize(&settings), synthesize(&settings));
    }

    #[test]
    fn test_whitelist_outranks_relax_for_same_fragment() {
        let settings = Settings {
            whitelist: vec!["paypal.com".to_string(), "usa.gov".to_string()],
            ..Settings::default()
        };
        let rules = synthesize(&settings);
        for fragment in ["paypal.com", "usa.gov"] {
            let matching: Vec<_> = rules
                .iter()
                .filter(|r| r.condition.url_filter == fragment)
                .collect();
            assert_eq!(matching.len(), 2);
            assert!(matching[0].priority > matching[1].priority);
            assert_eq!(matching[0].priority, WHITELIST_PRIORITY);
        }
    }

    #[test]
    fn test_relax_rules_skip_frames() {
        assert!(!RELAX_TYPES.intersects(ResourceType::DOCUMENT));
        assert!(WHITELIST_TYPES.contains(ResourceType::DOCUMENT));
    }

    #[test]
    fn test_auto_relax_off() {
        let settings = Settings {
            whitelist: vec!["a.com".to_string(), "b.com".to_string()],
            auto_relax: false,
            ..Settings::default()
        };
        let rules = synthesize(&settings);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].id, 10_001);
        assert_eq!(rules[1].condition.url_filter, "b.com");
    }

    #[test]
    fn test_disabled_synthesizes_nothing() {
        for profile in [Profile::Basic, Profile::Balanced, Profile::Aggressive] {
            let settings = Settings {
                enabled: false,
                profile,
                whitelist: vec!["example.com".to_string()],
                auto_relax: true,
                ..Settings::default()
            };
            assert!(synthesize(&settings).is_empty());
        }
    }

    #[test]
    fn test_empty_domain_passes_through() {
        let settings = Settings {
            whitelist: vec![String::new()],
            auto_relax: false,
            ..Settings::default()
        };
        let rules = synthesize(&settings);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].condition.url_filter, "");
    }
}
