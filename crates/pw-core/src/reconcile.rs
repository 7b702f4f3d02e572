//! Replace plan for the evaluator's dynamic rule table.
//!
//! The engine never merges: every pass removes all rules in its own id range
//! and installs the freshly synthesized set. Rules below
//! [`DYNAMIC_ID_BASE`](crate::ids::DYNAMIC_ID_BASE) belong to other producers
//! and are left alone.

use crate::ids::{is_engine_owned, RuleId};
use crate::types::{DynamicRule, InstalledRule};

/// One atomic replace call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacePlan {
    pub remove_ids: Vec<RuleId>,
    pub add_rules: Vec<DynamicRule>,
}

impl ReplacePlan {
    /// Whether applying the plan would leave the engine's rules unchanged.
    ///
    /// Only used for logging; the plan is applied regardless so drift in the
    /// evaluator gets corrected.
    pub fn is_noop(&self, installed: &[InstalledRule]) -> bool {
        let owned: Vec<&InstalledRule> = installed
            .iter()
            .filter(|rule| is_engine_owned(rule.id))
            .collect();
        owned.len() == self.add_rules.len()
            && owned
                .iter()
                .zip(&self.add_rules)
                .all(|(a, b)| a.as_rule().as_ref() == Some(b))
    }
}

/// Plan the replacement of `installed` engine rules by `desired`.
///
/// Only ids are read from `installed`, so rules of any shape can share the
/// table.
pub fn plan_replace(installed: &[InstalledRule], desired: Vec<DynamicRule>) -> ReplacePlan {
    let remove_ids = installed
        .iter()
        .map(|rule| rule.id)
        .filter(|id| is_engine_owned(*id))
        .collect();

    ReplacePlan {
        remove_ids,
        add_rules: desired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::synth::synthesize;
    use crate::types::{ResourceType, Rule};

    fn installed(rule: &Rule) -> InstalledRule {
        InstalledRule::try_from(rule).unwrap()
    }

    fn external(id: RuleId) -> InstalledRule {
        installed(&Rule::allow(id, 1, "partner.example", ResourceType::SCRIPT))
    }

    #[test]
    fn test_removes_only_engine_owned_ids() {
        let table = vec![
            external(5),
            installed(&Rule::allow(10_000, 10, "old.com", ResourceType::SCRIPT)),
            external(9_999),
            installed(&Rule::allow(10_007, 5, "stale.com", ResourceType::SCRIPT)),
        ];
        let plan = plan_replace(&table, Vec::new());
        assert_eq!(plan.remove_ids, vec![10_000, 10_007]);
        assert!(plan.add_rules.is_empty());
    }

    #[test]
    fn test_adds_full_desired_set() {
        let desired = synthesize(&Settings::default());
        let plan = plan_replace(&[], desired.clone());
        assert!(plan.remove_ids.is_empty());
        assert_eq!(plan.add_rules, desired);
    }

    #[test]
    fn test_noop_detection() {
        let desired = synthesize(&Settings::default());
        let mut table = vec![external(42)];
        table.extend(desired.iter().map(installed));

        let plan = plan_replace(&table, desired.clone());
        assert!(plan.is_noop(&table));

        let shrunk = plan_replace(&table, desired[1..].to_vec());
        assert!(!shrunk.is_noop(&table));
    }

    #[test]
    fn test_foreign_shaped_rules_do_not_block_planning() {
        let table: Vec<InstalledRule> = serde_json::from_value(serde_json::json!([
            {"id": 3, "priority": 1, "action": {"type": "block"},
             "condition": {"requestDomains": ["ads.example"]}},
            {"id": 700, "priority": 2, "action": {"type": "redirect",
             "redirect": {"extensionPath": "/noop.js"}},
             "condition": {"urlFilter": "||cdn.example/ga.js"}},
            {"id": 9_000, "priority": 1, "action": {"type": "allowAllRequests"},
             "condition": {"urlFilter": "||bank.example^", "resourceTypes": ["main_frame"]}},
            {"id": 10_002, "priority": 1, "action": {"type": "upgradeScheme"},
             "condition": {}}
        ]))
        .unwrap();

        let desired = synthesize(&Settings::default());
        let plan = plan_replace(&table, desired.clone());
        assert_eq!(plan.remove_ids, vec![10_002]);
        assert_eq!(plan.add_rules, desired);
        assert!(!plan.is_noop(&table));
    }
}
