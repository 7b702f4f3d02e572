use std::collections::HashSet;

use crate::parser::ParsedRule;

pub struct OptimizeStats {
    pub before: usize,
    pub after: usize,
    pub deduped: usize,
}

/// Drop exact duplicates, keeping the first occurrence so ids stay stable
/// when a list only grows.
pub fn optimize_rules(rules: &mut Vec<ParsedRule>) -> OptimizeStats {
    let before = rules.len();

    let mut seen: HashSet<RuleKey> = HashSet::new();
    let mut deduped = 0usize;
    rules.retain(|rule| {
        if seen.insert(RuleKey::from(rule)) {
            true
        } else {
            deduped += 1;
            false
        }
    });

    OptimizeStats {
        before,
        after: rules.len(),
        deduped,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    allow: bool,
    url_filter: String,
    resource_types: u16,
}

impl From<&ParsedRule> for RuleKey {
    fn from(rule: &ParsedRule) -> Self {
        Self {
            allow: rule.action == pw_core::RuleAction::Allow,
            url_filter: rule.url_filter.clone(),
            resource_types: rule.resource_types.bits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rule_list;

    #[test]
    fn removes_exact_duplicates_only() {
        let mut rules = parse_rule_list(
            "||a.example^\n||b.example^\n||a.example^\n0.0.0.0 a.example\n@@||a.example^\n||a.example^$script",
        );
        let stats = optimize_rules(&mut rules);
        assert_eq!(stats.before, 6);
        assert_eq!(stats.deduped, 2);
        assert_eq!(stats.after, 4);
        assert_eq!(rules[0].line, 1);
        assert_eq!(rules[1].url_filter, "||b.example^");
    }
}
