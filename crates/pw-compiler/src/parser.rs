use std::net::IpAddr;

use pw_core::types::{ResourceType, RuleAction};

/// Resource types a rule covers when the list gives none: everything except
/// top-level navigation.
pub const DEFAULT_TYPES: ResourceType = ResourceType::all().difference(ResourceType::MAIN_FRAME);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub action: RuleAction,
    /// URL filter in the evaluator's syntax, e.g. `||ads.example.com^`
    pub url_filter: String,
    pub resource_types: ResourceType,
    /// 1-based source line, for diagnostics
    pub line: usize,
}

pub fn parse_rule_list(text: &str) -> Vec<ParsedRule> {
    let mut rules = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let mut line = raw_line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }

        // Cosmetic filters are handled by the page layer
        if line.contains("##") || line.contains("#@#") || line.contains("#?#") {
            continue;
        }

        if let Some(domain) = parse_hosts_file_domain(line) {
            rules.push(ParsedRule {
                action: RuleAction::Block,
                url_filter: format!("||{domain}^"),
                resource_types: DEFAULT_TYPES,
                line: index + 1,
            });
            continue;
        }

        let mut action = RuleAction::Block;
        if let Some(rest) = line.strip_prefix("@@") {
            action = RuleAction::Allow;
            line = rest.trim_start();
        }

        let (pattern_part, options_text) = split_rule_options(line);
        let resource_types = match options_text {
            Some(options_text) => match parse_options(options_text) {
                Some(types) => types,
                None => {
                    log::debug!("line {}: unsupported options '{}'", index + 1, options_text);
                    continue;
                }
            },
            None => DEFAULT_TYPES,
        };

        let pattern_str = pattern_part.trim();

        let url_filter = if let Some(domain) = parse_host_anchor_rule(pattern_str) {
            format!("||{domain}^")
        } else if is_plain_pattern(pattern_str) {
            pattern_str.to_string()
        } else {
            log::debug!("line {}: skipped '{}'", index + 1, raw_line.trim());
            continue;
        };

        rules.push(ParsedRule {
            action,
            url_filter,
            resource_types,
            line: index + 1,
        });
    }

    rules
}

fn split_rule_options(line: &str) -> (&str, Option<&str>) {
    match line.find('$') {
        Some(pos) => (&line[..pos], Some(&line[pos + 1..])),
        None => (line, None),
    }
}

/// Only resource type options are supported; anything else drops the rule.
fn parse_options(text: &str) -> Option<ResourceType> {
    let mut include = ResourceType::empty();
    let mut exclude = ResourceType::empty();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_TYPES);
    }

    for raw in trimmed.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let raw_lower = raw.to_ascii_lowercase();
        let (negated, name) = match raw_lower.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, raw_lower.as_str()),
        };

        let mask = resource_type_mask(name)?;
        if negated {
            exclude |= mask;
        } else {
            include |= mask;
        }
    }

    finalize_mask(include, exclude)
}

fn finalize_mask(include: ResourceType, exclude: ResourceType) -> Option<ResourceType> {
    let base = if include.is_empty() { DEFAULT_TYPES } else { include };
    let mask = base.difference(exclude);
    if mask.is_empty() {
        None
    } else {
        Some(mask)
    }
}

fn resource_type_mask(name: &str) -> Option<ResourceType> {
    match name {
        "document" => Some(ResourceType::MAIN_FRAME),
        "subdocument" => Some(ResourceType::SUB_FRAME),
        "xhr" => Some(ResourceType::XMLHTTPREQUEST),
        "csp" => Some(ResourceType::CSP_REPORT),
        other => ResourceType::from_type_name(other),
    }
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('[') || line.starts_with('#')
}

fn parse_host_anchor_rule(line: &str) -> Option<String> {
    let rest = line.strip_prefix("||")?;
    let rest = rest.strip_prefix('.').unwrap_or(rest);

    let mut end = rest.len();
    for (i, ch) in rest.char_indices() {
        if ch == '^' || ch == '|' {
            end = i;
            break;
        }
        if ch == '/' || ch == '?' || ch == '#' || ch == ':' || ch == '*' {
            return None;
        }
    }

    normalize_domain(&rest[..end])
}

fn parse_hosts_file_domain(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    let first = parts.next()?;
    let second = parts.next()?;

    if first.parse::<IpAddr>().is_ok() && second != "localhost" {
        return normalize_domain(second);
    }

    None
}

fn normalize_domain(host: &str) -> Option<String> {
    let trimmed = host.trim().trim_matches('.');
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    {
        return None;
    }

    Some(trimmed.to_ascii_lowercase())
}

/// Non-anchored URL fragments like `/ads/banner.` or `|https://track.`.
fn is_plain_pattern(pattern: &str) -> bool {
    let rest = pattern.trim_start_matches('|').trim_end_matches('|');
    !rest.is_empty()
        && !rest.contains(char::is_whitespace)
        && !(rest.starts_with('/') && !rest.contains('.') && rest.len() < 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_anchor_rules() {
        let rules = parse_rule_list("||Ads.Example.com^\n@@||cdn.example.com^$script");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].url_filter, "||ads.example.com^");
        assert_eq!(rules[0].action, RuleAction::Block);
        assert_eq!(rules[0].resource_types, DEFAULT_TYPES);
        assert_eq!(rules[1].action, RuleAction::Allow);
        assert_eq!(rules[1].resource_types, ResourceType::SCRIPT);
        assert_eq!(rules[1].line, 2);
    }

    #[test]
    fn parses_hosts_file_lines() {
        let rules = parse_rule_list("0.0.0.0 tracker.example\n127.0.0.1 localhost");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].url_filter, "||tracker.example^");
    }

    #[test]
    fn skips_comments_and_cosmetics() {
        let rules = parse_rule_list("! Title: list\n[Adblock Plus 2.0]\nexample.com##.ad\n# hosts comment\n");
        assert!(rules.is_empty());
    }

    #[test]
    fn negated_types_subtract_from_default() {
        let rules = parse_rule_list("||ads.example^$~image,~script");
        assert_eq!(rules.len(), 1);
        let types = rules[0].resource_types;
        assert!(!types.contains(ResourceType::IMAGE));
        assert!(!types.contains(ResourceType::SCRIPT));
        assert!(types.contains(ResourceType::XMLHTTPREQUEST));
        assert!(!types.contains(ResourceType::MAIN_FRAME));
    }

    #[test]
    fn unsupported_options_drop_rule() {
        let rules = parse_rule_list("||ads.example^$third-party\n||ok.example^$xhr,subdocument");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].url_filter, "||ok.example^");
        assert_eq!(
            rules[0].resource_types,
            ResourceType::XMLHTTPREQUEST | ResourceType::SUB_FRAME
        );
    }

    #[test]
    fn keeps_plain_patterns() {
        let rules = parse_rule_list("/banner/ads.\n/ad\n");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].url_filter, "/banner/ads.");
    }
}
