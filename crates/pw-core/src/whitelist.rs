//! Whitelist mutation and lookup.

use crate::settings::Settings;

/// Toggle `domain` in the whitelist.
///
/// Removes the first exact match if present, otherwise appends. The domain is
/// stored as given; no validation happens here.
pub fn toggle_whitelist(settings: &Settings, domain: &str) -> Settings {
    let mut next = settings.clone();
    toggle_in_place(&mut next.whitelist, domain);
    next
}

/// Returns `true` if the domain was added, `false` if it was removed.
pub(crate) fn toggle_in_place(whitelist: &mut Vec<String>, domain: &str) -> bool {
    match whitelist.iter().position(|entry| entry == domain) {
        Some(index) => {
            whitelist.remove(index);
            false
        }
        None => {
            whitelist.push(domain.to_string());
            true
        }
    }
}

/// Whether `host` is covered by a whitelist entry.
///
/// An entry covers the host itself and its subdomains. Matching is on label
/// boundaries, so `ample.com` does not cover `example.com`. Empty entries
/// cover nothing.
pub fn is_whitelisted(settings: &Settings, host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    settings.whitelist.iter().any(|entry| {
        let entry = entry.trim().to_ascii_lowercase();
        !entry.is_empty()
            && (host == entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_whitelist(entries: &[&str]) -> Settings {
        Settings {
            whitelist: entries.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_toggle_appends_when_absent() {
        let s = toggle_whitelist(&with_whitelist(&["a.com"]), "b.com");
        assert_eq!(s.whitelist, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_toggle_removes_first_match() {
        let s = toggle_whitelist(&with_whitelist(&["a.com", "b.com", "c.com"]), "b.com");
        assert_eq!(s.whitelist, vec!["a.com", "c.com"]);
    }

    #[test]
    fn test_double_toggle_restores_absent_domain() {
        let original = with_whitelist(&["a.com", "b.com"]);
        let round_trip = toggle_whitelist(&toggle_whitelist(&original, "x.com"), "x.com");
        assert_eq!(round_trip, original);
    }

    #[test]
    fn test_double_toggle_moves_present_domain_to_end() {
        let original = with_whitelist(&["a.com", "b.com"]);
        let round_trip = toggle_whitelist(&toggle_whitelist(&original, "a.com"), "a.com");
        assert_eq!(round_trip.whitelist, vec!["b.com", "a.com"]);
    }

    #[test]
    fn test_toggle_is_exact_match() {
        let s = toggle_whitelist(&with_whitelist(&["example.com"]), "Example.com");
        assert_eq!(s.whitelist, vec!["example.com", "Example.com"]);
    }

    #[test]
    fn test_toggle_accepts_empty_domain() {
        let s = toggle_whitelist(&Settings::default(), "");
        assert_eq!(s.whitelist, vec![""]);
    }

    #[test]
    fn test_toggle_leaves_other_fields() {
        let mut original = with_whitelist(&[]);
        original.stats.blocked_ads = 7;
        let s = toggle_whitelist(&original, "a.com");
        assert_eq!(s.stats.blocked_ads, 7);
        assert_eq!(s.auto_relax, original.auto_relax);
    }

    #[test]
    fn test_is_whitelisted_label_boundaries() {
        let s = with_whitelist(&["example.com", ""]);
        assert!(is_whitelisted(&s, "example.com"));
        assert!(is_whitelisted(&s, "www.Example.com"));
        assert!(!is_whitelisted(&s, "badexample.com"));
        assert!(!is_whitelisted(&s, "example.com.evil.net"));
        assert!(!is_whitelisted(&s, "other.org"));
    }
}
