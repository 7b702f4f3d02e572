//! Compatibility allowlist ("relax matrix").
//!
//! Destinations whose scripts and APIs must keep working regardless of the
//! blocking profile. The table is hand-curated and compiled in; it is never
//! persisted or changed at runtime.

use std::fmt;

/// Protected destination class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelaxCategory {
    Streaming,
    Finance,
    Identity,
    Gov,
}

impl fmt::Display for RelaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Streaming => "STREAMING",
            Self::Finance => "FINANCE",
            Self::Identity => "IDENTITY",
            Self::Gov => "GOV",
        })
    }
}

/// The matrix, in declaration order. Fragments ending in `.` match any TLD.
pub const RELAX_MATRIX: &[(RelaxCategory, &[&str])] = &[
    (
        RelaxCategory::Streaming,
        &["netflix.com", "primevideo.com", "disneyplus.com", "hbo.com", "youtube.com"],
    ),
    (
        RelaxCategory::Finance,
        &["paypal.com", "stripe.com", "checkout.", "pagseguro.", "mercadopago."],
    ),
    (
        RelaxCategory::Identity,
        &["accounts.google.", "login.microsoftonline.", "appleid.apple."],
    ),
    (RelaxCategory::Gov, &["gov.br", "gov.uk", "usa.gov"]),
];

/// All fragments flattened in declaration order.
pub fn fragments() -> impl Iterator<Item = &'static str> {
    RELAX_MATRIX
        .iter()
        .flat_map(|(_, list)| list.iter().copied())
}

/// Number of fragments in the matrix.
pub fn fragment_count() -> usize {
    RELAX_MATRIX.iter().map(|(_, list)| list.len()).sum()
}

/// Category whose fragment covers `host`, if any.
///
/// Used for display only; the evaluator does its own matching on the rules
/// we emit.
pub fn category_for_host(host: &str) -> Option<RelaxCategory> {
    let host = host.to_ascii_lowercase();
    RELAX_MATRIX
        .iter()
        .find(|(_, list)| list.iter().any(|fragment| fragment_matches_host(fragment, &host)))
        .map(|(category, _)| *category)
}

/// Label-aligned match of a relax fragment against a host.
///
/// A fragment like `paypal.com` matches `paypal.com` and `www.paypal.com`.
/// A trailing-dot fragment like `checkout.` matches a label sequence anywhere
/// in the host, e.g. `checkout.shop.com` or `pay.checkout.io`.
pub(crate) fn fragment_matches_host(fragment: &str, host: &str) -> bool {
    if fragment.ends_with('.') {
        host.starts_with(fragment) || host.contains(&format!(".{fragment}"))
    } else {
        host == fragment || host.ends_with(&format!(".{fragment}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let all: Vec<_> = fragments().collect();
        assert_eq!(all.first(), Some(&"netflix.com"));
        assert_eq!(all[5], "paypal.com");
        assert_eq!(all.last(), Some(&"usa.gov"));
        assert_eq!(all.len(), fragment_count());
        assert_eq!(fragment_count(), 16);
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(category_for_host("www.netflix.com"), Some(RelaxCategory::Streaming));
        assert_eq!(category_for_host("checkout.shop.com"), Some(RelaxCategory::Finance));
        assert_eq!(category_for_host("accounts.google.de"), Some(RelaxCategory::Identity));
        assert_eq!(category_for_host("portal.gov.uk"), Some(RelaxCategory::Gov));
        assert_eq!(category_for_host("example.com"), None);
    }

    #[test]
    fn test_no_substring_leakage() {
        // "notnetflix.com" merely contains the fragment
        assert_eq!(category_for_host("notnetflix.com"), None);
        assert_eq!(category_for_host("mycheckout.example"), None);
    }
}
