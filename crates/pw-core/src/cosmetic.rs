//! Cosmetic hiding plan.
//!
//! Decides which element selectors to hide on a page. Injecting the
//! stylesheet and watching the DOM is the host's job.

use crate::settings::{Profile, Settings};
use crate::whitelist::is_whitelisted;

/// High-confidence ad container selectors.
pub const BALANCED_SELECTORS: &[&str] = &[
    "[id*=\"google_ads\"]",
    "[class*=\"adsbygoogle\"]",
    "iframe[src*=\"doubleclick.net\"]",
    ".ad-container",
    ".ad-unit",
    "[data-ad-slot]",
    "aside:has(.ad)",
    ".sponsored-content",
];

/// Broader heuristics, only for the aggressive profile.
pub const AGGRESSIVE_SELECTORS: &[&str] = &[
    "[id*=\"ad-\"]",
    "[class*=\"ad-\"]",
    "iframe[src*=\"ads\"]",
    ".OUTBRAIN",
    ".ob-widget",
    "div[class*=\"Sponsored\"]",
    "div[class*=\"promoted\"]",
    "section:has([class*=\"ad\"])",
];

/// Element id the host should give the injected style element.
pub const STYLE_ELEMENT_ID: &str = "pureweb-hf-engine";

/// Declarations that collapse a hidden element without shifting layout twice.
const HIDE_DECLARATIONS: &str = "display: none !important; \
visibility: hidden !important; \
opacity: 0 !important; \
pointer-events: none !important; \
height: 0 !important; \
min-height: 0 !important; \
max-height: 0 !important; \
margin: 0 !important; \
padding: 0 !important; \
overflow: hidden !important;";

/// Selectors to hide on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmeticPlan {
    pub selectors: Vec<&'static str>,
}

impl CosmeticPlan {
    /// Stylesheet text for the plan.
    pub fn stylesheet(&self) -> String {
        format!("{} {{ {} }}", self.selectors.join(", "), HIDE_DECLARATIONS)
    }
}

/// Selectors for a profile. Basic and balanced share the same set.
pub fn selectors_for(profile: Profile) -> Vec<&'static str> {
    let mut selectors = BALANCED_SELECTORS.to_vec();
    if profile == Profile::Aggressive {
        selectors.extend_from_slice(AGGRESSIVE_SELECTORS);
    }
    selectors
}

/// Cosmetic plan for a page on `host`, or `None` if nothing should be hidden.
pub fn cosmetic_plan(settings: &Settings, host: &str) -> Option<CosmeticPlan> {
    if !settings.enabled || !settings.block_cosmetic || is_whitelisted(settings, host) {
        return None;
    }
    Some(CosmeticPlan {
        selectors: selectors_for(settings.profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggressive_extends_balanced() {
        let balanced = selectors_for(Profile::Balanced);
        let aggressive = selectors_for(Profile::Aggressive);
        assert_eq!(selectors_for(Profile::Basic), balanced);
        assert_eq!(aggressive.len(), BALANCED_SELECTORS.len() + AGGRESSIVE_SELECTORS.len());
        assert!(aggressive.starts_with(&balanced));
    }

    #[test]
    fn test_no_plan_when_off_or_whitelisted() {
        let off = Settings {
            block_cosmetic: false,
            ..Settings::default()
        };
        assert!(cosmetic_plan(&off, "news.example").is_none());

        let disabled = Settings {
            enabled: false,
            ..Settings::default()
        };
        assert!(cosmetic_plan(&disabled, "news.example").is_none());

        let whitelisted = Settings {
            whitelist: vec!["news.example".to_string()],
            ..Settings::default()
        };
        assert!(cosmetic_plan(&whitelisted, "www.news.example").is_none());
    }

    #[test]
    fn test_stylesheet_text() {
        let plan = cosmetic_plan(&Settings::default(), "news.example").unwrap();
        let css = plan.stylesheet();
        assert!(css.starts_with("[id*=\"google_ads\"], [class*=\"adsbygoogle\"]"));
        assert!(css.contains("display: none !important;"));
        assert!(css.ends_with("overflow: hidden !important; }"));
    }
}
