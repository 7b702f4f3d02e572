//! Per-site protection status, for display.

use serde::Serialize;

use crate::relax::{self, RelaxCategory};
use crate::settings::Settings;
use crate::whitelist::is_whitelisted;

/// What the engine currently does for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionStatus {
    /// Master switch is off
    Disabled,
    /// User exempted the site
    Whitelisted,
    /// Site is in the relax matrix and auto-relax is on
    Compatibility,
    /// Normal blocking
    Active,
}

/// Status of `host` under `settings`. Whitelist wins over the relax matrix.
pub fn protection_status(settings: &Settings, host: &str) -> ProtectionStatus {
    if !settings.enabled {
        ProtectionStatus::Disabled
    } else if is_whitelisted(settings, host) {
        ProtectionStatus::Whitelisted
    } else if settings.auto_relax && relax::category_for_host(host).is_some() {
        ProtectionStatus::Compatibility
    } else {
        ProtectionStatus::Active
    }
}

/// Relax category that puts `host` in compatibility mode, if any.
pub fn compatibility_category(settings: &Settings, host: &str) -> Option<RelaxCategory> {
    match protection_status(settings, host) {
        ProtectionStatus::Compatibility => relax::category_for_host(host),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_precedence() {
        let settings = Settings {
            whitelist: vec!["netflix.com".to_string()],
            ..Settings::default()
        };
        assert_eq!(protection_status(&settings, "www.netflix.com"), ProtectionStatus::Whitelisted);
        assert_eq!(protection_status(&settings, "paypal.com"), ProtectionStatus::Compatibility);
        assert_eq!(protection_status(&settings, "news.example"), ProtectionStatus::Active);
    }

    #[test]
    fn test_auto_relax_off_means_active() {
        let settings = Settings {
            auto_relax: false,
            ..Settings::default()
        };
        assert_eq!(protection_status(&settings, "paypal.com"), ProtectionStatus::Active);
        assert_eq!(compatibility_category(&settings, "paypal.com"), None);
    }

    #[test]
    fn test_disabled_overrides_everything() {
        let settings = Settings {
            enabled: false,
            whitelist: vec!["example.com".to_string()],
            ..Settings::default()
        };
        assert_eq!(protection_status(&settings, "example.com"), ProtectionStatus::Disabled);
    }

    #[test]
    fn test_compatibility_category() {
        let settings = Settings::default();
        assert_eq!(
            compatibility_category(&settings, "login.microsoftonline.com"),
            Some(RelaxCategory::Identity)
        );
    }
}
