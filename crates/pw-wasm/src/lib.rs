//! WebAssembly bindings for PureWeb
//!
//! The host (a browser extension background page) owns the evaluator and the
//! settings storage. These bindings expose the pure decision functions; the
//! host passes the settings record as JSON and applies what comes back.

use wasm_bindgen::prelude::*;

use pw_core::cosmetic::{cosmetic_plan, STYLE_ELEMENT_ID};
use pw_core::status::{compatibility_category, protection_status, ProtectionStatus};
use pw_core::{
    classify, plan_replace, select_categories, synthesize, InstalledRule, Settings, StatBucket,
};

fn parse_settings(settings_json: &str) -> Result<Settings, JsValue> {
    serde_json::from_str(settings_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

fn log_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Default settings record as JSON.
#[wasm_bindgen]
pub fn default_settings() -> Result<String, JsValue> {
    to_json(&Settings::default())
}

/// Dynamic rules for the settings, as a JSON array in the evaluator's format.
#[wasm_bindgen]
pub fn synthesize_rules(settings_json: &str) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?;
    to_json(&synthesize(&settings))
}

/// Static ruleset ids to keep enabled.
#[wasm_bindgen]
pub fn active_categories(settings_json: &str) -> Result<js_sys::Array, JsValue> {
    let settings = parse_settings(settings_json)?;
    let result = js_sys::Array::new();
    for category in select_categories(&settings) {
        result.push(&JsValue::from_str(category.ruleset_id()));
    }
    Ok(result)
}

/// Replace instruction against the installed dynamic rules.
///
/// Returns `{ removeRuleIds: number[], addRules: string }` where `addRules`
/// is the JSON rule array.
#[wasm_bindgen]
pub fn plan_replace_rules(installed_json: &str, settings_json: &str) -> Result<JsValue, JsValue> {
    let settings = parse_settings(settings_json)?;
    let installed: Vec<InstalledRule> = serde_json::from_str(installed_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid installed rules: {}", e)))?;

    let plan = plan_replace(&installed, synthesize(&settings));
    if plan.is_noop(&installed) {
        log_warn("PureWeb: dynamic rules already current");
    }

    let remove = js_sys::Array::new();
    for id in &plan.remove_ids {
        remove.push(&JsValue::from(*id));
    }

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"removeRuleIds".into(), &remove);
    let _ = js_sys::Reflect::set(&js_result, &"addRules".into(), &JsValue::from_str(&to_json(&plan.add_rules)?));
    Ok(js_result.into())
}

/// Counter a matched rule id is booked against: `"blockedAds"`,
/// `"blockedTrackers"` or `undefined`.
#[wasm_bindgen]
pub fn classify_rule(rule_id: u32) -> Option<String> {
    classify(rule_id).map(|bucket| {
        match bucket {
            StatBucket::Ads => "blockedAds",
            StatBucket::Trackers => "blockedTrackers",
        }
        .to_string()
    })
}

/// Settings with `domain` toggled in the whitelist.
#[wasm_bindgen]
pub fn toggle_whitelist(settings_json: &str, domain: &str) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?;
    to_json(&pw_core::toggle_whitelist(&settings, domain))
}

/// `{ status, category? }` for the popup.
#[wasm_bindgen]
pub fn site_status(settings_json: &str, host: &str) -> Result<JsValue, JsValue> {
    let settings = parse_settings(settings_json)?;
    let status = match protection_status(&settings, host) {
        ProtectionStatus::Disabled => "disabled",
        ProtectionStatus::Whitelisted => "whitelisted",
        ProtectionStatus::Compatibility => "compatibility",
        ProtectionStatus::Active => "active",
    };

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"status".into(), &JsValue::from_str(status));
    if let Some(category) = compatibility_category(&settings, host) {
        let _ = js_sys::Reflect::set(&js_result, &"category".into(), &JsValue::from_str(&category.to_string()));
    }
    Ok(js_result.into())
}

/// `{ styleId, css }` to inject on a page, or `null` when nothing is hidden.
#[wasm_bindgen]
pub fn cosmetic_css(settings_json: &str, host: &str) -> Result<JsValue, JsValue> {
    let settings = parse_settings(settings_json)?;
    let Some(plan) = cosmetic_plan(&settings, host) else {
        return Ok(JsValue::NULL);
    };

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"styleId".into(), &JsValue::from_str(STYLE_ELEMENT_ID));
    let _ = js_sys::Reflect::set(&js_result, &"css".into(), &JsValue::from_str(&plan.stylesheet()));
    Ok(js_result.into())
}
