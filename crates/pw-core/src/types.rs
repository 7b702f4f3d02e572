//! Core type definitions for PureWeb
//!
//! These types map directly to the evaluator's declarative rule format and
//! are used throughout the engine.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::ids::{RuleId, ADS_RANGE, SOCIAL_RANGE, TRACKERS_RANGE};

// =============================================================================
// Rule Actions
// =============================================================================

/// Action to take for a matched rule.
///
/// Serialized as `{"type": "allow"}` / `{"type": "block"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RuleAction {
    /// Exception - lets the request through
    Allow,
    /// Cancels the request
    Block,
}

// =============================================================================
// Resource Types (bit mask for type filtering)
// =============================================================================

bitflags::bitflags! {
    /// Resource type bit mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceType: u16 {
        const MAIN_FRAME = 1 << 0;
        const SUB_FRAME = 1 << 1;  // iframe/frame
        const STYLESHEET = 1 << 2;
        const SCRIPT = 1 << 3;
        const IMAGE = 1 << 4;
        const FONT = 1 << 5;
        const OBJECT = 1 << 6;
        const XMLHTTPREQUEST = 1 << 7;
        const PING = 1 << 8;
        const CSP_REPORT = 1 << 9;
        const MEDIA = 1 << 10;
        const WEBSOCKET = 1 << 11;
        const OTHER = 1 << 12;

        /// Document types (main_frame + sub_frame)
        const DOCUMENT = Self::MAIN_FRAME.bits() | Self::SUB_FRAME.bits();
    }
}

/// Canonical (name, flag) order used for serialization.
const RESOURCE_TYPE_NAMES: [(&str, ResourceType); 13] = [
    ("main_frame", ResourceType::MAIN_FRAME),
    ("sub_frame", ResourceType::SUB_FRAME),
    ("stylesheet", ResourceType::STYLESHEET),
    ("script", ResourceType::SCRIPT),
    ("image", ResourceType::IMAGE),
    ("font", ResourceType::FONT),
    ("object", ResourceType::OBJECT),
    ("xmlhttprequest", ResourceType::XMLHTTPREQUEST),
    ("ping", ResourceType::PING),
    ("csp_report", ResourceType::CSP_REPORT),
    ("media", ResourceType::MEDIA),
    ("websocket", ResourceType::WEBSOCKET),
    ("other", ResourceType::OTHER),
];

impl ResourceType {
    /// Parse a single resource type name as used by the evaluator.
    pub fn from_type_name(s: &str) -> Option<Self> {
        RESOURCE_TYPE_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, flag)| *flag)
    }

    /// Names of the set bits, in canonical order.
    pub fn type_names(self) -> impl Iterator<Item = &'static str> {
        RESOURCE_TYPE_NAMES
            .iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
    }
}

impl Serialize for ResourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for name in self.type_names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamesVisitor;

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = ResourceType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of resource type names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut mask = ResourceType::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let flag = ResourceType::from_type_name(&name).ok_or_else(|| {
                        de::Error::custom(format!("unknown resource type '{name}'"))
                    })?;
                    mask |= flag;
                }
                Ok(mask)
            }
        }

        deserializer.deserialize_seq(NamesVisitor)
    }
}

// =============================================================================
// Static Categories
// =============================================================================

/// A pre-compiled static ruleset, toggled as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "rules_ads")]
    Ads,
    #[serde(rename = "rules_trackers")]
    Trackers,
    #[serde(rename = "rules_social")]
    Social,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Ads, Category::Trackers, Category::Social];

    /// Ruleset identifier as registered with the evaluator.
    pub fn ruleset_id(self) -> &'static str {
        match self {
            Self::Ads => "rules_ads",
            Self::Trackers => "rules_trackers",
            Self::Social => "rules_social",
        }
    }

    /// Id range the category's static rules must stay inside.
    pub fn id_range(self) -> Range<RuleId> {
        match self {
            Self::Ads => ADS_RANGE,
            Self::Trackers => TRACKERS_RANGE,
            Self::Social => SOCIAL_RANGE,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ruleset_id())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts both the short name (`ads`) and the ruleset id (`rules_ads`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("rules_").unwrap_or(s) {
            "ads" => Ok(Self::Ads),
            "trackers" => Ok(Self::Trackers),
            "social" => Ok(Self::Social),
            _ => Err(format!("unknown category '{s}'")),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Match condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// Fragment matched against the request URL
    pub url_filter: String,
    /// Resource types the rule applies to
    pub resource_types: ResourceType,
}

/// A declarative rule in the evaluator's format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

/// Rules the engine installs at runtime. Always `Allow`, always id ≥ 10000.
pub type DynamicRule = Rule;

impl Rule {
    /// Build an allow-rule for `url_filter`.
    pub fn allow(id: RuleId, priority: u32, url_filter: &str, resource_types: ResourceType) -> Self {
        Self {
            id,
            priority,
            action: RuleAction::Allow,
            condition: RuleCondition {
                url_filter: url_filter.to_string(),
                resource_types,
            },
        }
    }
}

/// A rule as listed by the evaluator.
///
/// The table is shared with other producers whose rules can take any shape
/// the evaluator supports (redirects, `requestDomains`, no type filter). Only
/// the id is interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledRule {
    pub id: RuleId,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl InstalledRule {
    /// Decode as an engine-format rule. `None` for any other shape.
    pub fn as_rule(&self) -> Option<Rule> {
        let mut object = self.body.clone();
        object.insert("id".to_string(), self.id.into());
        serde_json::from_value(serde_json::Value::Object(object)).ok()
    }
}

impl TryFrom<&Rule> for InstalledRule {
    type Error = serde_json::Error;

    fn try_from(rule: &Rule) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(rule)?)
    }
}
