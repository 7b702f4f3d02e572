//! PureWeb Core Library
//!
//! This crate provides the rule orchestration engine for the PureWeb content blocker.
//! It never inspects traffic itself: it emits declarative rules for an external
//! evaluator and keeps that evaluator's rule table in sync with the user's settings.
//!
//! # Architecture
//!
//! Every settings change runs the same pipeline:
//!
//! ```text
//! settings ──► selector ──────► static categories ─┐
//!          └─► synthesizer ──► dynamic rules ──► reconciler ──► evaluator
//! ```
//!
//! Match events flow back from the evaluator into the stats classifier, which
//! commits counter increments to the settings store. The [`engine::Engine`]
//! façade is the only component with side effects; everything else is a pure
//! function of [`Settings`].
//!
//! # Modules
//!
//! - `ids`: rule id ranges and stateless id assignment
//! - `types`: rule, action, condition and resource type definitions
//! - `settings`: the persisted settings record and its defaults
//! - `relax`: the compiled-in compatibility allowlist
//! - `selector`: static category selection
//! - `synth`: dynamic rule synthesis
//! - `whitelist`: whitelist toggle
//! - `reconcile`: replace plan against installed dynamic rules
//! - `stats`: match classification into statistics buckets
//! - `status`: protection status for display
//! - `cosmetic`: cosmetic hiding plan per profile
//! - `ports`: settings store and evaluator capabilities
//! - `adapters`: in-memory and file-backed implementations of the ports
//! - `engine`: the orchestrating façade

pub mod adapters;
pub mod cosmetic;
pub mod engine;
pub mod error;
pub mod ids;
pub mod ports;
pub mod reconcile;
pub mod relax;
pub mod selector;
pub mod settings;
pub mod stats;
pub mod status;
pub mod synth;
pub mod types;
pub mod whitelist;

// Re-export commonly used types
pub use engine::Engine;
pub use error::{EngineError, EvaluatorError, StoreError};
pub use ids::{dynamic_rule_id, RuleId, DYNAMIC_ID_BASE};
pub use ports::{Evaluator, MatchSubscription, SettingsStore};
pub use reconcile::{plan_replace, ReplacePlan};
pub use selector::{plan_static, select_categories, CategoryPlan};
pub use settings::{Profile, Settings, Stats, SETTINGS_KEY};
pub use stats::{classify, StatBucket};
pub use synth::synthesize;
pub use types::{
    Category, DynamicRule, InstalledRule, ResourceType, Rule, RuleAction, RuleCondition,
};
pub use whitelist::toggle_whitelist;
