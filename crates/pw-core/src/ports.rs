//! Capabilities the engine consumes.
//!
//! The evaluator (the component that actually intercepts requests) and the
//! settings store live outside this crate. The engine only talks to them
//! through these traits; [`crate::adapters`] has in-process implementations.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{EvaluatorError, StoreError};
use crate::ids::RuleId;
use crate::settings::Settings;
use crate::types::{Category, DynamicRule, InstalledRule};

/// Single-record settings storage without transactions.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the record. `Ok(None)` if nothing was ever written.
    async fn get(&self) -> Result<Option<Settings>, StoreError>;

    /// Overwrite the record.
    async fn set(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Request evaluator holding static rulesets and a mutable dynamic rule table.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Static categories enabled right now.
    async fn list_static_categories(&self) -> Result<Vec<Category>, EvaluatorError>;

    /// Enable and disable static categories in one call.
    async fn set_enabled_categories(
        &self,
        enable: &[Category],
        disable: &[Category],
    ) -> Result<(), EvaluatorError>;

    /// Every installed dynamic rule, regardless of owner or shape.
    async fn list_dynamic_rules(&self) -> Result<Vec<InstalledRule>, EvaluatorError>;

    /// Remove `remove_ids` and add `add_rules` atomically.
    ///
    /// On error nothing may have changed.
    async fn replace_dynamic_rules(
        &self,
        remove_ids: &[RuleId],
        add_rules: &[DynamicRule],
    ) -> Result<(), EvaluatorError>;

    /// Subscribe to match events. `None` when the evaluator has no match
    /// telemetry; stats collection is then skipped.
    fn subscribe_matches(&self) -> Option<MatchSubscription>;
}

/// Handle for a match event stream.
///
/// The subscription lives until [`unsubscribe`](Self::unsubscribe) is called
/// or the handle is dropped.
#[derive(Debug)]
pub struct MatchSubscription {
    rx: mpsc::UnboundedReceiver<RuleId>,
}

impl MatchSubscription {
    pub fn new(rx: mpsc::UnboundedReceiver<RuleId>) -> Self {
        Self { rx }
    }

    /// Next matched rule id, or `None` once the evaluator stops publishing.
    pub async fn next(&mut self) -> Option<RuleId> {
        self.rx.recv().await
    }

    /// End the subscription. Queued events are discarded.
    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}
