//! In-memory store and evaluator.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{EvaluatorError, StoreError};
use crate::ids::{is_engine_owned, RuleId};
use crate::ports::{Evaluator, MatchSubscription, SettingsStore};
use crate::settings::{Settings, SETTINGS_KEY};
use crate::types::{Category, DynamicRule, InstalledRule};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

fn evaluator_poisoned<T>(_: T) -> EvaluatorError {
    EvaluatorError::Unavailable("evaluator lock poisoned".to_string())
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Key-value store holding the settings record as a JSON string.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    yield_on_io: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `settings`.
    pub fn with_settings(settings: &Settings) -> Result<Self, StoreError> {
        let store = Self::new();
        store
            .entries
            .lock()
            .map_err(poisoned)?
            .insert(SETTINGS_KEY.to_string(), serde_json::to_string(settings)?);
        Ok(store)
    }

    /// Suspend once inside every `get` and `set`, the way real storage I/O
    /// would. Lets concurrent read-modify-write paths interleave.
    pub fn yield_on_io(self, enabled: bool) -> Self {
        self.yield_on_io.store(enabled, Ordering::SeqCst);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw persisted value under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn maybe_yield(&self) {
        if self.yield_on_io.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> Result<Option<Settings>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failed".to_string()));
        }
        let raw = self.entries.lock().map_err(poisoned)?.get(SETTINGS_KEY).cloned();
        self.maybe_yield().await;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, settings: &Settings) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failed".to_string()));
        }
        let raw = serde_json::to_string(settings)?;
        self.maybe_yield().await;
        self.entries
            .lock()
            .map_err(poisoned)?
            .insert(SETTINGS_KEY.to_string(), raw);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// MemoryEvaluator
// =============================================================================

#[derive(Debug, Default)]
struct EvaluatorState {
    enabled: Vec<Category>,
    dynamic: Vec<InstalledRule>,
}

/// Evaluator keeping its rule tables in memory.
///
/// Replace calls are all-or-nothing: the new table is built and validated
/// before it is swapped in.
#[derive(Debug)]
pub struct MemoryEvaluator {
    state: Mutex<EvaluatorState>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<RuleId>>>,
    telemetry: bool,
    max_dynamic_rules: Option<usize>,
    reject_categories: AtomicBool,
    reject_replace: AtomicBool,
}

impl Default for MemoryEvaluator {
    fn default() -> Self {
        Self {
            state: Mutex::new(EvaluatorState::default()),
            subscribers: Mutex::new(Vec::new()),
            telemetry: true,
            max_dynamic_rules: None,
            reject_categories: AtomicBool::new(false),
            reject_replace: AtomicBool::new(false),
        }
    }
}

impl MemoryEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the dynamic table, e.g. with rules owned by other producers.
    pub fn with_rules(self, rules: Vec<InstalledRule>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.dynamic = rules;
        }
        self
    }

    /// Seed the enabled static categories.
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.enabled = categories;
        }
        self
    }

    /// Reject replace calls that would leave more than `max` dynamic rules.
    pub fn with_quota(mut self, max: usize) -> Self {
        self.max_dynamic_rules = Some(max);
        self
    }

    /// Evaluator without match telemetry.
    pub fn without_telemetry(mut self) -> Self {
        self.telemetry = false;
        self
    }

    pub fn set_reject_categories(&self, reject: bool) {
        self.reject_categories.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_replace(&self, reject: bool) {
        self.reject_replace.store(reject, Ordering::SeqCst);
    }

    /// Snapshot of the dynamic table.
    pub fn dynamic_rules(&self) -> Vec<InstalledRule> {
        self.state
            .lock()
            .map(|state| state.dynamic.clone())
            .unwrap_or_default()
    }

    /// Engine-owned rules of the dynamic table, in table order.
    pub fn engine_rules(&self) -> Vec<DynamicRule> {
        self.dynamic_rules()
            .iter()
            .filter(|rule| is_engine_owned(rule.id))
            .filter_map(InstalledRule::as_rule)
            .collect()
    }

    /// Snapshot of the enabled categories.
    pub fn enabled_categories(&self) -> Vec<Category> {
        self.state
            .lock()
            .map(|state| state.enabled.clone())
            .unwrap_or_default()
    }

    /// Publish a match to all live subscribers. Returns how many got it.
    pub fn emit_match(&self, rule_id: RuleId) -> usize {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return 0;
        };
        subscribers.retain(|tx| tx.send(rule_id).is_ok());
        subscribers.len()
    }

    /// Drop all subscriptions, ending their streams.
    pub fn close_subscriptions(&self) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.clear();
        }
    }
}

#[async_trait]
impl Evaluator for MemoryEvaluator {
    async fn list_static_categories(&self) -> Result<Vec<Category>, EvaluatorError> {
        Ok(self.state.lock().map_err(evaluator_poisoned)?.enabled.clone())
    }

    async fn set_enabled_categories(
        &self,
        enable: &[Category],
        disable: &[Category],
    ) -> Result<(), EvaluatorError> {
        if self.reject_categories.load(Ordering::SeqCst) {
            return Err(EvaluatorError::Rejected("ruleset update refused".to_string()));
        }
        let mut state = self.state.lock().map_err(evaluator_poisoned)?;
        state.enabled.retain(|category| !disable.contains(category));
        for category in enable {
            if !state.enabled.contains(category) {
                state.enabled.push(*category);
            }
        }
        Ok(())
    }

    async fn list_dynamic_rules(&self) -> Result<Vec<InstalledRule>, EvaluatorError> {
        Ok(self.state.lock().map_err(evaluator_poisoned)?.dynamic.clone())
    }

    async fn replace_dynamic_rules(
        &self,
        remove_ids: &[RuleId],
        add_rules: &[DynamicRule],
    ) -> Result<(), EvaluatorError> {
        if self.reject_replace.load(Ordering::SeqCst) {
            return Err(EvaluatorError::Rejected("dynamic rule update refused".to_string()));
        }

        let mut state = self.state.lock().map_err(evaluator_poisoned)?;
        let remove: HashSet<RuleId> = remove_ids.iter().copied().collect();
        let mut next: Vec<InstalledRule> = state
            .dynamic
            .iter()
            .filter(|rule| !remove.contains(&rule.id))
            .cloned()
            .collect();

        let mut ids: HashSet<RuleId> = next.iter().map(|rule| rule.id).collect();
        for rule in add_rules {
            if !ids.insert(rule.id) {
                return Err(EvaluatorError::Rejected(format!("duplicate rule id {}", rule.id)));
            }
        }
        for rule in add_rules {
            let installed = InstalledRule::try_from(rule)
                .map_err(|e| EvaluatorError::Rejected(format!("rule {}: {}", rule.id, e)))?;
            next.push(installed);
        }

        if let Some(max) = self.max_dynamic_rules {
            if next.len() > max {
                return Err(EvaluatorError::Rejected(format!(
                    "quota exceeded: {} rules, limit {}",
                    next.len(),
                    max
                )));
            }
        }

        state.dynamic = next;
        Ok(())
    }

    fn subscribe_matches(&self) -> Option<MatchSubscription> {
        if !self.telemetry {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().ok()?.push(tx);
        Some(MatchSubscription::new(rx))
    }
}
