//! Engine façade
//!
//! Orchestrates selection, synthesis and reconciliation against the
//! evaluator, and books match events into the settings record.
//!
//! Every read-modify-write of the settings record goes through one write
//! gate: settings updates, whitelist toggles, stats commits and bootstrap all
//! hold it across their `get` → modify → `set` sequence. Without it a stats
//! increment landing between a toggle's `get` and `set` would be overwritten.
//! Settings-driven passes keep holding the gate while they reconcile, so the
//! evaluator always ends up reflecting the most recently persisted settings.

use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::error::{EngineError, EvaluatorError};
use crate::ids::RuleId;
use crate::ports::{Evaluator, MatchSubscription, SettingsStore};
use crate::reconcile::plan_replace;
use crate::selector::{plan_static, select_categories};
use crate::settings::Settings;
use crate::stats::{classify, StatBucket};
use crate::synth::synthesize;
use crate::whitelist::toggle_in_place;

/// The orchestrating façade. Owns its store and evaluator handles.
pub struct Engine<S, E> {
    store: S,
    evaluator: E,
    write_gate: Mutex<()>,
}

impl<S: SettingsStore, E: Evaluator> Engine<S, E> {
    pub fn new(store: S, evaluator: E) -> Self {
        Self {
            store,
            evaluator,
            write_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Process start: persist defaults if nothing is stored, then reconcile.
    pub async fn bootstrap(&self) -> Result<Settings, EngineError> {
        let _gate = self.write_gate.lock().await;

        let settings = match self.store.get().await? {
            Some(settings) => settings,
            None => {
                let defaults = Settings::default();
                self.store.set(&defaults).await?;
                info!("no stored settings, wrote defaults");
                defaults
            }
        };

        self.apply(&settings).await?;
        Ok(settings)
    }

    /// Persist `new_settings` and reconcile the evaluator with them.
    ///
    /// Counters in `new_settings` are ignored; the stored counters are kept.
    /// If persisting fails the evaluator is not touched.
    pub async fn on_settings_changed(&self, new_settings: Settings) -> Result<Settings, EngineError> {
        let _gate = self.write_gate.lock().await;

        let mut next = new_settings;
        next.stats = self
            .store
            .get()
            .await?
            .map(|current| current.stats)
            .unwrap_or_default();
        self.store.set(&next).await?;
        debug!("settings persisted");

        self.apply(&next).await?;
        Ok(next)
    }

    /// Add or remove `domain` from the whitelist, persist, then reconcile.
    pub async fn toggle_whitelist(&self, domain: &str) -> Result<Settings, EngineError> {
        let _gate = self.write_gate.lock().await;

        let mut settings = self.store.get().await?.unwrap_or_default();
        let added = toggle_in_place(&mut settings.whitelist, domain);
        self.store.set(&settings).await?;
        info!(
            "whitelist {} '{}' ({} entries)",
            if added { "added" } else { "removed" },
            domain,
            settings.whitelist.len()
        );

        self.apply(&settings).await?;
        Ok(settings)
    }

    /// Book a match event. Returns the bucket that was incremented, if any.
    ///
    /// Ids outside the counted ranges return `Ok(None)` without touching the
    /// store.
    pub async fn on_match(&self, rule_id: RuleId) -> Result<Option<StatBucket>, EngineError> {
        let Some(bucket) = classify(rule_id) else {
            return Ok(None);
        };

        let _gate = self.write_gate.lock().await;
        let mut settings = self.store.get().await?.unwrap_or_default();
        settings.stats.record(bucket);
        self.store.set(&settings).await?;
        Ok(Some(bucket))
    }

    /// Full reconciliation pass from the currently stored settings.
    pub async fn reconcile(&self) -> Result<(), EngineError> {
        let _gate = self.write_gate.lock().await;
        let settings = self.store.get().await?.unwrap_or_default();
        self.apply(&settings).await
    }

    /// Currently stored settings, or defaults if none are stored.
    pub async fn settings(&self) -> Result<Settings, EngineError> {
        Ok(self.store.get().await?.unwrap_or_default())
    }

    /// Subscribe to the evaluator's match events.
    pub fn subscribe(&self) -> Option<MatchSubscription> {
        let subscription = self.evaluator.subscribe_matches();
        if subscription.is_none() {
            info!("evaluator has no match telemetry, stats collection disabled");
        }
        subscription
    }

    /// Feed match events into [`on_match`](Self::on_match) until the
    /// subscription ends. Failed commits are logged and skipped.
    ///
    /// Returns the number of events processed.
    pub async fn run_match_loop(&self, mut subscription: MatchSubscription) -> usize {
        let mut processed = 0usize;
        while let Some(rule_id) = subscription.next().await {
            processed += 1;
            if let Err(e) = self.on_match(rule_id).await {
                warn!("dropping match for rule {}: {}", rule_id, e);
            }
        }
        debug!("match subscription ended after {} events", processed);
        processed
    }

    /// Push `settings` to the evaluator. Caller holds the write gate.
    ///
    /// Static and dynamic updates are attempted independently; the first
    /// failure is returned. The next pass recomputes everything from
    /// settings, so a partial update heals itself.
    async fn apply(&self, settings: &Settings) -> Result<(), EngineError> {
        let static_result = self.apply_static(settings).await;
        if let Err(e) = &static_result {
            warn!("static ruleset update failed: {}", e);
        }

        let dynamic_result = self.apply_dynamic(settings).await;
        if let Err(e) = &dynamic_result {
            warn!("dynamic rule update failed: {}", e);
        }

        static_result?;
        dynamic_result?;
        Ok(())
    }

    async fn apply_static(&self, settings: &Settings) -> Result<(), EvaluatorError> {
        let active = select_categories(settings);
        let current = self.evaluator.list_static_categories().await?;
        let plan = plan_static(&current, &active);
        self.evaluator
            .set_enabled_categories(&plan.enable, &plan.disable)
            .await?;
        debug!("static categories: enable {:?}, disable {:?}", plan.enable, plan.disable);
        Ok(())
    }

    async fn apply_dynamic(&self, settings: &Settings) -> Result<(), EvaluatorError> {
        let installed = self.evaluator.list_dynamic_rules().await?;
        let plan = plan_replace(&installed, synthesize(settings));
        if plan.is_noop(&installed) {
            debug!("dynamic rules already current, replacing anyway");
        }
        self.evaluator
            .replace_dynamic_rules(&plan.remove_ids, &plan.add_rules)
            .await?;
        info!(
            "dynamic rules reconciled: removed {}, added {}",
            plan.remove_ids.len(),
            plan.add_rules.len()
        );
        Ok(())
    }
}
