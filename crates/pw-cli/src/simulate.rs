use std::path::PathBuf;

use pw_core::adapters::{JsonFileStore, MemoryEvaluator};
use pw_core::ids::is_engine_owned;
use pw_core::stats::format_stat;
use pw_core::Engine;

use crate::io;

pub struct SimulateOptions {
    pub store_path: PathBuf,
    pub installed_path: Option<PathBuf>,
    pub toggles: Vec<String>,
    pub match_ids: Vec<u32>,
    pub output_path: Option<PathBuf>,
    pub no_telemetry: bool,
}

/// Drive the engine against a file-backed store and an in-memory evaluator.
pub fn run_simulate(opts: SimulateOptions) -> Result<(), String> {
    let installed = io::read_rules(opts.installed_path.as_deref())?;
    let mut evaluator = MemoryEvaluator::new().with_rules(installed);
    if opts.no_telemetry {
        evaluator = evaluator.without_telemetry();
    }

    let engine = Engine::new(JsonFileStore::new(&opts.store_path), evaluator);
    let runtime = io::runtime()?;

    runtime.block_on(async {
        let settings = engine.bootstrap().await.map_err(|e| e.to_string())?;
        println!("Bootstrapped from '{}'", engine.store().path().display());
        println!("  Enabled:     {}", settings.enabled);
        println!("  Whitelist:   {} entries", settings.whitelist.len());

        for domain in &opts.toggles {
            let settings = engine
                .toggle_whitelist(domain)
                .await
                .map_err(|e| e.to_string())?;
            let state = if settings.whitelist.iter().any(|d| d == domain) { "added" } else { "removed" };
            println!("  Toggled:     {} ({})", domain, state);
        }

        match engine.subscribe() {
            Some(subscription) => {
                for id in &opts.match_ids {
                    engine.evaluator().emit_match(*id);
                }
                engine.evaluator().close_subscriptions();
                let processed = engine.run_match_loop(subscription).await;
                println!("  Matches:     {} replayed", processed);
            }
            None => {
                println!("  Matches:     telemetry unavailable, {} not counted", opts.match_ids.len());
            }
        }

        let settings = engine.settings().await.map_err(|e| e.to_string())?;
        println!();
        println!("Stats:");
        println!("  Ads:         {}", format_stat(settings.stats.blocked_ads));
        println!("  Trackers:    {}", format_stat(settings.stats.blocked_trackers));
        println!("  Hidden:      {}", format_stat(settings.stats.hidden_elements));
        Ok::<(), String>(())
    })?;

    let rules = engine.evaluator().dynamic_rules();
    let owned = rules.iter().filter(|r| is_engine_owned(r.id)).count();
    println!();
    println!("Evaluator:");
    println!("  Categories:  {:?}", engine.evaluator().enabled_categories());
    println!("  Rules:       {} ({} engine, {} external)", rules.len(), owned, rules.len() - owned);

    if let Some(path) = &opts.output_path {
        io::write_json(path, &rules)?;
        println!("  Written to:  {}", path.display());
    }

    Ok(())
}
