//! PureWeb CLI
//!
//! CLI tool for compiling static rulesets and inspecting engine decisions.

mod bench;
mod io;
mod simulate;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pw_compiler::{build_ruleset, optimize_rules, parse_rule_list};
use pw_core::cosmetic::cosmetic_plan;
use pw_core::status::{compatibility_category, protection_status};
use pw_core::stats::format_stat;
use pw_core::{classify, plan_replace, select_categories, synthesize, Category};

use crate::bench::BenchOptions;
use crate::simulate::SimulateOptions;

#[derive(Parser)]
#[command(name = "pw-cli")]
#[command(about = "PureWeb rule orchestration tools")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dynamic rules for a settings record
    Synthesize {
        /// Settings JSON (defaults if omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Print the static categories to enable
    Categories {
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Print the replace instruction against installed dynamic rules
    Plan {
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Installed dynamic rules JSON
        #[arg(short, long)]
        installed: Option<PathBuf>,
    },

    /// Show which counter each matched rule id is booked against
    Classify {
        #[arg(required = true)]
        rule_ids: Vec<u32>,
    },

    /// Compile block lists into a static category ruleset
    Compile {
        /// Category the ruleset belongs to (ads, trackers, social)
        #[arg(short, long)]
        category: Category,

        /// Input list files
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output ruleset file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Toggle a domain in the stored whitelist
    Toggle {
        /// Settings store file
        #[arg(long, default_value = "settings.json")]
        store: PathBuf,

        domain: String,
    },

    /// Protection status and cosmetic plan for a host
    Status {
        #[arg(short, long)]
        settings: Option<PathBuf>,

        host: String,
    },

    /// Print the stored counters
    Stats {
        #[arg(long, default_value = "settings.json")]
        store: PathBuf,
    },

    /// Bootstrap, toggle and replay matches against an in-memory evaluator
    Simulate {
        #[arg(long, default_value = "settings.json")]
        store: PathBuf,

        /// Pre-installed dynamic rules JSON
        #[arg(short, long)]
        installed: Option<PathBuf>,

        /// Whitelist toggles to apply, in order
        #[arg(short, long)]
        toggle: Vec<String>,

        /// Matched rule ids to replay
        #[arg(short, long = "match")]
        match_ids: Vec<u32>,

        /// Write the final dynamic rule table here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simulate an evaluator without match telemetry
        #[arg(long)]
        no_telemetry: bool,
    },

    /// Time synthesis and reconciliation planning
    Bench {
        #[arg(long, default_value_t = 100)]
        whitelist_size: usize,

        #[arg(long, default_value_t = 10_000)]
        iterations: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Synthesize { settings } => cmd_synthesize(settings.as_deref()),
        Commands::Categories { settings } => cmd_categories(settings.as_deref()),
        Commands::Plan { settings, installed } => cmd_plan(settings.as_deref(), installed.as_deref()),
        Commands::Classify { rule_ids } => cmd_classify(&rule_ids),
        Commands::Compile {
            category,
            input,
            output,
        } => cmd_compile(category, &input, output.as_deref()),
        Commands::Toggle { store, domain } => cmd_toggle(&store, &domain),
        Commands::Status { settings, host } => cmd_status(settings.as_deref(), &host),
        Commands::Stats { store } => cmd_stats(&store),
        Commands::Simulate {
            store,
            installed,
            toggle,
            match_ids,
            output,
            no_telemetry,
        } => simulate::run_simulate(SimulateOptions {
            store_path: store,
            installed_path: installed,
            toggles: toggle,
            match_ids,
            output_path: output,
            no_telemetry,
        }),
        Commands::Bench {
            whitelist_size,
            iterations,
        } => bench::run_bench(BenchOptions {
            whitelist_size,
            iterations,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_synthesize(settings_path: Option<&Path>) -> Result<(), String> {
    let settings = io::read_settings(settings_path)?;
    println!("{}", io::to_pretty_json(&synthesize(&settings))?);
    Ok(())
}

fn cmd_categories(settings_path: Option<&Path>) -> Result<(), String> {
    let settings = io::read_settings(settings_path)?;
    let active = select_categories(&settings);
    if active.is_empty() {
        println!("(none, master switch is off)");
    }
    for category in active {
        println!("{}", category);
    }
    Ok(())
}

fn cmd_plan(settings_path: Option<&Path>, installed_path: Option<&Path>) -> Result<(), String> {
    let settings = io::read_settings(settings_path)?;
    let installed = io::read_rules(installed_path)?;
    let plan = plan_replace(&installed, synthesize(&settings));

    if plan.is_noop(&installed) {
        eprintln!("Installed rules already match; replace would be a no-op");
    }

    let output = serde_json::json!({
        "removeRuleIds": plan.remove_ids,
        "addRules": plan.add_rules,
    });
    println!("{}", io::to_pretty_json(&output)?);
    Ok(())
}

fn cmd_classify(rule_ids: &[u32]) -> Result<(), String> {
    for id in rule_ids {
        let bucket = match classify(*id) {
            Some(bucket) => format!("{:?}", bucket),
            None => "-".to_string(),
        };
        println!("{:>10}  {}", id, bucket);
    }
    Ok(())
}

fn cmd_compile(category: Category, inputs: &[PathBuf], output: Option<&Path>) -> Result<(), String> {
    let start = Instant::now();
    let mut all_rules = Vec::new();
    let mut total_lines = 0usize;

    for path in inputs {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        total_lines += content.lines().count();
        all_rules.extend(parse_rule_list(&content));
    }

    let stats = optimize_rules(&mut all_rules);
    let ruleset = build_ruleset(category, &all_rules).map_err(|e| e.to_string())?;

    let default_output = PathBuf::from(format!("{}.json", category.ruleset_id()));
    let output = output.unwrap_or(default_output.as_path());
    io::write_json(output, &ruleset)?;

    let range = category.id_range();
    println!("Compiled {} list(s) to '{}'", inputs.len(), output.display());
    println!("  Lines:    {}", total_lines);
    println!("  Rules:    {} -> {} (dedupe removed {})", stats.before, stats.after, stats.deduped);
    if ruleset.len() < stats.after {
        println!("  Dropped:  {} exception(s), counted category", stats.after - ruleset.len());
    }
    println!("  Ids:      {}..{} ({} free)", range.start, range.end, range.len() - ruleset.len());
    println!("  Time:     {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    Ok(())
}

fn cmd_toggle(store: &Path, domain: &str) -> Result<(), String> {
    use pw_core::adapters::{JsonFileStore, MemoryEvaluator};
    use pw_core::Engine;

    let engine = Engine::new(JsonFileStore::new(store), MemoryEvaluator::new());
    let settings = io::runtime()?
        .block_on(engine.toggle_whitelist(domain))
        .map_err(|e| e.to_string())?;

    let state = if settings.whitelist.iter().any(|d| d == domain) { "added to" } else { "removed from" };
    println!("'{}' {} whitelist ({} entries)", domain, state, settings.whitelist.len());
    Ok(())
}

fn cmd_status(settings_path: Option<&Path>, host: &str) -> Result<(), String> {
    let settings = io::read_settings(settings_path)?;

    println!("Host:      {}", host);
    println!("Status:    {:?}", protection_status(&settings, host));
    if let Some(category) = compatibility_category(&settings, host) {
        println!("Relaxed:   {}", category);
    }
    match cosmetic_plan(&settings, host) {
        Some(plan) => println!("Cosmetic:  {} selectors ({:?})", plan.selectors.len(), settings.profile),
        None => println!("Cosmetic:  off"),
    }
    Ok(())
}

fn cmd_stats(store: &Path) -> Result<(), String> {
    let settings = io::read_settings(Some(store))?;
    println!("Blocked ads:       {}", format_stat(settings.stats.blocked_ads));
    println!("Blocked trackers:  {}", format_stat(settings.stats.blocked_trackers));
    println!("Hidden elements:   {}", format_stat(settings.stats.hidden_elements));
    Ok(())
}
