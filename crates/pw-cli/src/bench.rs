use std::time::Instant;

use pw_core::{plan_replace, synthesize, InstalledRule, Settings};

pub struct BenchOptions {
    pub whitelist_size: usize,
    pub iterations: usize,
}

/// Time one synthesis + replace plan per iteration, the work every
/// settings change costs.
pub fn run_bench(opts: BenchOptions) -> Result<(), String> {
    if opts.iterations == 0 {
        return Err("Iterations must be at least 1".to_string());
    }

    let settings = Settings {
        whitelist: (0..opts.whitelist_size)
            .map(|i| format!("site{i}.example"))
            .collect(),
        ..Settings::default()
    };
    let installed = synthesize(&settings)
        .iter()
        .map(|rule| InstalledRule::try_from(rule))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Failed to encode rules: {}", e))?;

    let mut samples_us = Vec::with_capacity(opts.iterations);
    let mut rule_count = 0usize;
    let start = Instant::now();

    for _ in 0..opts.iterations {
        let t = Instant::now();
        let plan = plan_replace(&installed, synthesize(&settings));
        samples_us.push(t.elapsed().as_secs_f64() * 1_000_000.0);
        rule_count = plan.add_rules.len();
    }

    let total = start.elapsed();
    samples_us.sort_by(|a, b| a.total_cmp(b));

    println!("Reconcile Benchmark");
    println!("==================================================");
    println!("  Whitelist:   {} entries", opts.whitelist_size);
    println!("  Rules:       {} per pass", rule_count);
    println!("  Iterations:  {}", opts.iterations);
    println!("  Total:       {:.1}ms", total.as_secs_f64() * 1000.0);
    println!("  p50:         {:.2}us", percentile(&samples_us, 50.0));
    println!("  p99:         {:.2}us", percentile(&samples_us, 99.0));
    println!("  max:         {:.2}us", samples_us.last().copied().unwrap_or(0.0));

    Ok(())
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::percentile;

    #[test]
    fn percentile_picks_nearest_rank() {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&samples, 0.0), 1.0);
        assert_eq!(percentile(&samples, 50.0), 3.0);
        assert_eq!(percentile(&samples, 100.0), 5.0);
        assert_eq!(percentile(&[], 99.0), 0.0);
    }
}
