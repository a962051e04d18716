use anyhow::Context;
use gasweep::config::{AppConfig, ConfigBridge};
use gasweep::engines::generation::GeneticAlgorithm;
use gasweep::engines::sweep::ConsoleProgressSink;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            AppConfig::load(&path).with_context(|| format!("loading configuration from {}", path))?
        }
        None => {
            log::info!("No configuration file given, using defaults");
            let config = AppConfig::default();
            config.validate()?;
            config
        }
    };

    // Parses the objective, so a bad expression stops us before any work starts.
    let driver = ConfigBridge::to_sweep_driver(&config, Arc::new(GeneticAlgorithm::new()))
        .context("preparing sweep")?;

    let skip = config.sweep.skip;
    let total = driver.get_all_parameter_sets(skip).len();
    println!(
        "Sweeping {} combinations of f(x) = {} on [{}, {}], {} repetitions each",
        total,
        config.objective.expression,
        config.genotype.a,
        config.genotype.b,
        config.sweep.repetitions
    );

    let handle = driver.run_from(skip, ConsoleProgressSink::new(total), || {
        log::debug!("Sweep completion callback fired");
    })?;
    let summary = handle.join()?;

    println!(
        "Done: {}/{} completed, {} failed{} in {}s",
        summary.completed,
        summary.total,
        summary.failures.len(),
        if summary.cancelled { " (cancelled)" } else { "" },
        (summary.finished_at - summary.started_at).num_seconds()
    );
    for failure in &summary.failures {
        eprintln!(
            "  #{} {}: {}",
            failure.combination, failure.parameter_set, failure.message
        );
    }

    if summary.failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} grid points failed", summary.failures.len())
    }
}
