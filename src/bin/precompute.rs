use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use yahtzee::env_config::{init_base_path, init_rayon_threads};
use yahtzee::state_computation::{solve, Scheduler};
use yahtzee::storage::save_state_values;
use yahtzee::types::{GameState, YahtzeeContext};

/// Compute the optimal expected remaining score of every Yahtzee scorecard
/// and write the table to a file.
#[derive(Parser, Debug)]
#[command(name = "yahtzee-precompute")]
struct Args {
    /// Output file: one `<key>\t<value>` line per nonzero state.
    #[arg(short, long, default_value = "scores.txt")]
    output: PathBuf,

    /// Worker threads (overrides RAYON_NUM_THREADS / OMP_NUM_THREADS).
    #[arg(short, long)]
    threads: Option<usize>,

    /// State traversal: `recursive` (memoized, single thread) or `levels` (parallel).
    #[arg(long, default_value = "levels")]
    scheduler: Scheduler,
}

fn run(args: Args) -> anyhow::Result<()> {
    let start = Instant::now();
    init_base_path().context("setting up working directory")?;
    init_rayon_threads(args.threads).context("building thread pool")?;

    let ctx = YahtzeeContext::precomputed();
    let values = solve(&ctx, args.scheduler);
    if let Some(ev) = values.get(GameState::EMPTY) {
        info!("Optimal expected score from the empty scorecard: {:.6}", ev);
    }

    let written = save_state_values(&values, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "Wrote {} states to {} ({:.2}s total)",
        written,
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
