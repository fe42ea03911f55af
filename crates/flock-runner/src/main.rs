mod args;
mod net;
mod stats;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use flock_sim::config::SimConfig;
use flock_sim::{EvalError, Generation, GenerationReport};

use args::RunnerArgs;
use net::FeedForward;
use stats::{GenerationStats, RunSummary};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[derive(Debug)]
enum RunError {
    Eval(EvalError),
    Worker(String),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eval(e) => write!(f, "{e}"),
            Self::Worker(e) => write!(f, "evaluation worker failed: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

/// Evaluate one population on a blocking thread; the tick loop never yields.
async fn run_generation(
    config: SimConfig,
    number: u32,
    controllers: Vec<FeedForward>,
    stop: Arc<AtomicBool>,
) -> Result<(GenerationReport, Vec<f32>), RunError> {
    let handle = tokio::task::spawn_blocking(
        move || -> Result<(GenerationReport, Vec<f32>), EvalError> {
            let mut fitness = vec![0.0; controllers.len()];
            let report = {
                let mut generation =
                    Generation::new(&config, &controllers, &mut fitness)?.with_number(number);
                generation.run(&stop)
            };
            Ok((report, fitness))
        },
    );
    match handle.await {
        Ok(result) => result.map_err(RunError::Eval),
        Err(e) => Err(RunError::Worker(e.to_string())),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match RunnerArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "usage: flock-runner [--generations=N] [--population=N] [--hidden=N] \
                 [--seed=N] [--max-ticks=N] [--config=PATH] [--json]"
            );
            return ExitCode::from(2);
        },
    };
    init_tracing(args.json);

    let mut config = match &args.config {
        Some(path) => SimConfig::load_from(path),
        None => SimConfig::load(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }
    if let Err(e) = config.validate() {
        tracing::error!("Invalid simulation config: {e}");
        return ExitCode::FAILURE;
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping after the current tick");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    tracing::info!(
        generations = args.generations,
        population = args.population,
        hidden = args.hidden,
        seed = ?config.seed,
        "Starting run"
    );

    let mut weights_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let input_scale = config.playfield.height;
    let mut summary = RunSummary::default();

    for number in 0..args.generations {
        let controllers: Vec<FeedForward> = (0..args.population)
            .map(|_| FeedForward::random(&mut weights_rng, args.hidden, input_scale))
            .collect();
        let mut generation_config = config.clone();
        generation_config.seed = config.seed.map(|s| s.wrapping_add(u64::from(number)));

        let (report, fitness) =
            match run_generation(generation_config, number, controllers, Arc::clone(&stop)).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Generation {number} failed: {e}");
                    return ExitCode::FAILURE;
                },
            };

        let stats = GenerationStats::new(&report, &fitness, config.ticks_to_secs(report.ticks));
        tracing::info!(
            generation = stats.generation,
            best = stats.best,
            mean = stats.mean,
            stdev = stats.stdev,
            score = stats.score,
            ticks = stats.ticks,
            seconds = stats.seconds,
            reason = %stats.reason,
            "Generation complete"
        );
        summary.record(&stats);

        if summary.aborted {
            break;
        }
    }

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to serialize run summary: {e}");
            return ExitCode::FAILURE;
        },
    }
    ExitCode::SUCCESS
}
