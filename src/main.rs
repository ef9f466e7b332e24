use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use negprobe::engine::DEFAULT_CONFIG_PATH;
use negprobe::{AnalysisConfig, AnalysisEngine, AnalysisMode};

#[derive(Parser, Debug)]
#[command(name = "negprobe")]
#[command(about = "Explain a vision-language model's preferences under SVO negation with linguistic features")]
#[command(version)]
struct Args {
    /// Analysis to run
    #[arg(short, long, value_enum, default_value_t = AnalysisMode::Ols)]
    model: AnalysisMode,

    /// Only use the first `debug_max_examples` examples
    #[arg(short, long)]
    debug: bool,

    /// Permutation trials (svm only)
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Worker threads for the permutation trials
    #[arg(short, long)]
    workers: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut config = AnalysisConfig::load(&args.config)?;
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(workers) = args.workers.filter(|&w| w > 0) {
        config.workers = Some(workers);
    }
    let max_examples = args.debug.then_some(config.debug_max_examples);

    info!("Mode: {}", args.model);
    let engine = AnalysisEngine::from_config(config)?;
    let examples = engine.load_examples(max_examples)?;
    engine.run(&examples, args.model)?;

    Ok(())
}
