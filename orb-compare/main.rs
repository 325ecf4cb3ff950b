use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use log::{info, warn};
use orb_compare::{compare, CompareConfig, CompareError};

#[derive(Parser, Debug)]
#[command(name = "orb-compare")]
#[command(about = "Find and draw corresponding points between two photos of the same scene")]
struct Cli {
    /// First image (left side of the match views)
    image_a: PathBuf,
    /// Second image (right side of the match views)
    image_b: PathBuf,
    /// Directory the PNG results are written to, overwriting earlier runs
    #[arg(short, long, default_value = "resultados")]
    output_dir: PathBuf,
    /// TOML or JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Use the smaller, faster preset as the base configuration
    #[arg(long)]
    fast: bool,
    #[arg(long)]
    ratio: Option<f32>,
    #[arg(long)]
    min_matches: Option<usize>,
    #[arg(long)]
    max_lines: Option<usize>,
    #[arg(long)]
    max_features: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads for detection and matching
    #[arg(short, long)]
    threads: Option<usize>,
}

impl Cli {
    fn resolve_config(&self) -> Result<CompareConfig, CompareError> {
        let mut cfg = match &self.config {
            Some(path) => CompareConfig::load(path)?,
            None if self.fast => CompareConfig::fast_preset(),
            None => CompareConfig::default(),
        };
        if let Some(ratio) = self.ratio {
            cfg.ratio_threshold = ratio;
        }
        if let Some(min_matches) = self.min_matches {
            cfg.min_matches_for_fit = min_matches;
        }
        if let Some(max_lines) = self.max_lines {
            cfg.max_lines_drawn = max_lines;
        }
        if let Some(max_features) = self.max_features {
            cfg.detector.max_features = max_features;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(threads) = self.threads {
            cfg.detector.n_threads = threads;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;
    info!("{}", cfg.summary());

    if let Err(e) = orb_core::init_thread_pool(cfg.detector.n_threads) {
        warn!("Keeping the default thread pool: {}", e);
    }

    let t0 = Instant::now();
    let comparison = compare(&cli.image_a, &cli.image_b, &cfg)?;
    info!("Comparison finished in {:.2?}", t0.elapsed());

    for path in comparison.save(&cli.output_dir)? {
        info!("Saved {}", path.display());
    }

    println!("{}", comparison.status.description());
    println!("{}", comparison.summary());
    Ok(())
}
