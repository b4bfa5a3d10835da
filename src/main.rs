use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use expanse::io::{load_candidates, load_config, write_json};
use expanse::{
    rank, rank_pairwise, shared_preferences, CandidateMap, Cosine, Cut, FeatureVector,
    MeasureKind, PairwiseConfig, RankConfig, Representation, SharedPrefConfig, Similarity,
    SimilarityEntry, WeightedSet, ZeroNormPolicy,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Rank items of a labeled collection by similarity
#[derive(Parser, Debug)]
#[command(name = "expanse")]
#[command(about = "A similarity ranking engine", long_about = None)]
struct Args {
    /// JSON config file (measure, zero_norm, cutoff, cut, knn, dedup_symmetric)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank all other items by similarity to one source item
    Rank {
        #[command(flatten)]
        input: InputArgs,

        /// Key of the source item
        #[arg(short, long)]
        source: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Rank every item against every other item
    Pairwise {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Side of the cutoff to keep: above (default) or below
        #[arg(long)]
        cut: Option<Cut>,

        /// Keep only one of (a, b) and (b, a)
        #[arg(long)]
        dedup: bool,
    },

    /// Keep the ordered pairs whose similarity is below or above a threshold
    Shared {
        #[command(flatten)]
        input: InputArgs,

        /// Similarity threshold (inclusive)
        #[arg(short, long)]
        threshold: f64,

        /// Which side of the threshold to keep: below or above
        #[arg(long, default_value = "below")]
        cut: Cut,
    },
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// JSON object mapping item keys to vectors or `id#score` entry lists
    #[arg(short, long)]
    input: PathBuf,

    /// cosine, cosine-sets, jaccard or overlap
    #[arg(short, long)]
    measure: Option<MeasureKind>,

    /// Fail on zero-norm vectors instead of scoring them 0
    #[arg(long)]
    strict_zero_norm: bool,
}

#[derive(ClapArgs, Debug)]
struct FilterArgs {
    /// Similarity cutoff (inclusive)
    #[arg(long)]
    cutoff: Option<f64>,

    /// Maximum number of results
    #[arg(short, long)]
    knn: Option<usize>,
}

/// Settings read from `--config`; command line flags take precedence
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    measure: Option<MeasureKind>,
    zero_norm: Option<ZeroNormPolicy>,
    #[serde(flatten)]
    rank: RankConfig,
    cut: Option<Cut>,
    dedup_symmetric: bool,
}

enum Task {
    Rank { source: String, config: RankConfig },
    Pairwise(PairwiseConfig),
    Shared(SharedPrefConfig),
}

impl Task {
    fn run<R, S>(&self, measure: &S, candidates: &CandidateMap<R>) -> expanse::Result<Vec<SimilarityEntry>>
    where
        R: Sync,
        S: Similarity<R> + ?Sized,
    {
        match self {
            Task::Rank { source, config } => rank(measure, source, candidates, config),
            Task::Pairwise(config) => rank_pairwise(measure, candidates, config),
            Task::Shared(config) => shared_preferences(measure, candidates, config),
        }
    }
}

fn merge_filter(file: &RankConfig, filter: &FilterArgs) -> RankConfig {
    RankConfig {
        cutoff: filter.cutoff.or(file.cutoff),
        knn: filter.knn.or(file.knn),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let file_config: FileConfig = match &args.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    debug!(?file_config, "loaded configuration");

    let (input, task) = match args.command {
        Command::Rank { input, source, filter } => {
            let config = merge_filter(&file_config.rank, &filter);
            (input, Task::Rank { source, config })
        }
        Command::Pairwise { input, filter, cut, dedup } => {
            let merged = merge_filter(&file_config.rank, &filter);
            let config = PairwiseConfig {
                cutoff: merged.cutoff,
                cut: cut.or(file_config.cut).unwrap_or(Cut::Above),
                knn: merged.knn,
                dedup_symmetric: dedup || file_config.dedup_symmetric,
            };
            (input, Task::Pairwise(config))
        }
        Command::Shared { input, threshold, cut } => {
            (input, Task::Shared(SharedPrefConfig { cut, threshold }))
        }
    };

    let measure = input.measure.or(file_config.measure).unwrap_or_default();
    let zero_norm = if input.strict_zero_norm {
        ZeroNormPolicy::Error
    } else {
        file_config.zero_norm.unwrap_or_default()
    };

    let start = Instant::now();
    let (items, result) = match measure.representation() {
        Representation::Vector => {
            let candidates: CandidateMap<FeatureVector> = load_candidates(&input.input)?;
            let result = task.run(&Cosine::new(zero_norm), &candidates);
            (candidates.len(), result)
        }
        Representation::Set => {
            let candidates: CandidateMap<WeightedSet> = load_candidates(&input.input)?;
            let set_measure = measure
                .set_measure(zero_norm)
                .with_context(|| format!("{measure} is not a set measure"))?;
            let result = task.run(set_measure.as_ref(), &candidates);
            (candidates.len(), result)
        }
    };
    let result = result.with_context(|| format!("Ranking with {measure} failed"))?;

    info!(
        %measure,
        items,
        results = result.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ranking complete"
    );

    write_json(std::io::stdout().lock(), &result)
}
