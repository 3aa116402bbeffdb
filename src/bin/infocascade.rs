//! Infocascade CLI binary.
//!
//! Runs cascade replicates and diagnostics on their output.
//!
//! # Commands
//!
//! - `run` - Run one replicate and emit its output as JSON
//! - `sweep` - Run every `(gamma, replicate)` pair in parallel
//! - `fitness` - Fitness trials on a saved replicate's initial and final state
//! - `assort` - Assortativity diagnostics on a saved replicate

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use infocascade::{
    assortativity::AssortativitySnapshot,
    network::{connected_components, distance_matrix},
    replicate::{assess_fitness, run_sweep, Replicate, ReplicateOutput, SweepPlan, TrialSettings},
    Config, SocialNetwork, Topology, VERSION,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "infocascade")]
#[command(version = VERSION)]
#[command(about = "Information cascades on adaptively rewired social networks", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/infocascade/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Model overrides shared by `run` and `sweep`.
#[derive(Args)]
struct ModelArgs {
    /// Population size
    #[arg(short, long)]
    n: Option<usize>,

    /// Mean degree
    #[arg(short, long)]
    k: Option<usize>,

    /// Sampling fraction
    #[arg(long)]
    psi: Option<f64>,

    /// Rounds per replicate
    #[arg(short, long)]
    timesteps: Option<usize>,

    /// Initial topology (random, scale_free, regular, complete)
    #[arg(long)]
    topology: Option<String>,

    /// Use one-way ties
    #[arg(long)]
    directed: bool,

    /// Base seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fitness trials per snapshot (0 disables)
    #[arg(long)]
    trials: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single replicate
    Run {
        #[command(flatten)]
        model: ModelArgs,

        /// Source correlation
        #[arg(short, long, allow_hyphen_values = true)]
        gamma: Option<f64>,

        /// Replicate id
        #[arg(short, long, default_value = "0")]
        replicate: usize,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as pretty-printed JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Run replicates for several correlations in parallel
    Sweep {
        #[command(flatten)]
        model: ModelArgs,

        /// Comma-separated source correlations
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        gammas: Vec<f64>,

        /// Replicates per correlation
        #[arg(short, long, default_value = "10")]
        replicates: usize,

        /// Worker threads (default: one per core)
        #[arg(long)]
        threads: Option<usize>,

        /// Output directory
        #[arg(short, long, default_value = "cascade_output")]
        output_dir: PathBuf,
    },

    /// Run fitness trials on a saved replicate
    Fitness {
        /// Replicate JSON file
        input: PathBuf,

        /// Number of trials per snapshot
        #[arg(long)]
        trials: Option<usize>,

        /// Source correlation (default: the replicate's)
        #[arg(short, long, allow_hyphen_values = true)]
        gamma: Option<f64>,

        /// Sampling fraction (default: from config)
        #[arg(long)]
        psi: Option<f64>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assortativity diagnostics on a saved replicate
    Assort {
        /// Replicate JSON file
        input: PathBuf,

        /// PageRank continuation probability (default: from config)
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Include shortest-path distance matrices
        #[arg(long)]
        distances: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let logger = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    if cli.log_json {
        logger.json().init();
    } else {
        logger.init();
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            model,
            gamma,
            replicate,
            output,
            pretty,
        } => cmd_run(config, &model, gamma, replicate, output, pretty),

        Commands::Sweep {
            model,
            gammas,
            replicates,
            threads,
            output_dir,
        } => cmd_sweep(config, &model, gammas, replicates, threads, &output_dir),

        Commands::Fitness {
            input,
            trials,
            gamma,
            psi,
            output,
        } => cmd_fitness(&config, &input, trials, gamma, psi, output),

        Commands::Assort {
            input,
            alpha,
            distances,
            output,
        } => cmd_assort(&config, &input, alpha, distances, output),
    }
}

fn apply_model_args(mut config: Config, args: &ModelArgs) -> anyhow::Result<Config> {
    if let Some(n) = args.n {
        config.model.n = n;
    }
    if let Some(k) = args.k {
        config.network.k = k;
    }
    if let Some(psi) = args.psi {
        config.model.psi = psi;
    }
    if let Some(timesteps) = args.timesteps {
        config.model.timesteps = timesteps;
    }
    if let Some(topology) = &args.topology {
        config.network.topology = topology
            .parse::<Topology>()
            .map_err(|e| anyhow::anyhow!("{e}. Use: random, scale_free, regular, complete"))?;
    }
    if args.directed {
        config.network.directed = true;
    }
    if let Some(seed) = args.seed {
        config.model.seed = seed;
    }
    if let Some(trials) = args.trials {
        config.fitness.trials = trials;
    }
    Ok(config)
}

fn cmd_run(
    config: Config,
    model: &ModelArgs,
    gamma: Option<f64>,
    replicate: usize,
    output: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut config = apply_model_args(config, model)?;
    if let Some(gamma) = gamma {
        config.model.gamma = gamma;
    }
    config.validate()?;

    let result = Replicate::new(&config, replicate)?.run()?;
    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    write_output(output, &json)
}

fn cmd_sweep(
    config: Config,
    model: &ModelArgs,
    gammas: Vec<f64>,
    replicates: usize,
    threads: Option<usize>,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let config = apply_model_args(config, model)?;
    let plan = SweepPlan {
        gammas,
        replicates,
        threads,
    };

    let outputs = run_sweep(&config, &plan)?;
    for result in &outputs {
        let dir = output_dir.join(format!("gamma{}", result.gamma));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("replicate_{:02}.json", result.replicate));
        std::fs::write(&path, serde_json::to_string(result)?)?;
    }

    info!(
        replicates = outputs.len(),
        dir = %output_dir.display(),
        "Sweep written"
    );
    Ok(())
}

fn load_replicate(path: &Path) -> anyhow::Result<ReplicateOutput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid replicate file {}", path.display()))
}

#[derive(Serialize)]
struct FitnessSummary {
    replicate: usize,
    gamma: f64,
    trials: usize,
    initial_accuracy: Option<f64>,
    final_accuracy: Option<f64>,
    initial_mean_size: f64,
    final_mean_size: f64,
    initial: infocascade::FitnessReport,
    last: infocascade::FitnessReport,
}

fn cmd_fitness(
    config: &Config,
    input: &Path,
    trials: Option<usize>,
    gamma: Option<f64>,
    psi: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let replicate = load_replicate(input)?;
    let settings = TrialSettings {
        gamma: gamma.or(config.fitness.gamma).unwrap_or(replicate.gamma),
        psi: psi.or(config.fitness.psi).unwrap_or(config.model.psi),
        stimulus_mean: config.model.stimulus_mean,
        trials: trials.unwrap_or(config.fitness.trials),
    };
    let mut rng = ChaCha8Rng::seed_from_u64(replicate.seed);

    let initial = assess_fitness(
        &replicate.initial_network,
        &replicate.initial_thresholds,
        &replicate.types,
        &settings,
        &mut rng,
    )?;
    let last = assess_fitness(
        &replicate.final_network,
        &replicate.final_thresholds,
        &replicate.types,
        &settings,
        &mut rng,
    )?;

    let summary = FitnessSummary {
        replicate: replicate.replicate,
        gamma: settings.gamma,
        trials: settings.trials,
        initial_accuracy: initial.mean_accuracy(),
        final_accuracy: last.mean_accuracy(),
        initial_mean_size: initial.mean_cascade_size(),
        final_mean_size: last.mean_cascade_size(),
        initial,
        last,
    };
    write_output(output, &serde_json::to_string_pretty(&summary)?)
}

#[derive(Serialize)]
struct NetworkDiagnostics {
    ties: usize,
    components: usize,
    mean_threshold_distance: Option<f64>,
    assortativity: AssortativitySnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Row-major; unreachable pairs are `null`
    distances: Option<Vec<Vec<f64>>>,
}

fn diagnose(
    network: &SocialNetwork,
    replicate: &ReplicateOutput,
    thresholds: &[f64],
    alpha: f64,
    distances: bool,
) -> anyhow::Result<NetworkDiagnostics> {
    let assortativity = AssortativitySnapshot::compute(network, &replicate.types, thresholds, alpha)?;
    Ok(NetworkDiagnostics {
        ties: network.tie_count(),
        components: connected_components(network),
        mean_threshold_distance: assortativity.threshold_sorting.mean_distance(),
        assortativity,
        distances: distances.then(|| {
            distance_matrix(network)
                .rows()
                .into_iter()
                .map(|row| row.to_vec())
                .collect()
        }),
    })
}

fn cmd_assort(
    config: &Config,
    input: &Path,
    alpha: Option<f64>,
    distances: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let replicate = load_replicate(input)?;
    let alpha = alpha.unwrap_or(config.diagnostics.alpha);

    let report = serde_json::json!({
        "replicate": replicate.replicate,
        "gamma": replicate.gamma,
        "alpha": alpha,
        "initial": diagnose(&replicate.initial_network, &replicate, &replicate.initial_thresholds, alpha, distances)?,
        "final": diagnose(&replicate.final_network, &replicate, &replicate.final_thresholds, alpha, distances)?,
    });
    write_output(output, &serde_json::to_string_pretty(&report)?)
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}
