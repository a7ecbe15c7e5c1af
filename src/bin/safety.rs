//! safety - Trial Safety Analysis CLI
//!
//! Command-line interface for comparing adverse events between trial arms.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use trial_safety::data::ConsistencyPolicy;
use trial_safety::error::Result;
use trial_safety::pipeline::{AnalysisConfig, AnalysisPipeline, LoadedTrial};
use trial_safety::simulate::{generate_trial, write_csv, SyntheticTrialConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Report output format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

/// Synthetic trial presets
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Identical event rates in both arms
    Null,
    /// Drug raises every event rate
    Harm,
    /// Drug arm is older on average
    Age,
}

impl From<Preset> for SyntheticTrialConfig {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Null => SyntheticTrialConfig::null_effect(),
            Preset::Harm => SyntheticTrialConfig::drug_harm(),
            Preset::Age => SyntheticTrialConfig::age_imbalance(),
        }
    }
}

/// Drug vs Placebo adverse-event analysis
#[derive(Parser)]
#[command(name = "safety")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full safety report
    Report {
        /// Path to the safety data file
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Significance level (overrides config)
        #[arg(long)]
        alpha: Option<f64>,

        /// Age histogram bins (overrides config)
        #[arg(long)]
        bins: Option<usize>,

        /// Keep the first arm/age seen when a participant's records disagree
        #[arg(long)]
        first_wins: bool,
    },

    /// Show trial overview statistics
    Overview {
        /// Path to the safety data file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Compare side-effect incidence between arms
    SideEffects {
        /// Path to the safety data file
        #[arg(short, long)]
        data: PathBuf,

        /// Also write the arm x effect-count table as TSV
        #[arg(short, long)]
        table: Option<PathBuf>,
    },

    /// Compare age distributions between arms
    Age {
        /// Path to the safety data file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Write the aggregated participant table
    Participants {
        /// Path to the safety data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output path for participants TSV
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate a synthetic trial data file
    Simulate {
        /// Output path for records CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Scenario to simulate
        #[arg(short, long, value_enum, default_value = "null")]
        preset: Preset,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Participants per arm
        #[arg(long)]
        per_arm: Option<usize>,
    },

    /// Generate an example analysis configuration
    Example {
        /// Output path for config YAML
        #[arg(short, long, default_value = "pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            data,
            config,
            format,
            alpha,
            bins,
            first_wins,
        } => cmd_report(
            data.as_deref(),
            config.as_deref(),
            format,
            alpha,
            bins,
            first_wins,
        ),
        Commands::Overview { data } => cmd_overview(&data),
        Commands::SideEffects { data, table } => cmd_side_effects(&data, table.as_deref()),
        Commands::Age { data } => cmd_age(&data),
        Commands::Participants { data, output } => cmd_participants(&data, &output),
        Commands::Simulate {
            output,
            preset,
            seed,
            per_arm,
        } => cmd_simulate(&output, preset, seed, per_arm),
        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and aggregate the data file once.
fn load(config: &AnalysisConfig) -> Result<LoadedTrial> {
    eprintln!("Loading data...");
    let trial = LoadedTrial::load(config)?;
    let counts = trial.participants.arm_counts();
    eprintln!(
        "Loaded {} records -> {} participants ({} Drug, {} Placebo)",
        trial.n_records,
        trial.participants.len(),
        counts.drug,
        counts.placebo
    );
    Ok(trial)
}

/// Run the full report
fn cmd_report(
    data: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
    alpha: Option<f64>,
    bins: Option<usize>,
    first_wins: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading analysis configuration from {:?}...", path);
            AnalysisConfig::from_file(path)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(path) = data {
        config.data = Some(path.to_path_buf());
    }
    if let Some(alpha) = alpha {
        config = config.with_alpha(alpha);
    }
    if let Some(bins) = bins {
        config = config.with_histogram_bins(bins);
    }
    if first_wins {
        config = config.with_consistency(ConsistencyPolicy::FirstWins);
    }

    let trial = load(&config)?;
    eprintln!("Running analysis '{}'...", config.name);
    let report = AnalysisPipeline::new(config).run(&trial.participants)?;

    match format {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Yaml => print!("{}", report.to_yaml()?),
    }
    Ok(())
}

/// Show the overview view
fn cmd_overview(data: &Path) -> Result<()> {
    let config = AnalysisConfig::for_data(data);
    let trial = load(&config)?;
    let view = AnalysisPipeline::new(config).overview(&trial.participants)?;
    println!("{}", view);
    Ok(())
}

/// Show the side-effect view
fn cmd_side_effects(data: &Path, table_path: Option<&Path>) -> Result<()> {
    let config = AnalysisConfig::for_data(data);
    let trial = load(&config)?;
    let view = AnalysisPipeline::new(config).side_effects(&trial.participants)?;
    println!("{}", view);

    if let Some(path) = table_path {
        eprintln!("Writing contingency table to {:?}...", path);
        std::fs::write(path, view.contingency.to_tsv_string())?;
    }
    Ok(())
}

/// Show the age view
fn cmd_age(data: &Path) -> Result<()> {
    let config = AnalysisConfig::for_data(data);
    let trial = load(&config)?;
    let view = AnalysisPipeline::new(config).age(&trial.participants)?;
    println!("{}", view);
    Ok(())
}

/// Write the aggregated participant table
fn cmd_participants(data: &Path, output_path: &Path) -> Result<()> {
    let config = AnalysisConfig::for_data(data);
    let trial = load(&config)?;

    eprintln!("Writing participants to {:?}...", output_path);
    trial.participants.to_tsv(output_path)?;
    eprintln!("Done! {} participants written", trial.participants.len());
    Ok(())
}

/// Generate a synthetic trial
fn cmd_simulate(
    output_path: &Path,
    preset: Preset,
    seed: Option<u64>,
    per_arm: Option<usize>,
) -> Result<()> {
    let mut config = SyntheticTrialConfig::from(preset);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(n) = per_arm {
        config = config.with_participants(n);
    }

    eprintln!(
        "Simulating '{}' trial: {} participants per arm, seed {}...",
        config.name, config.participants_per_arm, config.seed
    );
    let records = generate_trial(&config)?;

    eprintln!("Writing {} records to {:?}...", records.len(), output_path);
    write_csv(&records, output_path)?;
    Ok(())
}

/// Generate example analysis configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let mut config = AnalysisConfig::for_data("safety_data.csv");
    config.name = "example-safety".to_string();
    config.description =
        Some("Drug vs Placebo adverse-event comparison with default settings".to_string());
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
