//! Foldwise CLI
//!
//! Runs the cross-validation experiment described by a TOML config, or
//! reports how far the ledgers have got.

use std::io;

use clap::{Parser, Subcommand};
use foldwise_config::Regime;
use foldwise_data::load_dataset;
use foldwise_harness::{
    HarnessConfig, HarnessError, LedgerPair, Orchestrator, ResumePoint, ResumeSource,
    StatusReport, orchestrator::cell_progress, prompt_resume_point, resolve_state,
};
use foldwise_training::BaselineTrainer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "foldwise", about = "Resumable cross-validation experiment harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run (or resume) the experiment
    Run {
        /// Path to the TOML config file
        #[arg(short, long, default_value = "foldwise.toml")]
        config: String,

        /// Run index to resume at (skips the prompt)
        #[arg(long, requires = "resume_fold")]
        resume_run: Option<usize>,

        /// Fold index to resume at
        #[arg(long, requires = "resume_run")]
        resume_fold: Option<usize>,

        /// The short-budget result of the resume cell is already recorded
        #[arg(long, requires = "resume_run")]
        skip_short: bool,

        /// Resume right after the last recorded cell
        #[arg(long, conflicts_with = "resume_run")]
        auto_resume: bool,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Show how far the ledgers have got
    Status {
        /// Path to the TOML config file
        #[arg(short, long, default_value = "foldwise.toml")]
        config: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Only report this regime's ledger
        #[arg(long, value_enum)]
        regime: Option<Regime>,
    },
}

fn run(config: &HarnessConfig, source: ResumeSource, progress: bool) -> Result<(), HarnessError> {
    let dataset = load_dataset(&config.experiment.dataset)?;

    let (ledgers, probe) = LedgerPair::open_for(config)?;
    let runs = config.experiment.runs;
    let folds = config.partition.folds;
    let state = resolve_state(&probe, source, runs, folds, || {
        prompt_resume_point(&mut io::stdin().lock(), &mut io::stdout())
    })?;
    let Some(state) = state else {
        println!("All {} cells already recorded.", config.total_cells());
        return Ok(());
    };

    let trainer = BaselineTrainer::new(config.trainer);
    let mut orchestrator = Orchestrator::new(config, &dataset, trainer, ledgers);
    if progress {
        orchestrator = orchestrator.with_progress(cell_progress(config.total_cells()));
    }
    let summary = orchestrator.run(state)?;

    println!("* * * * * END * * * * *");
    println!(
        "{} cells: {} short / {} long records",
        summary.cells, summary.short_records, summary.long_records
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // tracing needs to be initialized with indicatif_layer to not clobber progress bars
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .with(indicatif_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            resume_run,
            resume_fold,
            skip_short,
            auto_resume,
            no_progress,
        } => {
            let harness_config = HarnessConfig::load(&config)?;
            let source = match (resume_run, resume_fold) {
                (Some(run), Some(fold)) => ResumeSource::Explicit(ResumePoint {
                    run,
                    fold,
                    run_short: !skip_short,
                }),
                _ if auto_resume => ResumeSource::Auto,
                _ => ResumeSource::Prompt,
            };

            if let Err(e) = run(&harness_config, source, !no_progress) {
                tracing::error!("{:?} error: {e}", e.kind());
                return Err(e.into());
            }
        }

        Commands::Status {
            config,
            json,
            regime,
        } => {
            let harness_config = HarnessConfig::load(&config)?;
            let mut report = StatusReport::collect(&harness_config)?;
            if let Some(regime) = regime {
                report = report.only(regime);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
    }

    Ok(())
}
