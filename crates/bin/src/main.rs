//! Paid-search DID CLI binary.
//!
//! Runs the preprocessing and estimation stages of the study, either
//! separately or back to back. With no arguments it reads
//! `input/PaidSearch.csv` and writes under `temp/` and `output/`.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use paidsearch::data::PanelSummary;
use paidsearch::estimate::{DidConfig, Z_95};
use paidsearch::output::{
    DidReport, ExportFormat, Exporter, FigureConfig, FigureFormat, format_console_summary,
};
use paidsearch::pipeline::{self, PipelinePaths, PreprocessOutcome};
use std::path::PathBuf;
use std::process;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "paidsearch")]
#[command(about = "Difference-in-differences estimate of the paid-search revenue effect", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments of `run`, used when no subcommand is given
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Clone)]
struct PathArgs {
    /// Raw daily DMA revenue panel
    #[arg(long, default_value = "input/PaidSearch.csv")]
    input: PathBuf,

    /// Directory for the intermediate per-market tables
    #[arg(long, default_value = "temp")]
    temp_dir: PathBuf,

    /// Directory for the LaTeX table and JSON export
    #[arg(long, default_value = "output/tables")]
    tables_dir: PathBuf,

    /// Directory for the figures
    #[arg(long, default_value = "output/figures")]
    figures_dir: PathBuf,
}

impl From<&PathArgs> for PipelinePaths {
    fn from(args: &PathArgs) -> Self {
        Self {
            input: args.input.clone(),
            temp_dir: args.temp_dir.clone(),
            tables_dir: args.tables_dir.clone(),
            figures_dir: args.figures_dir.clone(),
        }
    }
}

#[derive(Args, Clone)]
struct FigureArgs {
    /// Date of the dashed intervention marker (YYYY-MM-DD)
    #[arg(long, default_value = "2012-05-22")]
    intervention_date: NaiveDate,

    /// Write PNG figures instead of SVG
    #[cfg(feature = "png")]
    #[arg(long)]
    png: bool,
}

impl FigureArgs {
    fn config(&self) -> FigureConfig {
        #[cfg(feature = "png")]
        let format = if self.png {
            FigureFormat::Png
        } else {
            FigureFormat::Svg
        };
        #[cfg(not(feature = "png"))]
        let format = FigureFormat::Svg;

        FigureConfig {
            intervention_date: self.intervention_date,
            format,
            ..Default::default()
        }
    }
}

#[derive(Args, Clone)]
struct EstimateArgs {
    /// Normal critical value for the confidence interval
    #[arg(long = "z", default_value_t = Z_95)]
    z_critical: f64,

    /// Minimum markets with a pre/post difference per group
    #[arg(long, default_value_t = 2)]
    min_markets: usize,

    /// Output format (text, json or csv)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl EstimateArgs {
    const fn config(&self) -> DidConfig {
        DidConfig {
            z_critical: self.z_critical,
            min_markets_per_group: self.min_markets,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Machine-readable encoding, `None` for the console summary.
    const fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Text => None,
            Self::Json => Some(ExportFormat::PrettyJson),
            Self::Csv => Some(ExportFormat::Csv),
        }
    }
}

#[derive(Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    paths: PathArgs,

    #[command(flatten)]
    figures: FigureArgs,

    #[command(flatten)]
    estimate: EstimateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the per-market tables and figures from the raw panel
    Preprocess {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        figures: FigureArgs,
    },

    /// Estimate the DID effect from the per-market tables
    Estimate {
        #[command(flatten)]
        paths: PathArgs,

        #[command(flatten)]
        estimate: EstimateArgs,
    },

    /// Preprocess, then estimate (the default)
    Run(RunArgs),
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Preprocess { paths, figures } => {
            run_preprocess(&PipelinePaths::from(&paths), &figures)?;
        }
        Commands::Estimate { paths, estimate } => {
            run_estimate(&PipelinePaths::from(&paths), &estimate, None)?;
        }
        Commands::Run(args) => {
            let paths = PipelinePaths::from(&args.paths);
            let outcome = run_preprocess(&paths, &args.figures)?;
            run_estimate(&paths, &args.estimate, Some(outcome.summary))?;
        }
    }

    Ok(())
}

fn run_preprocess(
    paths: &PipelinePaths,
    figures: &FigureArgs,
) -> Result<PreprocessOutcome, Box<dyn std::error::Error>> {
    let outcome = pipeline::preprocess(paths, &figures.config())?;

    println!("{}", outcome.summary);
    println!(
        "Wrote {} and {}",
        paths.market_table(outcome.treated.group).display(),
        paths.market_table(outcome.control.group).display()
    );
    for figure in &outcome.figures {
        println!("Wrote {}", figure.display());
    }
    println!();

    Ok(outcome)
}

fn run_estimate(
    paths: &PipelinePaths,
    args: &EstimateArgs,
    panel: Option<PanelSummary>,
) -> Result<DidReport, Box<dyn std::error::Error>> {
    let report = pipeline::estimate(paths, args.config(), panel)?;

    match args.format.export_format() {
        Some(format) => {
            println!("{}", report.export_to_string(format)?.trim_end());
        }
        None => {
            print!("{}", format_console_summary(&report.estimate));
            println!();
            println!("Wrote {}", paths.latex_table().display());
            println!("Wrote {}", paths.estimate_json().display());
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use paidsearch::data::{Group, MarketAggregate, MarketId, MarketTable};
    use paidsearch::estimate::DidEstimator;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_runs_with_defaults() {
        let cli = Cli::try_parse_from(["paidsearch"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(PipelinePaths::from(&cli.run.paths), PipelinePaths::default());
        assert_eq!(cli.run.estimate.z_critical, Z_95);
        assert_eq!(
            cli.run.figures.config().intervention_date,
            FigureConfig::default().intervention_date
        );
    }

    #[test]
    fn test_estimate_flags() {
        let cli =
            Cli::try_parse_from(["paidsearch", "estimate", "--z", "2.576", "--format", "json"])
                .unwrap();
        match cli.command {
            Some(Commands::Estimate { estimate, .. }) => {
                assert_eq!(estimate.config().z_critical, 2.576);
                assert_eq!(
                    estimate.format.export_format(),
                    Some(ExportFormat::PrettyJson)
                );
            }
            _ => panic!("expected estimate subcommand"),
        }
    }

    #[test]
    fn test_csv_format_prints_records() {
        let cli = Cli::try_parse_from(["paidsearch", "run", "--format", "csv"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let format = args.estimate.format.export_format().unwrap();
        assert_eq!(format, ExportFormat::Csv);

        let table = |group, diffs: [f64; 2]| {
            let rows = diffs
                .iter()
                .enumerate()
                .map(|(i, d)| MarketAggregate::new(MarketId(i as i64), Some(1.0), Some(1.0 + d)))
                .collect();
            MarketTable::new(group, rows).unwrap()
        };
        let estimate = DidEstimator::default()
            .estimate(
                &table(Group::Treated, [0.10, 0.20]),
                &table(Group::Control, [0.0, 0.05]),
            )
            .unwrap();
        let csv = DidReport::new(estimate, None).export_to_string(format).unwrap();

        assert_eq!(csv.lines().next(), Some("statistic,scale,value"));
        assert!(csv.lines().any(|l| l.starts_with("gamma_hat,log,")));
        assert!(csv.lines().any(|l| l.starts_with("control_n,log,2")));
    }

    #[test]
    fn test_text_format_has_no_export() {
        let cli = Cli::try_parse_from(["paidsearch", "estimate"]).unwrap();
        let Some(Commands::Estimate { estimate, .. }) = cli.command else {
            panic!("expected estimate subcommand");
        };
        assert_eq!(estimate.format.export_format(), None);
    }
}
