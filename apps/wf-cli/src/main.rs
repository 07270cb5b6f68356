mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use wf_algo::Downwind;
use wf_project::{build_algorithm, load_case, point_grid};
use wf_states::States;

use crate::error::{CliError, CliResult};
use crate::output::Format;

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(about = "Wind farm wake calculations from a case file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and references
    Validate {
        /// Path to the case file (YAML, or JSON by extension)
        case_path: PathBuf,
    },
    /// Waked results at every turbine
    Farm {
        case_path: PathBuf,
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Waked flow field on the case's point grid
    Points {
        case_path: PathBuf,
        #[arg(long, value_enum, default_value = "csv")]
        format: Format,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Farm {
            case_path,
            format,
            output,
        } => cmd_farm(&case_path, format, output.as_deref()),
        Commands::Points {
            case_path,
            format,
            output,
        } => cmd_points(&case_path, format, output.as_deref()),
    }
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    build_algorithm(&case)?;
    println!(
        "✓ Case '{}' is valid ({} turbines, {} wake models)",
        case.name,
        case.farm.turbines.len(),
        case.wake_models.len()
    );
    Ok(())
}

fn state_labels(algo: &Downwind) -> Vec<String> {
    algo.states()
        .index()
        .unwrap_or_else(|| (0..algo.n_states()).map(|s| s.to_string()).collect())
}

fn emit(text: String, out: Option<&Path>) -> CliResult<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("✓ Results written to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_farm(case_path: &Path, format: Format, out: Option<&Path>) -> CliResult<()> {
    let case = load_case(case_path)?;
    let algo = build_algorithm(&case)?;
    info!(case = case.name.as_str(), "running farm calculation");
    let fdata = algo.calc_farm()?;

    let states = state_labels(&algo);
    let turbines: Vec<String> = algo.farm().turbines().iter().map(|t| t.name.clone()).collect();
    let text = match format {
        Format::Csv => output::farm_csv(&fdata, &states, &turbines),
        Format::Json => output::farm_json(&fdata, &states, &turbines)?,
    };
    emit(text, out)
}

fn cmd_points(case_path: &Path, format: Format, out: Option<&Path>) -> CliResult<()> {
    let case = load_case(case_path)?;
    let grid = case.points.as_ref().ok_or_else(|| CliError::NoPoints {
        case: case.name.clone(),
    })?;
    let algo = build_algorithm(&case)?;
    info!(case = case.name.as_str(), "running point calculation");
    let fdata = algo.calc_farm()?;
    let points = point_grid(grid, algo.n_states());
    let pdata = algo.calc_points(&fdata, &points)?;

    let states = state_labels(&algo);
    let text = match format {
        Format::Csv => output::points_csv(&pdata, &states),
        Format::Json => output::points_json(&pdata, &states)?,
    };
    emit(text, out)
}
