use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use cutstock_core::{CuttingStockRequest, CuttingStockResult, MasterObjective, Optimizer};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod input;
mod report;

use input::{Prompted, Prompter};

#[derive(Parser)]
#[command(name = "cutstock")]
#[command(about = "One-dimensional cutting stock by column generation", long_about = None)]
struct Cli {
    /// Log column generation iterations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem described in a file
    Solve {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Enter the problem at the prompt
    Interactive {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(clap::Args)]
struct Overrides {
    /// Cost the master problem minimizes
    #[arg(long, value_enum)]
    objective: Option<Objective>,

    /// Truncation phases before the remainder is packed greedily
    #[arg(long)]
    max_phases: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Objective {
    Bars,
    Waste,
}

impl From<Objective> for MasterObjective {
    fn from(objective: Objective) -> Self {
        match objective {
            Objective::Bars => MasterObjective::Bars,
            Objective::Waste => MasterObjective::Waste,
        }
    }
}

impl Overrides {
    fn apply(&self, request: &mut CuttingStockRequest) {
        if let Some(objective) = self.objective {
            request.settings.objective = objective.into();
        }
        if let Some(max_phases) = self.max_phases {
            request.settings.max_phases = max_phases;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Solve {
            input,
            output,
            overrides,
        } => {
            solve_command(&input, output.as_deref(), &overrides)?;
        }
        Commands::Interactive { overrides } => {
            interactive_command(&overrides)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_request(path: &Path) -> Result<CuttingStockRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let extension = path.extension().and_then(|s| s.to_str());
    let request = if matches!(extension, Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    debug!("Loaded request from {}", path.display());
    Ok(request)
}

fn solve_command(input: &Path, output: Option<&Path>, overrides: &Overrides) -> Result<()> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let mut request = load_request(input)?;
    overrides.apply(&mut request);

    println!(
        "  bar length {}, {} item types",
        request.bar_length.to_string().bright_white().bold(),
        request.items.len().to_string().bright_white().bold()
    );
    println!();

    let result = run(request)?;

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    }

    Ok(())
}

fn interactive_command(overrides: &Overrides) -> Result<()> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());

    let mut request = match prompter.collect_request()? {
        Prompted::Value(request) => request,
        Prompted::Cancelled => {
            println!("{}", "Operation cancelled by user.".bright_red());
            return Ok(());
        }
    };
    overrides.apply(&mut request);
    println!();

    run(request)?;
    Ok(())
}

fn run(request: CuttingStockRequest) -> Result<CuttingStockResult> {
    println!("{}", "🚀 Running column generation...".bright_blue());
    println!();

    let optimizer = Optimizer::new(request)?;
    let result = optimizer.optimize()?;

    report::print_result(&result);
    println!("{}", "✅ Optimization complete!".bright_green().bold());

    Ok(result)
}
