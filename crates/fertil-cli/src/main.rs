mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fertil",
    version,
    about = "Soil fertility calculator: base saturation, adequacy and fertilizer doses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze soil samples (JSON) or a lab report (XLSX or text)
    Analyze {
        /// Path to a .json sample (or array of samples), .xlsx or text report
        input_file: PathBuf,

        /// Unit of K in reports that do not state one: mg (default) or cmolc
        #[arg(long, default_value = "mg")]
        k_unit: String,

        /// Predefined crop profile: soja, milho, cafe, pastagem
        #[arg(short, long, value_name = "NAME", conflicts_with = "crop_file")]
        crop: Option<String>,

        /// Custom JSON crop profile
        #[arg(long, value_name = "FILE")]
        crop_file: Option<PathBuf>,

        /// Custom JSON reference tables (default: built-in tables)
        #[arg(short, long, value_name = "FILE")]
        tables: Option<PathBuf>,

        /// Ca/Mg/K need formula: cec-fraction (default) or fixed-threshold
        #[arg(long, default_value = "cec-fraction")]
        base_strategy: String,

        /// P correction factor: current-p (default) or texture
        #[arg(long, default_value = "current-p")]
        p_factor: String,

        /// K fertilizer dose basis: shortcut (default) or oxide
        #[arg(long, default_value = "shortcut")]
        k_dose: String,

        /// Include fertilizer sources and application rates
        #[arg(long)]
        fertilizers: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show the reasoning behind every nutrient status
        #[arg(long)]
        verbose: bool,
    },
    /// Parse a lab report (XLSX or text) into structured data (without analyzing)
    Parse {
        /// Path to an .xlsx or text report
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Also map each report onto an engine sample using this K unit
        #[arg(long, value_name = "UNIT")]
        k_unit: Option<String>,
    },
    /// Inspect and validate crop profiles
    Crops {
        #[command(subcommand)]
        action: CropsAction,
    },
    /// Inspect and validate reference tables
    Tables {
        #[command(subcommand)]
        action: TablesAction,
    },
}

#[derive(Subcommand)]
enum CropsAction {
    /// List predefined crop profiles
    List,
    /// Show how a crop profile changes the default targets
    Explain {
        /// Preset name (e.g., "soja")
        preset: String,
    },
    /// Validate a custom crop profile
    Validate {
        /// Path to JSON crop profile
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum TablesAction {
    /// Print the built-in reference tables
    Show {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Validate a custom reference table file
    Validate {
        /// Path to JSON reference tables
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input_file,
            k_unit,
            crop,
            crop_file,
            tables,
            base_strategy,
            p_factor,
            k_dose,
            fertilizers,
            output,
            verbose,
        } => commands::analyze::run(commands::analyze::AnalyzeArgs {
            input_file,
            k_unit,
            crop,
            crop_file,
            tables,
            base_strategy,
            p_factor,
            k_dose,
            fertilizers,
            output,
            verbose,
        }),
        Commands::Parse {
            input_file,
            output,
            k_unit,
        } => commands::parse::run(input_file, &output, k_unit.as_deref()),
        Commands::Crops { action } => match action {
            CropsAction::List => commands::crops::list(),
            CropsAction::Explain { preset } => commands::crops::explain(&preset),
            CropsAction::Validate { file } => commands::crops::validate(&file),
        },
        Commands::Tables { action } => match action {
            TablesAction::Show { output } => commands::tables::show(&output),
            TablesAction::Validate { file } => commands::tables::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
