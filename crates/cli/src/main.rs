// isofind CLI - equivalent thermal-break connector lookup

mod exit_codes;
mod query;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use isofind_equiv::{EquivError, ToleranceBand};
use isofind_io::LoadError;

use exit_codes::{
    EXIT_CATALOG_CONFIG, EXIT_CATALOG_DATA, EXIT_CATALOG_IO, EXIT_ERROR, EXIT_QUERY_INVALID,
    EXIT_QUERY_OUTPUT, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "isofind")]
#[command(about = "Find equivalent Schöck Isokorb and Leviat HIT thermal-break connectors")]
#[command(long_about = "\
Find equivalent Schöck Isokorb and Leviat HIT thermal-break connectors.

There are two ways to search:

  Method 1 (isofind code): give the exact model code of a product from either
  manufacturer's catalog and get the existing alternatives from both.

  Method 2 (isofind specs): give the required moment and shear resistances and
  the total height and get every product that satisfies them. Heights within
  +/-20 mm of the input are accepted in case the exact size is not available.")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Catalog config file (TOML)
    #[arg(long, global = true, env = "ISOFIND_CATALOG", value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find alternatives to a product given its model code
    #[command(after_help = "\
Examples:
  isofind code T-D-MM1-VV2-REI120-CV35-X80-H170-6.0
  isofind code 'HIT-HP MVX-0708-27-100-45' --json
  isofind code T-D-MM1-VV2-REI120-CV35-X80-H170-6.0 --moment-lower 1.0
  isofind --catalog catalog.toml code T-D-MM1-VV2-REI120-CV35-X80-H170-6.0 --output result.json")]
    Code {
        /// Schöck identifier or Leviat product type code
        code: String,

        #[command(flatten)]
        band: BandArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Find products matching required resistances and height
    #[command(after_help = "\
Examples:
  isofind specs --moment 20.5 --shear 48 --height 170
  isofind specs --moment 20,5 --shear 48 --height 170 --json
  isofind specs --moment 20.5 --shear 48 --height 170 --height-offset 40")]
    Specs {
        /// Moment resistance (kNm/m); comma decimals accepted
        #[arg(long, value_parser = parse_resistance)]
        moment: f64,

        /// Shear resistance (kN/m); comma decimals accepted
        #[arg(long, value_parser = parse_resistance)]
        shear: f64,

        /// Total height (mm)
        #[arg(long)]
        height: u32,

        #[command(flatten)]
        band: BandArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the catalog records a model code resolves to, without matching
    #[command(after_help = "\
Examples:
  isofind show T-D-MM1-VV2-REI120-CV35-X80-H170-6.0
  isofind show 'HIT-HP MVX-0708-27-100-45' --json")]
    Show {
        /// Schöck identifier or Leviat product type code
        code: String,

        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Load the catalog and report row counts without querying
    #[command(after_help = "\
Examples:
  isofind validate --catalog catalog.toml
  ISOFIND_CATALOG=catalog.toml isofind validate --json")]
    Validate {
        /// Output JSON to stdout instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Print example model codes for both manufacturers
    Examples,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output JSON to stdout instead of a human summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Per-query overrides of the configured tolerance band.
#[derive(Args, Debug, Default)]
pub struct BandArgs {
    /// Lower moment factor (default 0.99)
    #[arg(long, value_name = "FACTOR")]
    pub moment_lower: Option<f64>,

    /// Upper moment factor (default 1.03)
    #[arg(long, value_name = "FACTOR")]
    pub moment_upper: Option<f64>,

    /// Lower shear factor (default 0.99)
    #[arg(long, value_name = "FACTOR")]
    pub shear_lower: Option<f64>,

    /// Upper shear factor (default 1.03)
    #[arg(long, value_name = "FACTOR")]
    pub shear_upper: Option<f64>,

    /// Height window in mm on either side of the target (default 20)
    #[arg(long, value_name = "MM")]
    pub height_offset: Option<u32>,
}

impl BandArgs {
    /// `base` with any given flags applied, or `None` when no flag was given.
    pub fn apply(&self, base: ToleranceBand) -> Option<ToleranceBand> {
        if self.moment_lower.is_none()
            && self.moment_upper.is_none()
            && self.shear_lower.is_none()
            && self.shear_upper.is_none()
            && self.height_offset.is_none()
        {
            return None;
        }
        Some(ToleranceBand {
            moment_lower: self.moment_lower.unwrap_or(base.moment_lower),
            moment_upper: self.moment_upper.unwrap_or(base.moment_upper),
            shear_lower: self.shear_lower.unwrap_or(base.shear_lower),
            shear_upper: self.shear_upper.unwrap_or(base.shear_upper),
            height_offset: self.height_offset.unwrap_or(base.height_offset),
        })
    }
}

fn parse_resistance(s: &str) -> Result<f64, String> {
    isofind_equiv::normalize::normalize_resistance(s)
        .ok_or_else(|| format!("'{s}' is not a number"))
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  isofind-equiv ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  isofind-equiv ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: isofind <command> [options]");
            eprintln!("       isofind --help for more information");
            Ok(())
        }
        Some(Commands::Code { code, band, output }) => {
            query::cmd_code(cli.catalog, &code, &band, &output)
        }
        Some(Commands::Specs {
            moment,
            shear,
            height,
            band,
            output,
        }) => query::cmd_specs(cli.catalog, moment, shear, height, &band, &output),
        Some(Commands::Show { code, json }) => query::cmd_show(cli.catalog, &code, json),
        Some(Commands::Validate { json }) => query::cmd_validate(cli.catalog, json),
        Some(Commands::Examples) => {
            query::cmd_examples();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::new(EXIT_QUERY_OUTPUT, msg)
    }

    /// Map a catalog load failure to the catalog exit code range.
    pub fn load(err: LoadError) -> Self {
        let code = match &err {
            LoadError::Io { .. } => EXIT_CATALOG_IO,
            LoadError::Engine(EquivError::ConfigParse(_) | EquivError::ConfigValidation(_)) => {
                EXIT_CATALOG_CONFIG
            }
            e if e.is_data_error() => EXIT_CATALOG_DATA,
            _ => EXIT_ERROR,
        };
        let hint = match &err {
            LoadError::MissingColumn { .. } => {
                Some("column names are set in the [schoeck.columns] / [leviat.columns] config sections".to_string())
            }
            LoadError::Engine(EquivError::DataFormat { .. }) => {
                Some("set [policy] resistance/height = \"lenient\" to skip unparsable rows".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Map an engine error raised while answering a query.
    pub fn query(err: EquivError) -> Self {
        let code = match &err {
            EquivError::InvalidQuery(_) | EquivError::ConfigValidation(_) => EXIT_QUERY_INVALID,
            _ => EXIT_ERROR,
        };
        Self::new(code, err.to_string())
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
