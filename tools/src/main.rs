//! datagen: write synthetic customer and patient records to CSV.
//!
//! Usage:
//!   datagen customers --count 1000 --output customers.csv --seed 42
//!   datagen patients -c 500 -o data/patients.csv --locale fr_FR
//!   datagen both -c 100 --output-dir out --prefix demo_ --as-of 2025-01-01T00:00:00Z

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use synthrec_core::{
    export_both, export_customers, export_patients, ExportSummary, GenError, GenerateOptions,
    Locale, ModelConfig, ReferenceClock,
};

#[derive(Parser, Debug)]
#[command(name = "datagen")]
#[command(version)]
#[command(about = "Generate synthetic customer and patient records as CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate customer profiles
    Customers {
        #[command(flatten)]
        common: CommonArgs,

        /// Output CSV path
        #[arg(short, long, default_value = "customers.csv")]
        output: PathBuf,
    },

    /// Generate patient records
    Patients {
        #[command(flatten)]
        common: CommonArgs,

        /// Output CSV path
        #[arg(short, long, default_value = "patients.csv")]
        output: PathBuf,
    },

    /// Generate both files into one directory
    Both {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory receiving <prefix>customers.csv and <prefix>patients.csv
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// File name prefix
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Number of records to generate
    #[arg(short, long, default_value_t = 100, allow_negative_numbers = true)]
    count: i64,

    /// Seed for reproducible output (ids and attribute values)
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Locale for names and addresses (en_US, fr_FR, zh_CN, zh_TW)
    #[arg(long, default_value = "en_US")]
    locale: String,

    /// JSON file overriding the record model
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference instant for relative dates, RFC 3339 (default: now)
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,
}

impl CommonArgs {
    fn options(&self) -> Result<GenerateOptions, GenError> {
        let locale: Locale = self.locale.parse()?;
        let clock = self.as_of.map(ReferenceClock::fixed).unwrap_or_default();
        let mut options = GenerateOptions::new(self.count)
            .with_locale(locale)
            .with_clock(clock);
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }
        Ok(options)
    }

    fn model(&self) -> Result<ModelConfig, GenError> {
        match &self.config {
            Some(path) => ModelConfig::load(path),
            None => Ok(ModelConfig::default()),
        }
    }
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(summaries) => {
            for summary in &summaries {
                println!("{}", describe(summary));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if let GenError::UnsupportedLocale { .. } = e {
                eprintln!("Supported locales: {}", Locale::supported_codes());
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(command: Command) -> Result<Vec<ExportSummary>, GenError> {
    match command {
        Command::Customers { common, output } => {
            let summary = export_customers(&output, &common.options()?, &common.model()?)?;
            Ok(vec![summary])
        }
        Command::Patients { common, output } => {
            let summary = export_patients(&output, &common.options()?, &common.model()?)?;
            Ok(vec![summary])
        }
        Command::Both {
            common,
            output_dir,
            prefix,
        } => {
            let options = common.options()?;
            let summaries = export_both(&output_dir, &prefix, &options, &common.model()?)?;
            Ok(summaries.into())
        }
    }
}

fn describe(summary: &ExportSummary) -> String {
    format!(
        "Wrote {} {} records -> {}",
        summary.rows,
        summary.entity,
        summary.path.display()
    )
}

fn exit_code(err: &GenError) -> u8 {
    match err {
        GenError::InvalidArgument { .. } => 2,
        _ => 1,
    }
}
