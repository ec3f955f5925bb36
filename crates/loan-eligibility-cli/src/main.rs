mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::assess::AssessArgs;
use commands::emi::EmiArgs;

/// Loan eligibility scoring with decimal precision
#[derive(Parser)]
#[command(
    name = "loan-eligibility",
    version,
    about = "Loan eligibility scoring with decimal precision",
    long_about = "Scores a loan application against CIBIL, income, EMI burden, bank \
                  balance, age and employment criteria, optionally adjusted by a \
                  trained approval model, and reports a decision with reasons."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter directive written to stderr (e.g. debug, loan_eligibility_core=trace)
    #[arg(long, default_value = "loan_eligibility_core=info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a loan application
    Assess(AssessArgs),
    /// Estimate the monthly installment for a loan
    Emi(EmiArgs),
    /// List supported response languages
    Languages,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(directive: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Assess(args) => commands::assess::run_assess(args),
        Commands::Emi(args) => commands::emi::run_emi(args),
        Commands::Languages => commands::languages::run_languages(),
        Commands::Version => {
            println!("loan-eligibility {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
