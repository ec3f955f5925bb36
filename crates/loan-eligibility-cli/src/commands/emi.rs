use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_eligibility_core::emi::{quote_emi, DEFAULT_ANNUAL_RATE};

/// Arguments for a stand-alone EMI estimate
#[derive(Args)]
pub struct EmiArgs {
    /// Loan principal
    #[arg(long)]
    pub amount: Decimal,

    /// Tenure in months
    #[arg(long)]
    pub tenure: u32,

    /// Nominal annual interest rate as a decimal (default 0.12)
    #[arg(long)]
    pub rate: Option<Decimal>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rate = args.rate.unwrap_or(DEFAULT_ANNUAL_RATE);
    let result = quote_emi(args.amount, rate, args.tenure)?;
    Ok(serde_json::to_value(result)?)
}
