use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_economics_core::analysis::assemble_schedule;
use lease_economics_core::deal::DealDefinition;
use lease_economics_core::normalize::normalize;
use lease_economics_core::schedule::{build_amortization_schedule, AmortizationSummary, ScheduleOptions};

use crate::input;

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Amount to amortize
    #[arg(long, required_unless_present = "input")]
    pub principal: Option<Decimal>,

    /// Annual interest rate (e.g. 0.08); zero amortizes straight-line
    #[arg(long, default_value = "0")]
    pub rate: Decimal,

    /// Number of monthly payments
    #[arg(long, required_unless_present = "input")]
    pub months: Option<u32>,

    /// Amortize the financed pools of a deal file instead
    #[arg(long, conflicts_with_all = ["principal", "months"])]
    pub input: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = if let Some(ref path) = args.input {
        let deal: DealDefinition = input::file::read_document(path)?;
        let (bundle, _) = normalize(&deal);
        assemble_schedule(&deal, &bundle, &ScheduleOptions::default()).1
    } else {
        let principal = args.principal.ok_or("--principal required")?;
        let months = args.months.ok_or("--months required")?;
        if principal < Decimal::ZERO {
            return Err("--principal must not be negative".into());
        }
        build_amortization_schedule(principal, args.rate, months)
    };

    Ok(json!({
        "summary": AmortizationSummary::from_rows(&rows),
        "results": rows,
    }))
}
