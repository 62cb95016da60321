use clap::Args;
use serde_json::Value;

use lease_economics_core::analysis::assemble_schedule;
use lease_economics_core::deal::DealDefinition;
use lease_economics_core::normalize::normalize;
use lease_economics_core::schedule::{build_annual_legacy, roll_up_to_annual, RentConfig, ScheduleOptions};

use crate::input;

/// Arguments for the monthly schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Print the schedule summary instead of the monthly rows
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the annual roll-up
#[derive(Args)]
pub struct AnnualArgs {
    /// Path to deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Use the direct annual builder (base rent and abatement only)
    #[arg(long)]
    pub legacy: bool,
}

pub fn run_schedule(args: ScheduleArgs, options: &ScheduleOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealDefinition = input::read_input(args.input.as_deref(), "the monthly schedule")?;
    let (bundle, _) = normalize(&deal);
    let (schedule, _) = assemble_schedule(&deal, &bundle, options);
    if args.summary {
        return Ok(serde_json::to_value(schedule.summary)?);
    }
    Ok(serde_json::to_value(schedule.months)?)
}

pub fn run_annual(args: AnnualArgs, options: &ScheduleOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealDefinition = input::read_input(args.input.as_deref(), "the annual schedule")?;
    let (bundle, _) = normalize(&deal);
    let annual = if args.legacy {
        let rent = RentConfig::from_deal(&deal, &bundle);
        build_annual_legacy(&bundle, &rent, deal.rentable_area)
    } else {
        let (schedule, _) = assemble_schedule(&deal, &bundle, options);
        roll_up_to_annual(&schedule.months)
    };
    Ok(serde_json::to_value(annual)?)
}
