use napi::Result as NapiResult;
use napi_derive::napi;

use lease_economics_core::deal::DealDefinition;
use lease_economics_core::schedule::ScheduleOptions;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_deal(deal_json: &str) -> NapiResult<DealDefinition> {
    serde_json::from_str(deal_json).map_err(to_napi_error)
}

fn parse_options(options_json: Option<String>) -> NapiResult<ScheduleOptions> {
    match options_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error),
        None => Ok(ScheduleOptions::default()),
    }
}

// ---------------------------------------------------------------------------
// Normalization and schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn normalize_deal(deal_json: String) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    let (bundle, issues) = lease_economics_core::normalize::normalize(&deal);
    serde_json::to_string(&serde_json::json!({
        "normalized": bundle,
        "issues": issues,
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn monthly_schedule(deal_json: String, options_json: Option<String>) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    let options = parse_options(options_json)?;
    let (bundle, _) = lease_economics_core::normalize::normalize(&deal);
    let (schedule, _) = lease_economics_core::analysis::assemble_schedule(&deal, &bundle, &options);
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct AmortizationBindingInput {
    principal: rust_decimal::Decimal,
    #[serde(default)]
    annual_rate: rust_decimal::Decimal,
    months: u32,
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = lease_economics_core::schedule::build_amortization_schedule(
        input.principal,
        input.annual_rate,
        input.months,
    );
    serde_json::to_string(&serde_json::json!({
        "summary": lease_economics_core::schedule::AmortizationSummary::from_rows(&rows),
        "rows": rows,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_lease(deal_json: String, options_json: Option<String>) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    let options = parse_options(options_json)?;
    let output = lease_economics_core::analysis::analyze_lease(&deal, &options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn merge_scenario(base_json: String, overrides_json: String) -> NapiResult<String> {
    let base = parse_deal(&base_json)?;
    let overrides: serde_json::Value = serde_json::from_str(&overrides_json).map_err(to_napi_error)?;
    let merged = lease_economics_core::scenarios::merge_scenario(&base, &overrides).map_err(to_napi_error)?;
    serde_json::to_string(&merged).map_err(to_napi_error)
}

#[napi]
pub fn compare_scenarios(
    base_json: String,
    overrides_json: String,
    variant_name: Option<String>,
    options_json: Option<String>,
) -> NapiResult<String> {
    let base = parse_deal(&base_json)?;
    let overrides: serde_json::Value = serde_json::from_str(&overrides_json).map_err(to_napi_error)?;
    let options = parse_options(options_json)?;
    let name = variant_name.unwrap_or_else(|| "Variant".to_string());

    let base_run = lease_economics_core::scenarios::run_scenario(&base, "Base", &serde_json::json!({}), &options)
        .map_err(to_napi_error)?;
    let variant_run = lease_economics_core::scenarios::run_scenario(&base, &name, &overrides, &options)
        .map_err(to_napi_error)?;
    let comparison = lease_economics_core::scenarios::compare_scenarios(&base_run, &variant_run);
    serde_json::to_string(&comparison).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct ScenarioBindingInput {
    deal: DealDefinition,
    scenarios: Vec<lease_economics_core::types::Scenario>,
    #[serde(default)]
    options: ScheduleOptions,
}

#[napi]
pub fn scenario_analysis(input_json: String) -> NapiResult<String> {
    let input: ScenarioBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease_economics_core::scenarios::analyze_scenarios(&input.deal, &input.scenarios, &input.options)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct SensitivityBindingInput {
    deal: DealDefinition,
    #[serde(flatten)]
    input: lease_economics_core::scenarios::SensitivityInput,
    #[serde(default)]
    options: ScheduleOptions,
}

#[napi]
pub fn build_sensitivity_grid(input_json: String) -> NapiResult<String> {
    let binding_input: SensitivityBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lease_economics_core::scenarios::run_sensitivity(
        &binding_input.deal,
        &binding_input.input,
        &binding_input.options,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
