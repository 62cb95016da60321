//! Scenario engine: immutable deep-merge of partial overrides into a base
//! deal, re-analysis of each variant, comparison, probability weighting and
//! two-way sensitivity grids.

pub mod comparison;
pub mod merge;
pub mod scenario;
pub mod sensitivity;

pub use comparison::{compare_scenarios, MetricDelta, ScenarioComparison, YearDelta};
pub use merge::{deep_merge, merge_scenario, override_at};
pub use scenario::{analyze_scenarios, run_scenario, ScenarioOutput, ScenarioResult, ScenarioRun};
pub use sensitivity::{run_sensitivity, SensitivityInput, SensitivityOutput};
