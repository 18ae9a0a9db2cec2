pub mod prediction;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::time as stdtime;

use log::info;
use serde_json::json;

use model::json_serialisation::load_population_from_json;
use solver::{run_population, ModeChoice};

use crate::prediction::PredictionTable;

/// Runs mode choice over a whole population instance and returns the run
/// summary plus the filled prediction table.
pub fn run(input_data: serde_json::Value) -> (serde_json::Value, PredictionTable) {
    let instance = load_population_from_json(input_data);
    let mode_choice = ModeChoice::new(&instance.config, &instance.modes)
        .unwrap_or_else(|error| panic!("Invalid mode configuration: {}", error));

    let exit_requested = AtomicBool::new(false);
    let start_time = stdtime::Instant::now();
    let results = run_population(
        &instance.households,
        &instance.modes,
        &instance.vehicle_types,
        &mode_choice,
        &exit_requested,
    );
    let runtime_duration = start_time.elapsed();

    let mut table = PredictionTable::new(&instance.modes, instance.config.household_iterations);
    let mut failed_households = 0;
    let mut not_started = 0;
    for (household, result) in instance.households.iter().zip(results.iter()) {
        match result {
            Some(result) => {
                if !result.success {
                    failed_households += 1;
                }
                table.record_household(household, result);
            }
            None => not_started += 1,
        }
    }
    info!(
        "{} households, {} failed, {:0.2}sec",
        instance.households.len(),
        failed_households,
        runtime_duration.as_secs_f32()
    );

    let mode_shares: serde_json::Map<String, serde_json::Value> = table
        .mode_names()
        .iter()
        .zip(table.chosen_counts())
        .map(|(name, &count)| (name.clone(), json!(count)))
        .collect();
    let summary = json!({
        "households": instance.households.len(),
        "failedHouseholds": failed_households,
        "notStarted": not_started,
        "householdIterations": instance.config.household_iterations,
        "runningTimeSeconds": runtime_duration.as_secs_f32(),
        "modeShares": mode_shares,
        "fitness": table.fitness(),
        "zeroParamFitness": table.zero_param_fitness(),
        "rhoSquared": table.rho_squared(),
        "missingTrips": table.missing_trips(),
    });
    (summary, table)
}
