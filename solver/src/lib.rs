pub mod allocator;
pub mod mode_choice;
pub mod passenger;

pub use allocator::{Conflict, HouseholdResourceAllocator, Resolution, VehicleAllocationWindow};
pub use mode_choice::{HouseholdModeChoice, ModeChoice};
pub use passenger::{PassengerMatchingAlgorithm, PotentialPassengerTrip};

use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use rand::Rng;
use rayon::prelude::*;

use model::household::Household;
use model::modes::Modes;
use model::vehicles::VehicleType;

/// A standard-normal draw, to be scaled by a mode's variance scale.
pub(crate) fn sample_standard_normal(rng: &mut impl Rng) -> f32 {
    let draw: f64 = rng.sample(rand_distr::StandardNormal);
    draw as f32
}

/// Resolves all households of a population in parallel. Every household uses
/// its own id-derived random stream, so the outcome does not depend on how
/// rayon schedules the work. The exit flag is only honored between
/// households: a household either completes or does not start, and its slot
/// is None then.
pub fn run_population(
    households: &[Household],
    modes: &Modes,
    vehicle_types: &[VehicleType],
    mode_choice: &ModeChoice,
    exit_requested: &AtomicBool,
) -> Vec<Option<HouseholdModeChoice>> {
    let results: Vec<Option<HouseholdModeChoice>> = households
        .par_iter()
        .map(|household| {
            if exit_requested.load(Ordering::Relaxed) {
                return None;
            }
            Some(mode_choice.run(household, modes, vehicle_types))
        })
        .collect();
    let failures = results
        .iter()
        .filter(|r| matches!(r, Some(result) if !result.success))
        .count();
    info!(
        "{} households resolved, {} failed",
        results.iter().filter(|r| r.is_some()).count(),
        failures
    );
    results
}
