
use log::debug;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use model::base_types::ModeIdx;
use model::config::Config;
use model::household::Household;
use model::modes::Modes;
use model::vehicles::VehicleType;
use solution::{HouseholdData, TripChainData};

use crate::allocator::{HouseholdResourceAllocator, Resolution};
use crate::passenger::PassengerMatchingAlgorithm;
use crate::sample_standard_normal;

/// The result of resolving one household: the working data with the per-trip
/// chosen-mode history, and the allocator and passenger-matching state, kept
/// for downstream analysis.
pub struct HouseholdModeChoice {
    pub data: HouseholdData,
    pub resource_allocator: HouseholdResourceAllocator,
    pub passenger_matching: Option<PassengerMatchingAlgorithm>,
    pub success: bool,
}

/// The per-household mode choice driver: repeats the enumeration/allocation/
/// passenger passes over the configured number of household iterations, with
/// fresh error terms per iteration.
pub struct ModeChoice {
    household_iterations: usize,
    random_seed: u64,
    max_trip_chain_size: usize,
    variance_scale: Vec<f32>,
    auto_mode: Option<ModeIdx>,
    rideshare_mode: Option<ModeIdx>,
    passenger_mode: Option<ModeIdx>,
}

impl ModeChoice {
    /// Resolves the configured mode names against the mode universe.
    pub fn new(config: &Config, modes: &Modes) -> Result<ModeChoice, String> {
        let mut auto_mode = None;
        let mut rideshare_mode = None;
        if let Some(rideshare_name) = &config.mode_names.rideshare {
            let rideshare = modes
                .index_of(rideshare_name)
                .filter(|&index| index >= modes.number_non_shared())
                .ok_or_else(|| {
                    format!(
                        "Unable to find a shared mode called '{}' to use for rideshare.",
                        rideshare_name
                    )
                })?;
            let auto = modes
                .index_of(&config.mode_names.auto)
                .filter(|&index| index < modes.number_non_shared())
                .ok_or_else(|| {
                    format!(
                        "Unable to find a non-shared mode called '{}' to replace with rideshare.",
                        config.mode_names.auto
                    )
                })?;
            rideshare_mode = Some(rideshare);
            auto_mode = Some(auto);
        }
        let mut passenger_mode = None;
        if let Some(passenger_name) = &config.mode_names.passenger {
            let passenger = modes
                .index_of(passenger_name)
                .filter(|&index| modes.get(index).as_passenger().is_some())
                .ok_or_else(|| {
                    format!(
                        "Unable to find a passenger mode called '{}'.",
                        passenger_name
                    )
                })?;
            passenger_mode = Some(passenger);
        }
        Ok(ModeChoice {
            household_iterations: config.household_iterations,
            random_seed: config.random_seed,
            max_trip_chain_size: config.max_trip_chain_size,
            variance_scale: modes.variance_scales(),
            auto_mode,
            rideshare_mode,
            passenger_mode,
        })
    }

    /// Resolves one household. The household's random stream is derived from
    /// its id, so results do not depend on scheduling order.
    pub fn run(
        &self,
        household: &Household,
        modes: &Modes,
        vehicle_types: &[VehicleType],
    ) -> HouseholdModeChoice {
        let number_of_categories = vehicle_types.len() + 1;
        let mut data = HouseholdData::new(household, modes.len(), number_of_categories);
        let mut resource_allocator = HouseholdResourceAllocator::new(household);
        let mut passenger_matching = self.passenger_mode.map(PassengerMatchingAlgorithm::new);

        if self.max_trip_chain_size > 0
            && household.largest_trip_chain_size() > self.max_trip_chain_size
        {
            debug!("household {} skipped: trip chain too long", household.id());
            return failure(data, resource_allocator, passenger_matching);
        }

        let mut rng = XorShiftRng::seed_from_u64(self.random_seed + household.id().0 as u64);

        if !self.pass1(household, &mut data, modes, &mut rng) {
            return failure(data, resource_allocator, passenger_matching);
        }
        for household_iteration in 0..self.household_iterations {
            if household_iteration > 0 {
                self.regenerate_error_terms(household, &mut data, &mut rng);
            }
            self.assign_best_per_vehicle(household, &mut data, modes);
            if resource_allocator
                .resolve(household, &mut data, vehicle_types, household_iteration)
                .is_none()
            {
                return failure(data, resource_allocator, passenger_matching);
            }
            if !assign_modes(household, resource_allocator.resolution(), &mut data) {
                return failure(data, resource_allocator, passenger_matching);
            }
            resource_allocator.build_vehicle_availabilities(household);
            self.process_rideshare(household, &mut data);
            if let Some(matching) = passenger_matching.as_mut() {
                matching.generate_on_tour_trips(household, &data, modes, &mut rng);
                matching.resolve_passenger_trips(household, &mut data);
                matching.generate_at_home_trips(
                    household,
                    &data,
                    modes,
                    &resource_allocator,
                    &mut rng,
                );
                matching.resolve_passenger_trips(household, &mut data);
            }
            self.final_assignment(household, &mut data);
        }
        HouseholdModeChoice {
            data,
            resource_allocator,
            passenger_matching,
            success: true,
        }
    }

    /// Feasibility and enumeration of every chain, plus the error terms the
    /// first household iteration reuses. False fails the household.
    fn pass1(
        &self,
        household: &Household,
        data: &mut HouseholdData,
        modes: &Modes,
        rng: &mut XorShiftRng,
    ) -> bool {
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if chain.follows_representative() {
                    continue;
                }
                let chain_data = &mut data.person_data[i].trip_chain_data[j];
                if !chain_data.pass1(chain, modes) {
                    debug!(
                        "household {}: no feasible mode combination for a chain of person {}",
                        household.id(),
                        person.id()
                    );
                    return false;
                }
                self.generate_random_terms(chain_data, rng);
            }
        }
        true
    }

    fn generate_random_terms(&self, chain_data: &mut TripChainData, rng: &mut XorShiftRng) {
        for trip_data in chain_data.trip_data.iter_mut() {
            for (error, scale) in trip_data.error.iter_mut().zip(&self.variance_scale) {
                *error = sample_standard_normal(rng) * scale;
            }
        }
        chain_data.regenerate_utilities();
    }

    fn regenerate_error_terms(
        &self,
        household: &Household,
        data: &mut HouseholdData,
        rng: &mut XorShiftRng,
    ) {
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if chain.follows_representative() {
                    continue;
                }
                self.generate_random_terms(&mut data.person_data[i].trip_chain_data[j], rng);
            }
        }
    }

    fn assign_best_per_vehicle(
        &self,
        household: &Household,
        data: &mut HouseholdData,
        modes: &Modes,
    ) {
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if chain.follows_representative() {
                    continue;
                }
                data.person_data[i].trip_chain_data[j].select_best_per_vehicle_type(modes);
            }
        }
    }

    /// Converts the auto trips of joint-tour representatives to rideshare,
    /// carrying the auto mode's utility and error term over.
    fn process_rideshare(&self, household: &Household, data: &mut HouseholdData) {
        let (Some(auto), Some(rideshare)) = (self.auto_mode, self.rideshare_mode) else {
            return;
        };
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if !chain.is_joint_representative() {
                    continue;
                }
                for trip_data in data.person_data[i].trip_chain_data[j].trip_data.iter_mut() {
                    if trip_data.mode == Some(auto) {
                        trip_data.mode = Some(rideshare);
                        trip_data.v[rideshare] = trip_data.v[auto];
                        trip_data.error[rideshare] = trip_data.error[auto];
                    }
                }
            }
        }
    }

    /// Copies the representative's assignment to the other members of each
    /// joint tour and records the iteration's chosen mode on every trip.
    fn final_assignment(&self, household: &Household, data: &mut HouseholdData) {
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if chain.follows_representative() {
                    let representative = household
                        .joint_tour_representative(chain.joint_tour().unwrap().id)
                        .unwrap();
                    let representative_modes: Vec<ModeIdx> = data
                        .trip_chain_data(representative)
                        .trip_data
                        .iter()
                        .map(|trip_data| trip_data.assigned_mode())
                        .collect();
                    let chain_data = &mut data.person_data[i].trip_chain_data[j];
                    for (trip_data, mode) in
                        chain_data.trip_data.iter_mut().zip(representative_modes)
                    {
                        trip_data.mode = Some(mode);
                        trip_data.chosen.push(mode);
                    }
                } else {
                    for trip_data in data.person_data[i].trip_chain_data[j].trip_data.iter_mut() {
                        let mode = trip_data.assigned_mode();
                        trip_data.chosen.push(mode);
                    }
                }
            }
        }
    }
}

/// Applies the allocator's resolution to every chain. False if a chain has
/// no solution in its granted category, which fails the household.
pub(crate) fn assign_modes(
    household: &Household,
    resolution: &Resolution,
    data: &mut HouseholdData,
) -> bool {
    for (i, person) in household.persons().iter().enumerate() {
        for (j, chain) in person.trip_chains().iter().enumerate() {
            if chain.follows_representative() {
                continue;
            }
            let Some(category) = resolution[i][j] else {
                return false;
            };
            if !data.person_data[i].trip_chain_data[j].assign(category) {
                return false;
            }
        }
    }
    true
}

fn failure(
    data: HouseholdData,
    resource_allocator: HouseholdResourceAllocator,
    passenger_matching: Option<PassengerMatchingAlgorithm>,
) -> HouseholdModeChoice {
    HouseholdModeChoice {
        data,
        resource_allocator,
        passenger_matching,
        success: false,
    }
}
