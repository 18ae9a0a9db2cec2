use model::base_types::{HouseholdId, JointTourId, ModeIdx, PersonId, Utility, ZoneId};
use model::household::{Household, JointTour, Person, Purpose, Trip, TripChain};
use model::modes::{Mode, Modes, TableMode, TablePassengerMode};
use model::vehicles::{Vehicle, VehicleType};
use time::Time;

use crate::HouseholdData;

pub const WALK: ModeIdx = 0;
pub const AUTO: ModeIdx = 1;
pub const RIDESHARE: ModeIdx = 2;
pub const PASSENGER: ModeIdx = 3;

/// Walk, Auto (occupies the single vehicle type) and the shared Rideshare
/// and Passenger modes; trips built for this set carry four table entries.
pub fn standard_modes() -> Modes {
    let non_shared: Vec<Box<dyn Mode>> = vec![
        Box::new(TableMode::new(WALK, String::from("Walk"), None, 1.0)),
        Box::new(TableMode::new(AUTO, String::from("Auto"), Some(0), 1.0)),
    ];
    let shared: Vec<Box<dyn Mode>> = vec![
        Box::new(TableMode::new(RIDESHARE, String::from("Rideshare"), None, 1.0)),
        Box::new(TablePassengerMode::new(
            PASSENGER,
            String::from("Passenger"),
            1.0,
            AUTO,
        )),
    ];
    Modes::new(non_shared, shared)
}

/// Two vehicle-free modes; no chain-level check ever rejects a combination.
pub fn two_walking_modes() -> Modes {
    let non_shared: Vec<Box<dyn Mode>> = vec![
        Box::new(TableMode::new(0, String::from("Walk"), None, 1.0)),
        Box::new(TableMode::new(1, String::from("Bike"), None, 1.0)),
    ];
    Modes::new(non_shared, Vec::new())
}

pub fn vehicle_types() -> Vec<VehicleType> {
    vec![VehicleType::new(String::from("Car"), true)]
}

pub fn trip(
    origin: u32,
    destination: u32,
    departure: &str,
    arrival: &str,
    feasible: Vec<bool>,
    utility: Vec<Utility>,
) -> Trip {
    Trip::new(
        ZoneId::from(origin),
        ZoneId::from(destination),
        Purpose::Other,
        Time::new(departure),
        Time::new(arrival),
        feasible,
        utility,
        None,
    )
}

pub fn chain(trips: Vec<Trip>) -> TripChain {
    TripChain::new(trips, None)
}

pub fn joint_chain(trips: Vec<Trip>, joint_tour: u32, representative: bool) -> TripChain {
    TripChain::new(
        trips,
        Some(JointTour {
            id: JointTourId::from(joint_tour),
            representative,
        }),
    )
}

pub fn person(id: u32, licence: bool, trip_chains: Vec<TripChain>) -> Person {
    Person::new(PersonId::from(id), licence, trip_chains)
}

pub fn household(id: u32, home_zone: u32, persons: Vec<Person>, cars: usize) -> Household {
    Household::new(
        HouseholdId::from(id),
        ZoneId::from(home_zone),
        persons,
        (0..cars).map(|_| Vehicle::new(0)).collect(),
    )
}

/// Household data with the enumeration pass and the per-category selection
/// already run for every chain, as the iteration driver would do before
/// vehicle allocation. Error terms stay zero.
pub fn prepared_data(household: &Household, modes: &Modes) -> HouseholdData {
    let number_of_categories = vehicle_types().len() + 1;
    let mut data = HouseholdData::new(household, modes.len(), number_of_categories);
    for (i, p) in household.persons().iter().enumerate() {
        for (j, tc) in p.trip_chains().iter().enumerate() {
            if tc.follows_representative() {
                continue;
            }
            let chain_data = &mut data.person_data[i].trip_chain_data[j];
            assert!(chain_data.pass1(tc, modes), "chain must be enumerable");
            chain_data.select_best_per_vehicle_type(modes);
        }
    }
    data
}
