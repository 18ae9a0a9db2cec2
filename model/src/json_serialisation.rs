use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Time;

use crate::base_types::{HouseholdId, JointTourId, PersonId, Utility, ZoneId};
use crate::config::{Config, ConfigModeNames};
use crate::household::{Household, JointTour, Person, Purpose, Trip, TripChain};
use crate::modes::{Mode, Modes, TableMode, TablePassengerMode};
use crate::vehicles::{Vehicle, VehicleType};

type Integer = u32;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonVehicleType {
    name: String,
    requires_licence: bool,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonMode {
    name: String,
    requires_vehicle: Option<String>,
    variance_scale: f32,
    #[serde(default)]
    shared: bool,
    /// Present on the passenger mode: the driver-side mode it rides along.
    associated_mode: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonParameters {
    household_iterations: usize,
    random_seed: u64,
    max_trip_chain_size: usize,
    auto_mode_name: String,
    rideshare_mode_name: Option<String>,
    passenger_mode_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonTrip {
    origin: Integer,
    destination: Integer,
    purpose: String,
    start_time: String,
    activity_start_time: String,
    feasible: Vec<bool>,
    utility: Vec<Utility>,
    observed_mode: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonTripChain {
    joint_tour: Option<Integer>,
    #[serde(default)]
    representative: bool,
    trips: Vec<JsonTrip>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonPerson {
    id: Integer,
    licence: bool,
    trip_chains: Vec<JsonTripChain>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonHousehold {
    id: Integer,
    home_zone: Integer,
    vehicles: Vec<String>,
    persons: Vec<JsonPerson>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct JsonInput {
    parameters: JsonParameters,
    vehicle_types: Vec<JsonVehicleType>,
    modes: Vec<JsonMode>,
    households: Vec<JsonHousehold>,
}

pub struct ModeChoiceInstance {
    pub config: Arc<Config>,
    pub modes: Arc<Modes>,
    pub vehicle_types: Arc<Vec<VehicleType>>,
    pub households: Vec<Household>,
}

/// Reads a population instance. Malformed input panics with a message, as
/// an instance file that cannot be loaded is not recoverable.
pub fn load_population_from_json(input_data: serde_json::Value) -> ModeChoiceInstance {
    let json_input: JsonInput =
        serde_json::from_value(input_data).expect("Could not parse instance input.");

    let vehicle_types: Vec<VehicleType> = json_input
        .vehicle_types
        .iter()
        .map(|vt| VehicleType::new(vt.name.clone(), vt.requires_licence))
        .collect();
    let vehicle_type_index: HashMap<&str, usize> = json_input
        .vehicle_types
        .iter()
        .enumerate()
        .map(|(i, vt)| (vt.name.as_str(), i))
        .collect();

    let modes = build_modes(&json_input.modes, &vehicle_type_index);
    let number_of_modes = modes.len();

    let households = json_input
        .households
        .iter()
        .map(|hh| build_household(hh, &vehicle_type_index, &modes, number_of_modes))
        .collect();

    let parameters = &json_input.parameters;
    let config = Config {
        household_iterations: parameters.household_iterations,
        random_seed: parameters.random_seed,
        max_trip_chain_size: parameters.max_trip_chain_size,
        mode_names: ConfigModeNames {
            auto: parameters.auto_mode_name.clone(),
            rideshare: parameters.rideshare_mode_name.clone(),
            passenger: parameters.passenger_mode_name.clone(),
        },
    };

    ModeChoiceInstance {
        config: Arc::new(config),
        modes: Arc::new(modes),
        vehicle_types: Arc::new(vehicle_types),
        households,
    }
}

fn build_modes(json_modes: &[JsonMode], vehicle_type_index: &HashMap<&str, usize>) -> Modes {
    assert!(
        json_modes
            .windows(2)
            .all(|w| !(w[0].shared && !w[1].shared)),
        "Non-shared modes must precede shared modes."
    );
    let name_index: HashMap<&str, usize> = json_modes
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.as_str(), i))
        .collect();

    let mut non_shared: Vec<Box<dyn Mode>> = Vec::new();
    let mut shared: Vec<Box<dyn Mode>> = Vec::new();
    for (index, json_mode) in json_modes.iter().enumerate() {
        let requires_vehicle = json_mode.requires_vehicle.as_ref().map(|name| {
            *vehicle_type_index
                .get(name.as_str())
                .unwrap_or_else(|| panic!("Unknown vehicle type '{}'.", name))
        });
        let mode: Box<dyn Mode> = match &json_mode.associated_mode {
            Some(associated) => {
                let associated_index = *name_index
                    .get(associated.as_str())
                    .unwrap_or_else(|| panic!("Unknown associated mode '{}'.", associated));
                assert!(
                    json_mode.shared,
                    "The passenger mode '{}' must be a shared mode.",
                    json_mode.name
                );
                Box::new(TablePassengerMode::new(
                    index,
                    json_mode.name.clone(),
                    json_mode.variance_scale,
                    associated_index,
                ))
            }
            None => Box::new(TableMode::new(
                index,
                json_mode.name.clone(),
                requires_vehicle,
                json_mode.variance_scale,
            )),
        };
        if json_mode.shared {
            shared.push(mode);
        } else {
            non_shared.push(mode);
        }
    }
    Modes::new(non_shared, shared)
}

fn build_household(
    json_household: &JsonHousehold,
    vehicle_type_index: &HashMap<&str, usize>,
    modes: &Modes,
    number_of_modes: usize,
) -> Household {
    let vehicles = json_household
        .vehicles
        .iter()
        .map(|name| {
            Vehicle::new(
                *vehicle_type_index
                    .get(name.as_str())
                    .unwrap_or_else(|| panic!("Unknown vehicle type '{}'.", name)),
            )
        })
        .collect();

    let persons: Vec<Person> = json_household
        .persons
        .iter()
        .map(|p| {
            let trip_chains = p
                .trip_chains
                .iter()
                .map(|tc| build_trip_chain(tc, modes, number_of_modes))
                .collect();
            Person::new(PersonId::from(p.id), p.licence, trip_chains)
        })
        .collect();

    let household = Household::new(
        HouseholdId::from(json_household.id),
        ZoneId::from(json_household.home_zone),
        persons,
        vehicles,
    );
    check_joint_tours(&household);
    household
}

fn build_trip_chain(
    json_chain: &JsonTripChain,
    modes: &Modes,
    number_of_modes: usize,
) -> TripChain {
    let trips = json_chain
        .trips
        .iter()
        .map(|t| {
            assert!(
                t.feasible.len() == number_of_modes && t.utility.len() == number_of_modes,
                "Each trip must carry one feasibility flag and one utility per mode."
            );
            let observed_mode = t.observed_mode.as_ref().map(|name| {
                modes
                    .index_of(name)
                    .unwrap_or_else(|| panic!("Unknown observed mode '{}'.", name))
            });
            Trip::new(
                ZoneId::from(t.origin),
                ZoneId::from(t.destination),
                parse_purpose(&t.purpose),
                Time::new(&t.start_time),
                Time::new(&t.activity_start_time),
                t.feasible.clone(),
                t.utility.clone(),
                observed_mode,
            )
        })
        .collect();
    let joint_tour = json_chain.joint_tour.map(|id| JointTour {
        id: JointTourId::from(id),
        representative: json_chain.representative,
    });
    TripChain::new(trips, joint_tour)
}

fn parse_purpose(string: &str) -> Purpose {
    match string {
        "Home" => Purpose::Home,
        "Work" => Purpose::Work,
        "School" => Purpose::School,
        "Market" => Purpose::Market,
        "Other" => Purpose::Other,
        _ => panic!("Unknown trip purpose '{}'.", string),
    }
}

fn check_joint_tours(household: &Household) {
    for person in household.persons() {
        for chain in person.trip_chains() {
            if let Some(joint) = chain.joint_tour() {
                let representative = household
                    .joint_tour_representative(joint.id)
                    .unwrap_or_else(|| {
                        panic!("Joint tour {} has no representative.", joint.id)
                    });
                assert!(
                    household.trip_chain(representative).len() == chain.len(),
                    "All chains of joint tour {} must have the same number of trips.",
                    joint.id
                );
            }
        }
    }
}
