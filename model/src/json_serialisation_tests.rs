use std::{fs::File, io::Read};

use time::Time;

use crate::base_types::{HouseholdId, PersonId, ZoneId};
use crate::household::Purpose;
use crate::json_serialisation::load_population_from_json;

//add a test that reads a json file
#[test]
fn test_load_from_json() {
    // ACT
    let mut file = File::open("resources/small_test_input.json").unwrap();
    let mut input_data = String::new();
    file.read_to_string(&mut input_data).unwrap();
    let input_data: serde_json::Value = serde_json::from_str(&input_data).unwrap();

    let instance = load_population_from_json(input_data);

    // ASSERT
    let config = &instance.config;
    assert_eq!(config.household_iterations, 3);
    assert_eq!(config.random_seed, 12345);
    assert_eq!(config.max_trip_chain_size, 10);
    assert_eq!(config.mode_names.auto, "Auto");
    assert_eq!(config.mode_names.rideshare.as_deref(), Some("Rideshare"));
    assert_eq!(config.mode_names.passenger.as_deref(), Some("Passenger"));

    let modes = &instance.modes;
    assert_eq!(modes.len(), 4);
    assert_eq!(modes.number_non_shared(), 2);
    assert_eq!(modes.index_of("Walk"), Some(0));
    assert_eq!(modes.index_of("Auto"), Some(1));
    assert_eq!(modes.index_of("Rideshare"), Some(2));
    assert_eq!(modes.index_of("Passenger"), Some(3));
    assert_eq!(modes.get(1).requires_vehicle(), Some(0));
    assert_eq!(modes.get(0).requires_vehicle(), None);
    let passenger = modes.get(3).as_passenger().unwrap();
    assert_eq!(passenger.associated_mode(), 1);
    assert_eq!(passenger.variance_scale(), 0.5);

    assert_eq!(instance.vehicle_types.len(), 1);
    assert_eq!(instance.vehicle_types[0].name(), "Car");

    assert_eq!(instance.households.len(), 2);
    let household = &instance.households[0];
    assert_eq!(household.id(), HouseholdId::from(7));
    assert_eq!(household.home_zone(), ZoneId::from(100));
    assert_eq!(household.vehicles().len(), 1);
    assert_eq!(household.persons().len(), 2);
    assert_eq!(household.number_of_licensed_drivers(), 2);
    assert_eq!(household.largest_trip_chain_size(), 2);

    let worker = &household.persons()[0];
    assert_eq!(worker.id(), PersonId::from(1));
    assert!(worker.licence());
    let chain = &worker.trip_chains()[0];
    assert!(!chain.is_joint());
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.start_time(), Time::new("7:00"));
    assert_eq!(chain.end_time(), Time::new("17:45"));

    let first_trip = &chain.trips()[0];
    assert_eq!(first_trip.origin(), ZoneId::from(100));
    assert_eq!(first_trip.destination(), ZoneId::from(205));
    assert_eq!(first_trip.purpose(), Purpose::Work);
    assert_eq!(first_trip.start_time(), Time::new("7:00"));
    assert_eq!(first_trip.activity_start(), Time::new("7:45"));
    assert_eq!(first_trip.mode_feasible(), &[true, true, false, true]);
    assert_eq!(first_trip.mode_utility(), &[-2.5, -0.5, 0.0, -0.8]);
    assert_eq!(first_trip.observed_mode(), Some(1));

    let carless = &instance.households[1];
    assert_eq!(carless.vehicles().len(), 0);
    assert_eq!(carless.number_of_licensed_drivers(), 0);
    assert_eq!(
        carless.persons()[0].trip_chains()[0].trips()[0].observed_mode(),
        Some(0)
    );
}
