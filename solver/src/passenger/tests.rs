use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use model::household::Household;
use model::modes::Modes;
use solution::test_utilities::{
    chain, household, person, prepared_data, standard_modes, trip, vehicle_types, AUTO, PASSENGER,
};
use solution::{DriverRef, HouseholdData};
use time::{Time, TimeSpan};

use crate::allocator::HouseholdResourceAllocator;
use crate::mode_choice::assign_modes;

use super::PassengerMatchingAlgorithm;

/// Enumeration, vehicle allocation and mode assignment, as they have run by
/// the time passenger matching starts.
fn resolved(hh: &Household, modes: &Modes) -> (HouseholdData, HouseholdResourceAllocator) {
    let mut data = prepared_data(hh, modes);
    let mut allocator = HouseholdResourceAllocator::new(hh);
    allocator
        .resolve(hh, &mut data, &vehicle_types(), 0)
        .unwrap();
    assert!(assign_modes(hh, allocator.resolution(), &mut data));
    allocator.build_vehicle_availabilities(hh);
    (data, allocator)
}

/// A driving commuter: two auto legs, walking is hopeless.
fn driver_person(id: u32) -> model::household::Person {
    person(
        id,
        true,
        vec![chain(vec![
            trip(
                100,
                200,
                "7:00",
                "7:45",
                vec![true, true, false, false],
                vec![-50.0, -0.5, 0.0, 0.0],
            ),
            trip(
                200,
                100,
                "17:00",
                "17:45",
                vec![true, true, false, false],
                vec![-50.0, -0.5, 0.0, 0.0],
            ),
        ])],
    )
}

/// A walking trip that would much rather ride along (passenger V = 10).
fn passenger_trip(departure: &str, arrival: &str) -> model::household::Trip {
    trip(
        100,
        210,
        departure,
        arrival,
        vec![true, false, false, true],
        vec![-1.0, 0.0, 0.0, 10.0],
    )
}

#[test]
fn on_tour_driver_picks_up_a_walking_member() {
    // ARRANGE: one car, a driving commuter and a walker with a big gain
    let hh = household(
        1,
        100,
        vec![
            driver_person(1),
            person(2, false, vec![chain(vec![passenger_trip("7:10", "7:40")])]),
        ],
        1,
    );
    let modes = standard_modes();
    let (mut data, _) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    // ACT
    matching.generate_on_tour_trips(&hh, &data, &modes, &mut rng);
    let delta = matching.potential_trips[0].delta_utility;
    matching.resolve_passenger_trips(&hh, &mut data);

    // ASSERT
    assert_eq!(matching.potential_trips.len(), 1);
    let passenger_data = &data.person_data[1].trip_chain_data[0].trip_data[0];
    assert_eq!(passenger_data.mode, Some(PASSENGER));
    assert_eq!(
        passenger_data.driver,
        Some(DriverRef::OnTour(model::base_types::TripRef {
            person: 0,
            chain: 0,
            trip: 0,
        }))
    );
    // the gain is recorded on top of the utility the trip had before
    assert_eq!(passenger_data.v[PASSENGER], -1.0 + delta);
    // the driver keeps driving
    assert_eq!(
        data.person_data[0].trip_chain_data[0].trip_data[0].mode,
        Some(AUTO)
    );
}

#[test]
fn walking_tours_cannot_serve_as_drivers() {
    // the "driver" walks (no car in the household), so nothing can be found
    let hh = household(
        2,
        100,
        vec![
            person(
                1,
                true,
                vec![chain(vec![trip(
                    100,
                    200,
                    "7:00",
                    "7:45",
                    vec![true, false, false, false],
                    vec![-1.0, 0.0, 0.0, 0.0],
                )])],
            ),
            person(2, false, vec![chain(vec![passenger_trip("7:10", "7:40")])]),
        ],
        0,
    );
    let modes = standard_modes();
    let (data, _) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    matching.generate_on_tour_trips(&hh, &data, &modes, &mut rng);

    assert!(matching.potential_trips.is_empty());
}

#[test]
fn overlapping_passengers_cannot_book_the_same_driver_trip() {
    // two walkers want the same morning leg of the only driver
    let hh = household(
        3,
        100,
        vec![
            driver_person(1),
            person(2, false, vec![chain(vec![passenger_trip("7:10", "7:40")])]),
            person(3, false, vec![chain(vec![passenger_trip("7:05", "7:35")])]),
        ],
        1,
    );
    let modes = standard_modes();
    let (mut data, _) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    matching.generate_on_tour_trips(&hh, &data, &modes, &mut rng);
    assert_eq!(matching.potential_trips.len(), 2);
    let deltas: Vec<_> = matching
        .potential_trips
        .iter()
        .map(|t| (t.passenger.person, t.delta_utility))
        .collect();
    matching.resolve_passenger_trips(&hh, &mut data);

    // exactly the better of the two matches is taken
    let converted: Vec<usize> = [1, 2]
        .into_iter()
        .filter(|&p| {
            data.person_data[p].trip_chain_data[0].trip_data[0].mode == Some(PASSENGER)
        })
        .collect();
    assert_eq!(converted.len(), 1);
    let winner = deltas
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap()
        .0;
    assert_eq!(converted[0], winner);
}

#[test]
fn disjoint_passenger_trips_share_the_driver() {
    // one walker in the morning, one in the evening; both can be served
    let hh = household(
        4,
        100,
        vec![
            driver_person(1),
            person(2, false, vec![chain(vec![passenger_trip("7:10", "7:40")])]),
            person(3, false, vec![chain(vec![passenger_trip("17:10", "17:40")])]),
        ],
        1,
    );
    let modes = standard_modes();
    let (mut data, _) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    matching.generate_on_tour_trips(&hh, &data, &modes, &mut rng);
    matching.resolve_passenger_trips(&hh, &mut data);

    for p in [1, 2] {
        assert_eq!(
            data.person_data[p].trip_chain_data[0].trip_data[0].mode,
            Some(PASSENGER)
        );
    }
    // morning passenger rides the morning leg, evening passenger the evening leg
    assert_eq!(
        data.person_data[1].trip_chain_data[0].trip_data[0].driver,
        Some(DriverRef::OnTour(model::base_types::TripRef {
            person: 0,
            chain: 0,
            trip: 0,
        }))
    );
    assert_eq!(
        data.person_data[2].trip_chain_data[0].trip_data[0].driver,
        Some(DriverRef::OnTour(model::base_types::TripRef {
            person: 0,
            chain: 0,
            trip: 1,
        }))
    );
}

#[test]
fn a_driver_at_home_all_day_serves_a_walking_member() {
    // the licensed member stays home with the car
    let hh = household(
        5,
        100,
        vec![
            person(1, true, vec![]),
            person(2, false, vec![chain(vec![passenger_trip("9:00", "9:30")])]),
        ],
        1,
    );
    let modes = standard_modes();
    let (mut data, allocator) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    matching.generate_at_home_trips(&hh, &data, &modes, &allocator, &mut rng);
    matching.resolve_passenger_trips(&hh, &mut data);

    let passenger_data = &data.person_data[1].trip_chain_data[0].trip_data[0];
    assert_eq!(passenger_data.mode, Some(PASSENGER));
    assert_eq!(
        passenger_data.driver,
        Some(DriverRef::AtHome {
            person: 0,
            window: TimeSpan::whole_day(),
        })
    );
}

#[test]
fn at_home_driving_only_happens_while_a_vehicle_is_home() {
    // the driver tours with the car in the morning; the passenger travels
    // in the afternoon, when the car is back home
    let hh = household(
        6,
        100,
        vec![
            person(
                1,
                true,
                vec![chain(vec![
                    trip(
                        100,
                        200,
                        "8:00",
                        "8:30",
                        vec![true, true, false, false],
                        vec![-50.0, -0.5, 0.0, 0.0],
                    ),
                    trip(
                        200,
                        100,
                        "11:30",
                        "12:00",
                        vec![true, true, false, false],
                        vec![-50.0, -0.5, 0.0, 0.0],
                    ),
                ])],
            ),
            person(2, true, vec![]),
            person(3, false, vec![chain(vec![passenger_trip("14:00", "14:30")])]),
        ],
        1,
    );
    let modes = standard_modes();
    let (mut data, allocator) = resolved(&hh, &modes);
    let mut matching = PassengerMatchingAlgorithm::new(PASSENGER);
    let mut rng = XorShiftRng::seed_from_u64(42);

    matching.generate_at_home_trips(&hh, &data, &modes, &allocator, &mut rng);

    // every candidate window falls into a stretch with the car at home
    assert!(!matching.potential_trips.is_empty());
    for candidate in &matching.potential_trips {
        match candidate.driver {
            DriverRef::AtHome { window, .. } => {
                assert!(window.start() >= Time::new("12:00"));
            }
            DriverRef::OnTour(_) => panic!("at-home pass must not produce on-tour drivers"),
        }
    }
    matching.resolve_passenger_trips(&hh, &mut data);
    assert_eq!(
        data.person_data[2].trip_chain_data[0].trip_data[0].mode,
        Some(PASSENGER)
    );
}
