use model::base_types::{TourRef, Utility};
use solution::test_utilities::{
    chain, household, person, prepared_data, standard_modes, trip, vehicle_types,
};
use time::{Time, TimeSpan};

use super::{HouseholdResourceAllocator, VehicleAllocationWindow};

/// One single-trip tour with the given walk and auto utilities.
fn tour(departure: &str, arrival: &str, walk_u: Utility, auto_u: Utility) -> model::household::TripChain {
    chain(vec![trip(
        100,
        200,
        departure,
        arrival,
        vec![true, true, false, false],
        vec![walk_u, auto_u, 0.0, 0.0],
    )])
}

#[test]
fn overlapping_tours_conflict_and_the_better_one_wins_the_vehicle() {
    // ARRANGE: one vehicle, two overlapping tours, both prefer the car
    let hh = household(
        1,
        100,
        vec![
            person(1, true, vec![tour("7:00", "9:00", -3.0, -0.5)]),
            person(2, true, vec![tour("8:00", "10:00", -1.0, -0.7)]),
        ],
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    // ACT
    let resolution = allocator
        .resolve(&hh, &mut data, &vehicle_types(), 0)
        .unwrap()
        .clone();

    // ASSERT: person 1 loses less by walking, so person 0 gets the car
    assert_eq!(resolution[0][0], Some(1));
    assert_eq!(resolution[1][0], Some(0));
    assert_eq!(allocator.conflicts.len(), 1);
    let conflict = &allocator.conflicts[0];
    assert!(conflict.tours.contains(&TourRef { person: 0, chain: 0 }));
    assert!(conflict.tours.contains(&TourRef { person: 1, chain: 0 }));
}

#[test]
fn enough_vehicles_for_everyone_needs_no_search() {
    let hh = household(
        2,
        100,
        vec![
            person(1, true, vec![tour("7:00", "9:00", -3.0, -0.5)]),
            person(2, true, vec![tour("8:00", "10:00", -1.0, -0.7)]),
        ],
        2,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    let resolution = allocator
        .resolve(&hh, &mut data, &vehicle_types(), 0)
        .unwrap()
        .clone();

    assert_eq!(resolution[0][0], Some(1));
    assert_eq!(resolution[1][0], Some(1));
    assert!(allocator.conflicts.is_empty());
}

#[test]
fn disjoint_tours_share_one_vehicle_without_conflict() {
    let hh = household(
        3,
        100,
        vec![
            person(1, true, vec![tour("7:00", "9:00", -3.0, -0.5)]),
            person(2, true, vec![tour("10:00", "12:00", -1.0, -0.7)]),
            person(3, false, vec![]),
        ],
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    let resolution = allocator
        .resolve(&hh, &mut data, &vehicle_types(), 0)
        .unwrap()
        .clone();

    assert_eq!(resolution[0][0], Some(1));
    assert_eq!(resolution[1][0], Some(1));
    assert!(allocator.conflicts.is_empty());
}

#[test]
fn no_vehicles_means_category_zero_for_everyone() {
    let hh = household(
        4,
        100,
        vec![person(1, true, vec![tour("7:00", "9:00", -3.0, f32::NEG_INFINITY)])],
        0,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    let resolution = allocator
        .resolve(&hh, &mut data, &vehicle_types(), 0)
        .unwrap();

    assert_eq!(resolution[0][0], Some(0));
}

#[test]
fn exhaustive_resolution_matches_brute_force_on_three_tours() {
    // three pairwise-overlapping tours, one vehicle
    let tours = [
        ("7:00", "10:00", -2.0, -0.2),
        ("8:00", "11:00", -1.5, -0.4),
        ("9:00", "12:00", -3.0, -1.0),
    ];
    let hh = household(
        5,
        100,
        tours
            .iter()
            .enumerate()
            .map(|(i, &(dep, arr, w, a))| {
                person(i as u32 + 1, true, vec![tour(dep, arr, w, a)])
            })
            .collect(),
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    let resolution = allocator
        .resolve(&hh, &mut data, &vehicle_types(), 0)
        .unwrap()
        .clone();

    // at every instant at most one tour drives
    let granted: Vec<usize> = (0..3).filter(|&i| resolution[i][0] == Some(1)).collect();
    for (index, &i) in granted.iter().enumerate() {
        for &j in granted.iter().skip(index + 1) {
            let span_i = hh.persons()[i].trip_chains()[0].span();
            let span_j = hh.persons()[j].trip_chains()[0].span();
            assert!(
                !span_i.overlaps(&span_j),
                "tours {} and {} both drive while overlapping",
                i,
                j
            );
        }
    }

    // and the chosen assignment is utility-maximal among all valid ones
    let chosen_utility: Utility = (0..3)
        .map(|i| data.person_data[i].trip_chain_data[0].best_utility(resolution[i][0].unwrap()))
        .sum();
    let mut best = Utility::NEG_INFINITY;
    for mask in 0..8u32 {
        let uses: Vec<bool> = (0..3).map(|i| mask & (1 << i) != 0).collect();
        if uses.iter().filter(|&&u| u).count() > 1 {
            continue; // all three tours overlap pairwise, one vehicle
        }
        let utility: Utility = (0..3)
            .map(|i| {
                data.person_data[i].trip_chain_data[0].best_utility(if uses[i] { 1 } else { 0 })
            })
            .sum();
        best = best.max(utility);
    }
    assert_eq!(chosen_utility, best);
}

#[test]
#[should_panic(expected = "More than one vehicle type")]
fn multiple_vehicle_types_are_not_implemented() {
    let hh = household(
        6,
        100,
        vec![person(1, true, vec![tour("7:00", "9:00", -3.0, -0.5)])],
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);

    let mut types = vehicle_types();
    types.push(model::vehicles::VehicleType::new(String::from("Van"), true));
    let _ = allocator.resolve(&hh, &mut data, &types, 0);
}

#[test]
fn vehicle_availability_reflects_the_granted_tours() {
    let hh = household(
        7,
        100,
        vec![
            person(1, true, vec![tour("8:00", "12:00", -3.0, -0.5)]),
            person(2, false, vec![]),
        ],
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);
    allocator.resolve(&hh, &mut data, &vehicle_types(), 0).unwrap();

    allocator.build_vehicle_availabilities(&hh);

    assert_eq!(
        allocator.vehicle_availability,
        vec![
            VehicleAllocationWindow {
                span: TimeSpan::new(Time::START_OF_DAY, Time::new("8:00")),
                available_vehicles: 1,
            },
            VehicleAllocationWindow {
                span: TimeSpan::new(Time::new("8:00"), Time::new("12:00")),
                available_vehicles: 0,
            },
            VehicleAllocationWindow {
                span: TimeSpan::new(Time::new("12:00"), Time::END_OF_DAY),
                available_vehicles: 1,
            },
        ]
    );
}

#[test]
fn walking_tours_leave_the_vehicle_at_home_all_day() {
    let hh = household(
        8,
        100,
        vec![person(1, true, vec![tour("8:00", "12:00", -0.1, -5.0)])],
        1,
    );
    let modes = standard_modes();
    let mut data = prepared_data(&hh, &modes);
    let mut allocator = HouseholdResourceAllocator::new(&hh);
    allocator.resolve(&hh, &mut data, &vehicle_types(), 0).unwrap();

    allocator.build_vehicle_availabilities(&hh);

    assert_eq!(
        allocator.vehicle_availability,
        vec![VehicleAllocationWindow {
            span: TimeSpan::whole_day(),
            available_vehicles: 1,
        }]
    );
}
