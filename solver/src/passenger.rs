#[cfg(test)]
mod tests;

use itertools::Itertools;
use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;

use model::base_types::{ModeIdx, TourRef, TripRef, Utility};
use model::household::{Household, Trip};
use model::modes::{Modes, PassengerMode};
use solution::{DriverRef, HouseholdData};
use time::{Time, TimeSpan};

use crate::allocator::HouseholdResourceAllocator;

/// A feasible (driver trip, passenger trip) pairing and the utility the
/// household gains by it.
#[derive(Debug, Clone, Copy)]
pub struct PotentialPassengerTrip {
    pub driver: DriverRef,
    pub passenger: TripRef,
    pub delta_utility: Utility,
    driver_trip_start: Time,
    passenger_activity_start: Time,
}

impl PotentialPassengerTrip {
    pub fn driver_person(&self) -> usize {
        match self.driver {
            DriverRef::OnTour(trip) => trip.person,
            DriverRef::AtHome { person, .. } => person,
        }
    }

    /// The stretch of the day this match books the driver for, from picking
    /// the passenger up to dropping them at their activity.
    fn booking_span(&self) -> Option<TimeSpan> {
        if self.driver_trip_start < self.passenger_activity_start {
            Some(TimeSpan::new(
                self.driver_trip_start,
                self.passenger_activity_start,
            ))
        } else {
            None
        }
    }

    fn double_books_with(&self, other: &PotentialPassengerTrip) -> bool {
        match (self.booking_span(), other.booking_span()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }
}

/// Finds passenger/driver pairings that improve the household's utility and
/// resolves them so that no driver is booked twice at the same time.
pub struct PassengerMatchingAlgorithm {
    pub potential_trips: Vec<PotentialPassengerTrip>,
    passenger_mode: ModeIdx,
}

impl PassengerMatchingAlgorithm {
    pub fn new(passenger_mode: ModeIdx) -> PassengerMatchingAlgorithm {
        PassengerMatchingAlgorithm {
            potential_trips: Vec::new(),
            passenger_mode,
        }
    }

    /// Candidates in which another member's vehicle tour picks the passenger
    /// up along the way.
    pub fn generate_on_tour_trips(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        rng: &mut impl Rng,
    ) {
        self.potential_trips.clear();
        self.for_each_potential_passenger_chain(household, household_data, modes, |algo, i, j| {
            algo.find_potential_on_tour_drivers(household, household_data, modes, i, j, rng);
        });
    }

    /// Candidates in which a member idling at home makes a drop-off-only
    /// tour for the passenger, within the windows a vehicle sits at home.
    pub fn generate_at_home_trips(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        resource_allocator: &HouseholdResourceAllocator,
        rng: &mut impl Rng,
    ) {
        self.potential_trips.clear();
        self.for_each_potential_passenger_chain(household, household_data, modes, |algo, i, j| {
            algo.find_potential_at_home_drivers(
                household,
                household_data,
                modes,
                resource_allocator,
                i,
                j,
                rng,
            );
        });
    }

    /// Runs `find` for every chain that could become a passenger: solo or
    /// representative, currently travelling without a vehicle.
    fn for_each_potential_passenger_chain(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        mut find: impl FnMut(&mut Self, usize, usize),
    ) {
        for (i, person) in household.persons().iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if chain.follows_representative() {
                    continue;
                }
                let tour = TourRef {
                    person: i,
                    chain: j,
                };
                let first_trip_mode =
                    household_data.trip_chain_data(tour).trip_data[0].assigned_mode();
                if modes.get(first_trip_mode).requires_vehicle().is_none() {
                    find(&mut *self, i, j);
                }
            }
        }
    }

    fn find_potential_on_tour_drivers(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        passenger_number: usize,
        passenger_chain_index: usize,
        rng: &mut impl Rng,
    ) {
        for (i, person) in household.persons().iter().enumerate() {
            // you can't passenger yourself
            if i == passenger_number {
                continue;
            }
            for (j, driver_chain) in person.trip_chains().iter().enumerate() {
                if driver_chain.follows_representative() {
                    continue;
                }
                let tour = TourRef {
                    person: i,
                    chain: j,
                };
                let first_trip_mode =
                    household_data.trip_chain_data(tour).trip_data[0].assigned_mode();
                // the driver's tour has to bring a vehicle along
                if modes.get(first_trip_mode).requires_vehicle().is_some() {
                    self.check_for_potential_passenger_trips(
                        household,
                        household_data,
                        modes,
                        tour,
                        passenger_number,
                        passenger_chain_index,
                        rng,
                    );
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_for_potential_passenger_trips(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        driver_tour: TourRef,
        passenger_number: usize,
        passenger_chain_index: usize,
        rng: &mut impl Rng,
    ) {
        let passenger_mode = self.passenger_mode_of(modes);
        let driver_trips = household.trip_chain(driver_tour).trips();
        let passenger_trips = household.persons()[passenger_number].trip_chains()
            [passenger_chain_index]
            .trips();
        for (j, passenger_trip) in passenger_trips.iter().enumerate() {
            let mut passenger_epsilon = Utility::NEG_INFINITY;
            for (i, driver_trip) in driver_trips.iter().enumerate() {
                let driver_ref = TripRef {
                    person: driver_tour.person,
                    chain: driver_tour.chain,
                    trip: i,
                };
                if household_data.trip_data(driver_ref).assigned_mode()
                    != passenger_mode.associated_mode()
                {
                    continue;
                }
                let Some(v) = passenger_mode.calculate_v(driver_trip, passenger_trip) else {
                    continue;
                };
                // only draw the passenger's error term when it is needed
                if passenger_epsilon == Utility::NEG_INFINITY {
                    passenger_epsilon = self.generate_epsilon(modes, rng);
                }
                let passenger_ref = TripRef {
                    person: passenger_number,
                    chain: passenger_chain_index,
                    trip: j,
                };
                // the match must improve on what both parties have today
                let delta_utility = v + passenger_epsilon + self.generate_epsilon(modes, rng)
                    - utility_of_trips(household_data, passenger_ref, Some(driver_ref));
                if delta_utility > 0.0 {
                    self.potential_trips.push(PotentialPassengerTrip {
                        driver: DriverRef::OnTour(driver_ref),
                        passenger: passenger_ref,
                        delta_utility,
                        driver_trip_start: driver_trip.start_time(),
                        passenger_activity_start: passenger_trip.activity_start(),
                    });
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn find_potential_at_home_drivers(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        resource_allocator: &HouseholdResourceAllocator,
        passenger_number: usize,
        passenger_chain_index: usize,
        rng: &mut impl Rng,
    ) {
        for (i, person) in household.persons().iter().enumerate() {
            // you can't passenger yourself
            if i == passenger_number {
                continue;
            }
            // the person at home must be able to drive
            if !person.licence() {
                continue;
            }
            let chains = person.trip_chains();
            if chains.is_empty() {
                // home all day
                self.check_for_car_at_home(
                    household,
                    household_data,
                    modes,
                    resource_allocator,
                    TimeSpan::whole_day(),
                    i,
                    passenger_number,
                    passenger_chain_index,
                    rng,
                );
                continue;
            }
            for (j, driver_chain) in chains.iter().enumerate() {
                if driver_chain.follows_representative() {
                    continue;
                }
                if j + 1 >= chains.len() {
                    // home again after the last tour of the day
                    let start = driver_chain.trips().last().unwrap().activity_start();
                    if start < Time::END_OF_DAY {
                        self.check_for_car_at_home(
                            household,
                            household_data,
                            modes,
                            resource_allocator,
                            TimeSpan::new(start, Time::END_OF_DAY),
                            i,
                            passenger_number,
                            passenger_chain_index,
                            rng,
                        );
                    }
                } else {
                    if j == 0 {
                        // home before leaving for the first tour
                        let end = driver_chain.trips()[0].start_time();
                        if Time::START_OF_DAY < end {
                            self.check_for_car_at_home(
                                household,
                                household_data,
                                modes,
                                resource_allocator,
                                TimeSpan::new(Time::START_OF_DAY, end),
                                i,
                                passenger_number,
                                passenger_chain_index,
                                rng,
                            );
                        }
                    }
                    // home between this tour and the next one
                    let start = driver_chain.trips().last().unwrap().activity_start();
                    let end = chains[j + 1].trips()[0].start_time();
                    if start < end {
                        self.check_for_car_at_home(
                            household,
                            household_data,
                            modes,
                            resource_allocator,
                            TimeSpan::new(start, end),
                            i,
                            passenger_number,
                            passenger_chain_index,
                            rng,
                        );
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_for_car_at_home(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        resource_allocator: &HouseholdResourceAllocator,
        window: TimeSpan,
        driver_person: usize,
        passenger_number: usize,
        passenger_chain_index: usize,
        rng: &mut impl Rng,
    ) {
        if household.vehicles().is_empty() {
            return;
        }
        if household.vehicles().len() >= household.number_of_licensed_drivers() {
            // there is always a car at home while a driver is home
            self.check_for_pure_passenger_trips(
                household,
                household_data,
                modes,
                window,
                driver_person,
                passenger_number,
                passenger_chain_index,
                rng,
            );
        } else {
            let windows: Vec<TimeSpan> = resource_allocator
                .vehicle_availability
                .iter()
                .filter(|slot| slot.available_vehicles > 0)
                .filter_map(|slot| window.intersect(&slot.span))
                .collect();
            for intersection in windows {
                self.check_for_pure_passenger_trips(
                    household,
                    household_data,
                    modes,
                    intersection,
                    driver_person,
                    passenger_number,
                    passenger_chain_index,
                    rng,
                );
            }
        }
    }

    /// Evaluates a virtual drop-off-only driver tour at the home zone over
    /// the window against every trip of the passenger's chain.
    #[allow(clippy::too_many_arguments)]
    fn check_for_pure_passenger_trips(
        &mut self,
        household: &Household,
        household_data: &HouseholdData,
        modes: &Modes,
        window: TimeSpan,
        driver_person: usize,
        passenger_number: usize,
        passenger_chain_index: usize,
        rng: &mut impl Rng,
    ) {
        let passenger_mode = self.passenger_mode_of(modes);
        let driver_trip = Trip::drop_off_only(household.home_zone(), window, modes.len());
        let passenger_trips = household.persons()[passenger_number].trip_chains()
            [passenger_chain_index]
            .trips();
        for (j, passenger_trip) in passenger_trips.iter().enumerate() {
            let passenger_ref = TripRef {
                person: passenger_number,
                chain: passenger_chain_index,
                trip: j,
            };
            let assigned = household_data.trip_data(passenger_ref).assigned_mode();
            if modes.get(assigned).requires_vehicle().is_some() {
                continue;
            }
            let Some(v) = passenger_mode.calculate_v(&driver_trip, passenger_trip) else {
                continue;
            };
            let passenger_epsilon = self.generate_epsilon(modes, rng);
            let delta_utility = v + passenger_epsilon + self.generate_epsilon(modes, rng)
                - utility_of_trips(household_data, passenger_ref, None);
            if delta_utility > 0.0 {
                self.potential_trips.push(PotentialPassengerTrip {
                    driver: DriverRef::AtHome {
                        person: driver_person,
                        window,
                    },
                    passenger: passenger_ref,
                    delta_utility,
                    driver_trip_start: window.start(),
                    passenger_activity_start: passenger_trip.activity_start(),
                });
            }
        }
    }

    /// Applies the candidates: zero or one are taken directly, several go
    /// through conflict resolution so that no driver is double-booked.
    pub fn resolve_passenger_trips(
        &mut self,
        household: &Household,
        household_data: &mut HouseholdData,
    ) {
        match self.potential_trips.len() {
            0 => {}
            1 => {
                let candidate = self.potential_trips[0];
                self.apply_candidate(household_data, &candidate);
            }
            _ => self.hard_case(household, household_data),
        }
    }

    fn apply_candidate(
        &self,
        household_data: &mut HouseholdData,
        candidate: &PotentialPassengerTrip,
    ) {
        let passenger_mode = self.passenger_mode;
        let data = household_data.trip_data_mut(candidate.passenger);
        let other_mode = data.assigned_mode();
        // the gain is recorded on top of the utility the trip had before
        let other_utility = data.utility_of(other_mode);
        data.v[passenger_mode] = other_utility + candidate.delta_utility;
        data.mode = Some(passenger_mode);
        data.driver = Some(candidate.driver);
    }

    fn hard_case(&mut self, household: &Household, household_data: &mut HouseholdData) {
        let unique_passenger_trips = self.unique_passenger_trips();
        let number_of_drivers = household.persons().len();
        let mut feasible: Vec<Vec<Option<PotentialPassengerTrip>>> =
            vec![vec![None; number_of_drivers]; unique_passenger_trips.len()];
        for candidate in &self.potential_trips {
            let row = unique_passenger_trips
                .iter()
                .position(|trip| *trip == candidate.passenger)
                .unwrap();
            feasible[row][candidate.driver_person()] = Some(*candidate);
        }
        let mut best_assignment: Vec<Option<usize>> = vec![None; unique_passenger_trips.len()];
        solve(&feasible, &mut best_assignment);
        debug!(
            "{} passenger candidates over {} trips resolved",
            self.potential_trips.len(),
            unique_passenger_trips.len()
        );
        for (row, assignment) in best_assignment.iter().enumerate() {
            if let Some(driver) = assignment {
                let candidate = feasible[row][*driver].unwrap();
                self.apply_candidate(household_data, &candidate);
            }
        }
    }

    fn unique_passenger_trips(&self) -> Vec<TripRef> {
        self.potential_trips
            .iter()
            .map(|candidate| candidate.passenger)
            .unique()
            .collect()
    }

    fn passenger_mode_of<'a>(&self, modes: &'a Modes) -> &'a dyn PassengerMode {
        modes
            .get(self.passenger_mode)
            .as_passenger()
            .expect("The configured passenger mode has no passenger capability.")
    }

    fn generate_epsilon(&self, modes: &Modes, rng: &mut impl Rng) -> Utility {
        let draw: f64 = rng.sample(StandardNormal);
        draw as f32 * modes.get(self.passenger_mode).variance_scale()
    }
}

/// The utility the two parties currently get out of the trips a candidate
/// would change.
fn utility_of_trips(
    household_data: &HouseholdData,
    passenger: TripRef,
    driver: Option<TripRef>,
) -> Utility {
    let mut total = 0.0;
    if let Some(driver_ref) = driver {
        let data = household_data.trip_data(driver_ref);
        total += data.utility_of(data.assigned_mode());
    }
    let data = household_data.trip_data(passenger);
    total += data.utility_of(data.assigned_mode());
    total
}

/// Table of conflict groups: cell (row, driver) gets a nonzero group id
/// shared with every other candidate of the same driver it overlaps with.
fn conflict_table(feasible: &[Vec<Option<PotentialPassengerTrip>>]) -> Vec<Vec<usize>> {
    let number_of_rows = feasible.len();
    let number_of_drivers = feasible.first().map(|row| row.len()).unwrap_or(0);
    let mut table = vec![vec![0; number_of_drivers]; number_of_rows];
    let mut next_group = 1;
    for driver in 0..number_of_drivers {
        for j in 0..number_of_rows {
            let Some(upper) = feasible[j][driver] else {
                continue;
            };
            for k in j + 1..number_of_rows {
                let Some(lower) = feasible[k][driver] else {
                    continue;
                };
                if upper.double_books_with(&lower) {
                    if table[j][driver] == 0 {
                        table[j][driver] = next_group;
                        table[k][driver] = next_group;
                        next_group += 1;
                    } else {
                        table[k][driver] = table[j][driver];
                    }
                }
            }
        }
    }
    table
}

/// Picks the best driver directly for every row whose best candidate cannot
/// collide with anything; the rest is left to the backtracking search.
fn solve_simple_cases(
    feasible: &[Vec<Option<PotentialPassengerTrip>>],
    conflicts: &[Vec<usize>],
    current_assignment: &mut [Option<usize>],
    best_assignment: &mut [Option<usize>],
) -> Vec<bool> {
    let mut solved = vec![false; current_assignment.len()];
    for (row, cells) in feasible.iter().enumerate() {
        let mut max_index = None;
        let mut best_utility = Utility::NEG_INFINITY;
        for (driver, cell) in cells.iter().enumerate() {
            if let Some(candidate) = cell {
                if candidate.delta_utility > best_utility {
                    best_utility = candidate.delta_utility;
                    max_index = Some(driver);
                }
            }
        }
        if let Some(driver) = max_index {
            if conflicts[row][driver] == 0 {
                current_assignment[row] = Some(driver);
                best_assignment[row] = Some(driver);
                solved[row] = true;
            }
        }
    }
    solved
}

/// Backtracking over the unsolved rows, maximizing the summed delta utility
/// subject to no driver being double-booked. A row may stay unassigned.
fn solve(feasible: &[Vec<Option<PotentialPassengerTrip>>], best_assignment: &mut [Option<usize>]) {
    let conflicts = conflict_table(feasible);
    let mut current_assignment: Vec<Option<usize>> = vec![None; best_assignment.len()];
    let solved = solve_simple_cases(feasible, &conflicts, &mut current_assignment, best_assignment);
    let mut best_utility = Utility::NEG_INFINITY;
    explore(
        feasible,
        &conflicts,
        &solved,
        &mut current_assignment,
        best_assignment,
        &mut best_utility,
        0.0,
        0,
    );
}

#[allow(clippy::too_many_arguments)]
fn explore(
    feasible: &[Vec<Option<PotentialPassengerTrip>>],
    conflicts: &[Vec<usize>],
    solved: &[bool],
    current_assignment: &mut [Option<usize>],
    best_assignment: &mut [Option<usize>],
    best_utility: &mut Utility,
    current_utility: Utility,
    row: usize,
) {
    let mut row = row;
    while row < feasible.len() && solved[row] {
        row += 1;
    }
    if row >= feasible.len() {
        if current_utility > *best_utility {
            *best_utility = current_utility;
            best_assignment.copy_from_slice(current_assignment);
        }
        return;
    }
    // leaving the trip unmatched is always an option
    current_assignment[row] = None;
    explore(
        feasible,
        conflicts,
        solved,
        current_assignment,
        best_assignment,
        best_utility,
        current_utility,
        row + 1,
    );
    for driver in 0..feasible[row].len() {
        let Some(candidate) = feasible[row][driver] else {
            continue;
        };
        current_assignment[row] = Some(driver);
        if is_driver_free(conflicts, current_assignment, row) {
            explore(
                feasible,
                conflicts,
                solved,
                current_assignment,
                best_assignment,
                best_utility,
                current_utility + candidate.delta_utility,
                row + 1,
            );
        }
    }
    current_assignment[row] = None;
}

/// No earlier row may already book the same driver in the same conflict
/// group. Directly assigned rows cannot collide (their group is 0).
fn is_driver_free(
    conflicts: &[Vec<usize>],
    current_assignment: &[Option<usize>],
    row: usize,
) -> bool {
    let Some(driver) = current_assignment[row] else {
        return true;
    };
    let group = conflicts[row][driver];
    if group == 0 {
        return true;
    }
    for other_row in (0..row).rev() {
        if let Some(other_driver) = current_assignment[other_row] {
            if conflicts[other_row][other_driver] == group {
                return false;
            }
        }
    }
    true
}
