#[cfg(test)]
mod tests;

use itertools::Itertools;
use log::debug;

use model::base_types::{TourRef, Utility};
use model::household::Household;
use model::vehicles::VehicleType;
use solution::HouseholdData;
use time::{Time, TimeSpan};

/// Tours that overlap in time while all wanting one of the household's
/// vehicles.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub tours: Vec<TourRef>,
}

/// A stretch of the day together with the number of household vehicles that
/// are parked at home during it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleAllocationWindow {
    pub span: TimeSpan,
    pub available_vehicles: usize,
}

/// Per person, per chain: the vehicle category granted to the chain (0 = no
/// vehicle, k > 0 = vehicle type k - 1). None for chains that have no
/// enumerated solution of their own.
pub type Resolution = Vec<Vec<Option<usize>>>;

/// Grants the household's vehicles to the tours that want them, never
/// exceeding the vehicle count at any instant, maximizing total utility.
/// Allocated once per household; the buffers are reused across iterations.
pub struct HouseholdResourceAllocator {
    /// The conflicts of the running household iteration.
    pub conflicts: Vec<Conflict>,
    /// How many vehicles are idle at home, over the day.
    pub vehicle_availability: Vec<VehicleAllocationWindow>,
    resolution: Resolution,
    best_conflict_utility: Utility,
    /// Per-person cursor into the time-ordered chain walk.
    scan: Vec<usize>,
}

impl HouseholdResourceAllocator {
    pub fn new(household: &Household) -> HouseholdResourceAllocator {
        HouseholdResourceAllocator {
            conflicts: Vec::new(),
            vehicle_availability: Vec::new(),
            resolution: household
                .persons()
                .iter()
                .map(|p| vec![Some(0); p.trip_chains().len()])
                .collect(),
            best_conflict_utility: Utility::NEG_INFINITY,
            scan: vec![0; household.persons().len()],
        }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Resolves the vehicle allocation of one household iteration. None
    /// means no valid allocation exists and the household fails.
    pub fn resolve(
        &mut self,
        household: &Household,
        household_data: &mut HouseholdData,
        vehicle_types: &[VehicleType],
        household_iteration: usize,
    ) -> Option<&Resolution> {
        if household.vehicles().is_empty() {
            return Some(&self.resolution);
        }
        if household_iteration > 0 {
            self.clear_data();
        }
        if vehicle_types.len() == 1 {
            if !self.process_single_vehicle_type(household, household_data, vehicle_types) {
                return None;
            }
        } else {
            unimplemented!("More than one vehicle type is not supported.");
        }
        Some(&self.resolution)
    }

    fn process_single_vehicle_type(
        &mut self,
        household: &Household,
        household_data: &mut HouseholdData,
        vehicle_types: &[VehicleType],
    ) -> bool {
        let number_of_vehicles = household.vehicles().len();
        let number_of_people = household.persons().len();

        // enough vehicles for everyone who could drive one
        if number_of_vehicles >= number_of_people
            || self.check_possible_users(household, vehicle_types)
        {
            self.assign_best_to_all(household_data);
            return true;
        }

        // enough vehicles at every moment of the day
        if self.check_possible_users_at_time_of_day(household, household_data) {
            self.assign_best_to_all(household_data);
            return true;
        }

        self.process_hard_single_vehicle_case(household, household_data)
    }

    /// Are there at least as many vehicles as persons able to use them?
    fn check_possible_users(&self, household: &Household, vehicle_types: &[VehicleType]) -> bool {
        let type_zero = &vehicle_types[0];
        let number_of_users = household
            .persons()
            .iter()
            .filter(|p| type_zero.can_use(p))
            .count();
        household.vehicles().len() >= number_of_users
    }

    /// Walks all chains in ascending start-time order, keeping the set of
    /// active vehicle-wanting tours. Whenever the set exceeds the vehicle
    /// count a conflict over the whole active set is recorded. True if the
    /// day has no conflict.
    fn check_possible_users_at_time_of_day(
        &mut self,
        household: &Household,
        household_data: &mut HouseholdData,
    ) -> bool {
        let number_of_vehicles = household.vehicles().len();
        self.conflicts.clear();
        self.scan.iter_mut().for_each(|position| *position = 0);
        let mut active_tours: Vec<TourRef> = Vec::with_capacity(number_of_vehicles);
        loop {
            let Some((next_person, next_time)) = self.next_chain_start(household) else {
                break;
            };
            active_tours.retain(|&tour| household.trip_chain(tour).end_time() > next_time);
            let tour = TourRef {
                person: next_person,
                chain: self.scan[next_person],
            };
            let chain = household.trip_chain(tour);
            // chains of joint tours are resolved by the representative only
            if !chain.follows_representative() {
                let chain_data = household_data.trip_chain_data(tour);
                // and they want a vehicle
                if chain_data.best_solution(1).is_some()
                    && chain_data.best_utility(1) >= chain_data.best_utility(0)
                {
                    household_data.trip_chain_data_mut(tour).assign(1);
                    active_tours.push(tour);
                    if active_tours.len() > number_of_vehicles {
                        self.conflicts.push(Conflict {
                            tours: active_tours.clone(),
                        });
                    }
                }
            }
            self.scan[next_person] += 1;
        }
        self.conflicts.is_empty()
    }

    /// The person whose next unscanned chain starts earliest.
    fn next_chain_start(&self, household: &Household) -> Option<(usize, Time)> {
        let mut next: Option<(usize, Time)> = None;
        for (person, position) in self.scan.iter().enumerate() {
            let chains = household.persons()[person].trip_chains();
            if *position < chains.len() {
                let start_time = chains[*position].start_time();
                if next.map(|(_, time)| start_time < time).unwrap_or(true) {
                    next = Some((person, start_time));
                }
            }
        }
        next
    }

    /// Exhaustively explores every vehicle/no-vehicle assignment over the
    /// tours implicated in a conflict and keeps the best valid one.
    fn process_hard_single_vehicle_case(
        &mut self,
        household: &Household,
        household_data: &mut HouseholdData,
    ) -> bool {
        let person_conflicts = self.unique_conflict_tours(household);
        let mut assign_resource: Vec<Vec<bool>> = person_conflicts
            .iter()
            .map(|tours| vec![false; tours.len()])
            .collect();
        let mut best_assignment = assign_resource.clone();
        self.best_conflict_utility = Utility::NEG_INFINITY;
        debug!(
            "household {}: resolving {} conflicts over {} tours",
            household.id(),
            self.conflicts.len(),
            person_conflicts.iter().map(|c| c.len()).sum::<usize>()
        );
        if self.recursive_explore(
            household_data,
            household.vehicles().len(),
            &mut assign_resource,
            &mut best_assignment,
            &person_conflicts,
            0,
            0,
        ) {
            self.assign_best(household_data, &person_conflicts, &best_assignment);
            true
        } else {
            false
        }
    }

    /// The distinct tours appearing in any conflict, grouped per person in
    /// first-seen order.
    fn unique_conflict_tours(&self, household: &Household) -> Vec<Vec<TourRef>> {
        let mut person_conflicts: Vec<Vec<TourRef>> =
            vec![Vec::new(); household.persons().len()];
        for &tour in self
            .conflicts
            .iter()
            .flat_map(|conflict| &conflict.tours)
            .unique()
        {
            person_conflicts[tour.person].push(tour);
        }
        person_conflicts
    }

    #[allow(clippy::too_many_arguments)]
    fn recursive_explore(
        &mut self,
        household_data: &HouseholdData,
        number_of_resource: usize,
        assign_resource: &mut Vec<Vec<bool>>,
        best_assignment: &mut Vec<Vec<bool>>,
        person_conflicts: &[Vec<TourRef>],
        person: usize,
        tour_index: usize,
    ) -> bool {
        if tour_index < assign_resource[person].len() {
            let mut any = false;
            assign_resource[person][tour_index] = false;
            if self.recursive_explore(
                household_data,
                number_of_resource,
                assign_resource,
                best_assignment,
                person_conflicts,
                person,
                tour_index + 1,
            ) {
                any = true;
            }
            assign_resource[person][tour_index] = true;
            if self.recursive_explore(
                household_data,
                number_of_resource,
                assign_resource,
                best_assignment,
                person_conflicts,
                person,
                tour_index + 1,
            ) {
                any = true;
            }
            return any;
        }
        if person + 1 == assign_resource.len() {
            if let Some(utility) =
                self.utility_of_valid_assignment(household_data, number_of_resource, assign_resource, person_conflicts)
            {
                if utility > self.best_conflict_utility {
                    self.best_conflict_utility = utility;
                    for (best_row, row) in best_assignment.iter_mut().zip(assign_resource.iter()) {
                        best_row.copy_from_slice(row);
                    }
                }
                return true;
            }
            return false;
        }
        self.recursive_explore(
            household_data,
            number_of_resource,
            assign_resource,
            best_assignment,
            person_conflicts,
            person + 1,
            0,
        )
    }

    /// The total utility of the assignment, or None if it exceeds the
    /// vehicle count in some conflict or leaves a tour without a solution.
    fn utility_of_valid_assignment(
        &self,
        household_data: &HouseholdData,
        number_of_resource: usize,
        assign_resource: &[Vec<bool>],
        person_conflicts: &[Vec<TourRef>],
    ) -> Option<Utility> {
        for conflict in &self.conflicts {
            let assigned_count = conflict
                .tours
                .iter()
                .filter(|tour| {
                    let index = person_conflicts[tour.person]
                        .iter()
                        .position(|t| t == *tour)
                        .unwrap();
                    assign_resource[tour.person][index]
                })
                .count();
            if assigned_count > number_of_resource {
                return None;
            }
        }
        let mut sum = 0.0;
        for (person, row) in assign_resource.iter().enumerate() {
            for (index, &uses_vehicle) in row.iter().enumerate() {
                let tour = person_conflicts[person][index];
                let category = if uses_vehicle { 1 } else { 0 };
                let chain_data = household_data.trip_chain_data(tour);
                chain_data.best_solution(category)?;
                sum += chain_data.best_utility(category);
            }
        }
        Some(sum)
    }

    /// Writes the resolution: conflicted tours get their explored category,
    /// everyone else the category of their overall best solution.
    fn assign_best(
        &mut self,
        household_data: &HouseholdData,
        person_conflicts: &[Vec<TourRef>],
        best_assignment: &[Vec<bool>],
    ) {
        for (person, person_data) in household_data.person_data.iter().enumerate() {
            for (chain, chain_data) in person_data.trip_chain_data.iter().enumerate() {
                let tour = TourRef { person, chain };
                let category = match person_conflicts[person].iter().position(|t| *t == tour) {
                    Some(index) => Some(if best_assignment[person][index] { 1 } else { 0 }),
                    None => best_overall_category(chain_data),
                };
                self.resolution[person][chain] = category;
            }
        }
    }

    /// Everybody gets the category of their overall best solution.
    fn assign_best_to_all(&mut self, household_data: &HouseholdData) {
        for (person, person_data) in household_data.person_data.iter().enumerate() {
            for (chain, chain_data) in person_data.trip_chain_data.iter().enumerate() {
                self.resolution[person][chain] = best_overall_category(chain_data);
            }
        }
    }

    fn clear_data(&mut self) {
        for row in self.resolution.iter_mut() {
            for entry in row.iter_mut() {
                *entry = Some(0);
            }
        }
    }

    /// The ordered list of windows describing how many vehicles sit unused
    /// at home, derived from the resolution of this iteration.
    pub fn build_vehicle_availabilities(&mut self, household: &Household) {
        let number_of_vehicles = household.vehicles().len();
        self.vehicle_availability.clear();
        if number_of_vehicles == 0 {
            return;
        }
        self.scan.iter_mut().for_each(|position| *position = 0);
        let mut active_tours: Vec<TourRef> = Vec::with_capacity(number_of_vehicles);
        let mut previous_allocation_time = Time::START_OF_DAY;
        loop {
            let Some((next_person, next_time)) = self.next_chain_start(household) else {
                break;
            };
            // close the windows of all tours returning before the next start
            while let Some((index, end_time)) =
                earliest_ending_tour(household, &active_tours, next_time)
            {
                self.vehicle_availability.push(VehicleAllocationWindow {
                    span: TimeSpan::new(previous_allocation_time, end_time),
                    available_vehicles: number_of_vehicles - active_tours.len(),
                });
                previous_allocation_time = end_time;
                active_tours.remove(index);
            }
            let tour = TourRef {
                person: next_person,
                chain: self.scan[next_person],
            };
            let chain = household.trip_chain(tour);
            if !chain.follows_representative() {
                // the chain was granted a vehicle
                if matches!(self.resolution[tour.person][tour.chain], Some(category) if category >= 1)
                {
                    let end_time = chain.start_time();
                    self.vehicle_availability.push(VehicleAllocationWindow {
                        span: TimeSpan::new(previous_allocation_time, end_time),
                        available_vehicles: number_of_vehicles - active_tours.len(),
                    });
                    previous_allocation_time = end_time;
                    active_tours.push(tour);
                }
            }
            self.scan[next_person] += 1;
        }
        while let Some((index, end_time)) =
            earliest_ending_tour(household, &active_tours, Time::END_OF_DAY)
        {
            self.vehicle_availability.push(VehicleAllocationWindow {
                span: TimeSpan::new(previous_allocation_time, end_time),
                available_vehicles: number_of_vehicles - active_tours.len(),
            });
            previous_allocation_time = end_time;
            active_tours.remove(index);
        }
        self.vehicle_availability.push(VehicleAllocationWindow {
            span: TimeSpan::new(previous_allocation_time, Time::END_OF_DAY),
            available_vehicles: number_of_vehicles, // no tour is active anymore
        });
    }
}

/// The best category of a chain over all its per-category solutions; ties
/// prefer the vehicle-requiring category.
fn best_overall_category(chain_data: &solution::TripChainData) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_u = Utility::NEG_INFINITY;
    for category in 0..chain_data.best_per_category.len() {
        if chain_data.best_solution(category).is_some() && chain_data.best_utility(category) >= best_u
        {
            best = Some(category);
            best_u = chain_data.best_utility(category);
        }
    }
    best
}

/// The active tour ending earliest, if it ends no later than `latest`.
fn earliest_ending_tour(
    household: &Household,
    active_tours: &[TourRef],
    latest: Time,
) -> Option<(usize, Time)> {
    let mut earliest: Option<(usize, Time)> = None;
    for (index, &tour) in active_tours.iter().enumerate() {
        let end_time = household.trip_chain(tour).end_time();
        if end_time <= earliest.map(|(_, time)| time).unwrap_or(latest) {
            earliest = Some((index, end_time));
        }
    }
    earliest
}
