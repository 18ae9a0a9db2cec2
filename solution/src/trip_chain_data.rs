
use model::base_types::{ModeIdx, Utility};
use model::household::TripChain;
use model::modes::Modes;

use crate::possible_solution::PossibleTripChainSolution;
use crate::trip_data::TripData;

/// Working state of one trip chain: the per-trip mode data, every feasible
/// mode combination found by enumeration, and the best combination per
/// vehicle category of the running household iteration.
pub struct TripChainData {
    pub trip_data: Vec<TripData>,
    pub possible_assignments: Vec<PossibleTripChainSolution>,
    /// Entry 0 is the best solution needing no vehicle, entry k > 0 the best
    /// needing vehicle type k - 1. Indices into `possible_assignments`.
    pub best_per_category: Vec<Option<usize>>,
}

impl TripChainData {
    pub fn new(
        chain: &TripChain,
        number_of_modes: usize,
        number_of_categories: usize,
    ) -> TripChainData {
        TripChainData {
            trip_data: (0..chain.len()).map(|_| TripData::new(number_of_modes)).collect(),
            possible_assignments: Vec::new(),
            best_per_category: vec![None; number_of_categories],
        }
    }

    /// Queries feasibility and V of every non-shared mode for every trip and
    /// enumerates all feasible mode combinations of the chain. False if some
    /// trip has no feasible mode or no combination survives the chain-level
    /// checks; the household cannot be resolved then.
    pub fn pass1(&mut self, chain: &TripChain, modes: &Modes) -> bool {
        for (trip, data) in chain.trips().iter().zip(self.trip_data.iter_mut()) {
            let mut any_mode_feasible = false;
            for (j, mode) in modes.non_shared() {
                if mode.feasible(trip) {
                    let value = mode.utility(trip);
                    if value.is_finite() {
                        data.feasible[j] = true;
                        data.v[j] = value;
                        any_mode_feasible = true;
                    } else {
                        data.feasible[j] = false;
                        data.v[j] = Utility::NEG_INFINITY;
                    }
                } else {
                    data.feasible[j] = false;
                    data.v[j] = Utility::NEG_INFINITY;
                }
            }
            if !any_mode_feasible {
                return false;
            }
        }
        self.compute_possible_assignments(chain, modes);
        !self.possible_assignments.is_empty()
    }

    /// Depth-first enumeration over trip positions. At the last position the
    /// full combination is validated by every mode's chain-level check and by
    /// the tour-dependent modes' utility callbacks (which may reject), then
    /// scored and stored.
    fn compute_possible_assignments(&mut self, chain: &TripChain, modes: &Modes) {
        self.possible_assignments.clear();
        let number_of_modes = modes.number_non_shared();
        let top_level = self.trip_data.len() - 1;
        let mut assignment = vec![0; self.trip_data.len()];
        let mut level = 0;
        let mut mode = 0;
        loop {
            while mode < number_of_modes {
                if self.trip_data[level].feasible[mode] {
                    assignment[level] = mode;
                    if level == top_level {
                        if let Some(tour_utility) = self.accepts(chain, modes, &assignment) {
                            self.possible_assignments.push(PossibleTripChainSolution::new(
                                &self.trip_data,
                                &assignment,
                                tour_utility,
                            ));
                        }
                    } else {
                        // descend to the next trip
                        level += 1;
                        mode = 0;
                        continue;
                    }
                }
                mode += 1;
            }
            if level == 0 {
                break;
            }
            level -= 1;
            mode = assignment[level] + 1;
        }
    }

    /// The additive tour-level utility of an accepted combination, or None
    /// if any chain-level or tour-dependent check rejects it.
    fn accepts(&self, chain: &TripChain, modes: &Modes, assignment: &[ModeIdx]) -> Option<Utility> {
        for (_, mode) in modes.non_shared() {
            if !mode.feasible_chain(chain, assignment) {
                return None;
            }
        }
        let mut tour_utility = 0.0;
        for (position, &picked) in assignment.iter().enumerate() {
            if let Some(tour_dependent) = modes.get(picked).as_tour_dependent() {
                tour_utility += tour_dependent.tour_dependent_utility(chain, position, assignment)?;
            }
        }
        Some(tour_utility)
    }

    /// Refreshes the cached U of every enumerated combination after the
    /// error terms changed.
    pub fn regenerate_utilities(&mut self) {
        let trip_data = &self.trip_data;
        for solution in &mut self.possible_assignments {
            solution.regenerate_u(trip_data);
        }
    }

    /// Keeps, per vehicle category, the highest-U combination whose first
    /// trip's mode belongs to the category. Ties prefer the first found.
    pub fn select_best_per_vehicle_type(&mut self, modes: &Modes) {
        for best in self.best_per_category.iter_mut() {
            *best = None;
        }
        for (index, solution) in self.possible_assignments.iter().enumerate() {
            let category = match modes.get(solution.picked_modes()[0]).requires_vehicle() {
                Some(vehicle_type) => vehicle_type + 1,
                None => 0,
            };
            let other_u = self.best_per_category[category]
                .map(|i| self.possible_assignments[i].u())
                .unwrap_or(Utility::NEG_INFINITY);
            if solution.u() > other_u {
                self.best_per_category[category] = Some(index);
            }
        }
    }

    pub fn best_solution(&self, category: usize) -> Option<&PossibleTripChainSolution> {
        self.best_per_category[category].map(|i| &self.possible_assignments[i])
    }

    /// U of the best solution of the category, or -inf if there is none.
    pub fn best_utility(&self, category: usize) -> Utility {
        self.best_solution(category)
            .map(|s| s.u())
            .unwrap_or(Utility::NEG_INFINITY)
    }

    /// Assigns the best solution of the given vehicle category to the trips
    /// of this chain. False if the category holds no solution.
    pub fn assign(&mut self, category: usize) -> bool {
        let Some(index) = self.best_per_category[category] else {
            return false;
        };
        let picked = self.possible_assignments[index].picked_modes().to_vec();
        for (data, mode) in self.trip_data.iter_mut().zip(picked) {
            data.mode = Some(mode);
        }
        true
    }
}
