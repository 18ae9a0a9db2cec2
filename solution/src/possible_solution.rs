use itertools::izip;

use model::base_types::{ModeIdx, Utility};

use crate::trip_data::TripData;

/// One feasible mode combination of a trip chain together with its cached
/// total utility U. The combination itself is fixed once enumerated; U is
/// refreshed whenever the error terms change.
pub struct PossibleTripChainSolution {
    picked_modes: Vec<ModeIdx>,
    /// Additive modifier contributed by tour-dependent modes.
    tour_utility: Utility,
    u: Utility,
}

impl PossibleTripChainSolution {
    pub fn new(
        trip_data: &[TripData],
        picked_modes: &[ModeIdx],
        tour_utility: Utility,
    ) -> PossibleTripChainSolution {
        let mut solution = PossibleTripChainSolution {
            picked_modes: picked_modes.to_vec(),
            tour_utility,
            u: Utility::NEG_INFINITY,
        };
        solution.regenerate_u(trip_data);
        solution
    }

    pub fn picked_modes(&self) -> &[ModeIdx] {
        &self.picked_modes
    }

    /// Total utility under the current error terms.
    pub fn u(&self) -> Utility {
        self.u
    }

    pub fn regenerate_u(&mut self, trip_data: &[TripData]) {
        self.u = izip!(&self.picked_modes, trip_data)
            .map(|(&mode, data)| data.utility_of(mode))
            .sum::<Utility>()
            + self.tour_utility;
    }
}
