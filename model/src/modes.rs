use crate::base_types::{ModeIdx, Utility, VehicleTypeIdx};
use crate::household::{Trip, TripChain};

/// Capability surface of a travel mode. The engine never computes utilities
/// itself; it only queries feasibility and the deterministic utility V of a
/// mode and combines them with its own random error terms.
pub trait Mode: Send + Sync {
    fn name(&self) -> &str;

    /// The vehicle type this mode occupies for the whole tour, if any.
    fn requires_vehicle(&self) -> Option<VehicleTypeIdx>;

    /// Scale applied to the standard-normal error draws of this mode.
    fn variance_scale(&self) -> f32;

    fn feasible(&self, trip: &Trip) -> bool;

    /// Deterministic utility V of using this mode on the trip.
    fn utility(&self, trip: &Trip) -> Utility;

    /// Chain-level veto over a complete candidate assignment (one mode index
    /// per trip). Every mode is consulted for every candidate, whether it is
    /// used in the assignment or not.
    fn feasible_chain(&self, _chain: &TripChain, _assignment: &[ModeIdx]) -> bool {
        true
    }

    fn as_tour_dependent(&self) -> Option<&dyn TourDependentMode> {
        None
    }

    fn as_passenger(&self) -> Option<&dyn PassengerMode> {
        None
    }
}

/// A mode whose utility depends on the whole tour rather than a single trip.
pub trait TourDependentMode: Mode {
    /// Additional utility contributed by using this mode at `position` of
    /// the chain under the given assignment. `None` rejects the whole
    /// combination.
    fn tour_dependent_utility(
        &self,
        chain: &TripChain,
        position: usize,
        assignment: &[ModeIdx],
    ) -> Option<Utility>;
}

/// A shared mode in which a household driver carries another member.
pub trait PassengerMode: Mode {
    /// The driver-side mode (the driver's trip must currently use it).
    fn associated_mode(&self) -> ModeIdx;

    /// Feasibility and utility of serving `passenger_trip` with
    /// `driver_trip`. `None` if the pairing is infeasible.
    fn calculate_v(&self, driver_trip: &Trip, passenger_trip: &Trip) -> Option<Utility>;
}

/// The mode universe of a run. Non-shared modes come first and are the only
/// ones entering trip-chain enumeration; shared modes (rideshare, passenger)
/// are assigned by the engine afterwards.
pub struct Modes {
    modes: Vec<Box<dyn Mode>>,
    number_non_shared: usize,
}

impl Modes {
    pub fn new(non_shared: Vec<Box<dyn Mode>>, shared: Vec<Box<dyn Mode>>) -> Modes {
        let number_non_shared = non_shared.len();
        let mut modes = non_shared;
        modes.extend(shared);
        Modes {
            modes,
            number_non_shared,
        }
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn get(&self, index: ModeIdx) -> &dyn Mode {
        self.modes[index].as_ref()
    }

    pub fn all(&self) -> impl Iterator<Item = &dyn Mode> {
        self.modes.iter().map(|m| m.as_ref())
    }

    pub fn number_non_shared(&self) -> usize {
        self.number_non_shared
    }

    pub fn non_shared(&self) -> impl Iterator<Item = (ModeIdx, &dyn Mode)> {
        self.modes[..self.number_non_shared]
            .iter()
            .enumerate()
            .map(|(i, m)| (i, m.as_ref()))
    }

    pub fn index_of(&self, name: &str) -> Option<ModeIdx> {
        self.modes.iter().position(|m| m.name() == name)
    }

    pub fn variance_scales(&self) -> Vec<f32> {
        self.modes.iter().map(|m| m.variance_scale()).collect()
    }
}

/// A mode whose per-trip feasibility and utility are read from the rows the
/// instance carries on each trip.
pub struct TableMode {
    index: ModeIdx,
    name: String,
    requires_vehicle: Option<VehicleTypeIdx>,
    variance_scale: f32,
}

impl TableMode {
    pub fn new(
        index: ModeIdx,
        name: String,
        requires_vehicle: Option<VehicleTypeIdx>,
        variance_scale: f32,
    ) -> TableMode {
        TableMode {
            index,
            name,
            requires_vehicle,
            variance_scale,
        }
    }
}

impl Mode for TableMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_vehicle(&self) -> Option<VehicleTypeIdx> {
        self.requires_vehicle
    }

    fn variance_scale(&self) -> f32 {
        self.variance_scale
    }

    fn feasible(&self, trip: &Trip) -> bool {
        trip.mode_feasible()[self.index]
    }

    fn utility(&self, trip: &Trip) -> Utility {
        trip.mode_utility()[self.index]
    }

    /// The household vehicle leaves home with the chain and returns with it:
    /// a vehicle mode is used on every trip of the chain or on none.
    fn feasible_chain(&self, _chain: &TripChain, assignment: &[ModeIdx]) -> bool {
        if self.requires_vehicle.is_none() {
            return true;
        }
        let used = assignment.iter().filter(|&&m| m == self.index).count();
        used == 0 || used == assignment.len()
    }
}

/// Table-driven passenger mode: feasible when the passenger's table allows
/// it and the driver's trip window overlaps the passenger's trip.
pub struct TablePassengerMode {
    index: ModeIdx,
    name: String,
    variance_scale: f32,
    associated_mode: ModeIdx,
}

impl TablePassengerMode {
    pub fn new(
        index: ModeIdx,
        name: String,
        variance_scale: f32,
        associated_mode: ModeIdx,
    ) -> TablePassengerMode {
        TablePassengerMode {
            index,
            name,
            variance_scale,
            associated_mode,
        }
    }
}

impl Mode for TablePassengerMode {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_vehicle(&self) -> Option<VehicleTypeIdx> {
        None
    }

    fn variance_scale(&self) -> f32 {
        self.variance_scale
    }

    fn feasible(&self, trip: &Trip) -> bool {
        trip.mode_feasible()[self.index]
    }

    fn utility(&self, trip: &Trip) -> Utility {
        trip.mode_utility()[self.index]
    }

    fn as_passenger(&self) -> Option<&dyn PassengerMode> {
        Some(self)
    }
}

impl PassengerMode for TablePassengerMode {
    fn associated_mode(&self) -> ModeIdx {
        self.associated_mode
    }

    fn calculate_v(&self, driver_trip: &Trip, passenger_trip: &Trip) -> Option<Utility> {
        if !passenger_trip.mode_feasible()[self.index] {
            return None;
        }
        if !driver_trip.span().overlaps(&passenger_trip.span()) {
            return None;
        }
        Some(passenger_trip.mode_utility()[self.index])
    }
}
