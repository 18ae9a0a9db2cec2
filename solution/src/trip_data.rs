use model::base_types::{ModeIdx, TripRef, Utility};
use time::TimeSpan;

/// Where the driver serving a passenger trip comes from: a trip of another
/// member's vehicle tour, or a virtual drop-off tour of somebody idling at
/// home during the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRef {
    OnTour(TripRef),
    AtHome { person: usize, window: TimeSpan },
}

/// Working state of one trip, rebuilt per household and reused across the
/// household's iterations. All per-mode rows are indexed by mode and cover
/// shared modes as well.
pub struct TripData {
    pub feasible: Vec<bool>,
    /// Deterministic utility V.
    pub v: Vec<Utility>,
    /// Error term of the running household iteration.
    pub error: Vec<Utility>,
    /// Mode assigned within the running household iteration.
    pub mode: Option<ModeIdx>,
    /// One chosen mode per completed household iteration.
    pub chosen: Vec<ModeIdx>,
    pub driver: Option<DriverRef>,
}

impl TripData {
    pub fn new(number_of_modes: usize) -> TripData {
        TripData {
            feasible: vec![false; number_of_modes],
            v: vec![Utility::NEG_INFINITY; number_of_modes],
            error: vec![0.0; number_of_modes],
            mode: None,
            chosen: Vec::new(),
            driver: None,
        }
    }

    /// V plus error term of the given mode.
    pub fn utility_of(&self, mode: ModeIdx) -> Utility {
        self.v[mode] + self.error[mode]
    }

    /// The mode assigned within the running household iteration. Only valid
    /// after the vehicle allocation has been applied.
    pub fn assigned_mode(&self) -> ModeIdx {
        self.mode.expect("No mode assigned to trip yet.")
    }
}
