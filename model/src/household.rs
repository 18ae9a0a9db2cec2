use std::fmt;

use time::{Time, TimeSpan};

use crate::base_types::{HouseholdId, JointTourId, ModeIdx, PersonId, TourRef, Utility, ZoneId};
use crate::vehicles::Vehicle;

/// One household of the synthesized population. Households own all of their
/// data and are resolved independently of each other.
pub struct Household {
    id: HouseholdId,
    home_zone: ZoneId,
    persons: Vec<Person>,
    vehicles: Vec<Vehicle>,
}

impl Household {
    pub fn new(
        id: HouseholdId,
        home_zone: ZoneId,
        persons: Vec<Person>,
        vehicles: Vec<Vehicle>,
    ) -> Household {
        Household {
            id,
            home_zone,
            persons,
            vehicles,
        }
    }

    pub fn id(&self) -> HouseholdId {
        self.id
    }

    pub fn home_zone(&self) -> ZoneId {
        self.home_zone
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn trip_chain(&self, tour: TourRef) -> &TripChain {
        &self.persons[tour.person].trip_chains()[tour.chain]
    }

    pub fn number_of_licensed_drivers(&self) -> usize {
        self.persons.iter().filter(|p| p.licence()).count()
    }

    pub fn largest_trip_chain_size(&self) -> usize {
        self.persons
            .iter()
            .flat_map(|p| p.trip_chains())
            .map(|tc| tc.len())
            .max()
            .unwrap_or(0)
    }

    /// The representative chain of the given joint tour.
    pub fn joint_tour_representative(&self, joint_tour: JointTourId) -> Option<TourRef> {
        for (i, person) in self.persons.iter().enumerate() {
            for (j, chain) in person.trip_chains().iter().enumerate() {
                if let Some(joint) = chain.joint_tour() {
                    if joint.id == joint_tour && joint.representative {
                        return Some(TourRef {
                            person: i,
                            chain: j,
                        });
                    }
                }
            }
        }
        None
    }
}

pub struct Person {
    id: PersonId,
    licence: bool,
    trip_chains: Vec<TripChain>,
}

impl Person {
    pub fn new(id: PersonId, licence: bool, trip_chains: Vec<TripChain>) -> Person {
        Person {
            id,
            licence,
            trip_chains,
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn licence(&self) -> bool {
        self.licence
    }

    pub fn trip_chains(&self) -> &[TripChain] {
        &self.trip_chains
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTour {
    pub id: JointTourId,
    pub representative: bool,
}

/// An ordered sequence of trips forming one out-and-back (or multi-stop)
/// journey of a person. Trips are time-ordered.
pub struct TripChain {
    trips: Vec<Trip>,
    joint_tour: Option<JointTour>,
}

impl TripChain {
    pub fn new(trips: Vec<Trip>, joint_tour: Option<JointTour>) -> TripChain {
        assert!(!trips.is_empty(), "A trip chain must contain a trip.");
        assert!(
            trips.windows(2).all(|w| w[0].start_time() <= w[1].start_time()),
            "Trips within a chain must be time-ordered."
        );
        TripChain { trips, joint_tour }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn joint_tour(&self) -> Option<JointTour> {
        self.joint_tour
    }

    pub fn is_joint(&self) -> bool {
        self.joint_tour.is_some()
    }

    pub fn is_joint_representative(&self) -> bool {
        self.joint_tour.map(|j| j.representative).unwrap_or(false)
    }

    /// True for chains that copy the representative's resolution instead of
    /// being resolved themselves.
    pub fn follows_representative(&self) -> bool {
        self.is_joint() && !self.is_joint_representative()
    }

    pub fn start_time(&self) -> Time {
        self.trips.first().unwrap().start_time()
    }

    pub fn end_time(&self) -> Time {
        self.trips.last().unwrap().activity_start()
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time(), self.end_time())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Home,
    Work,
    School,
    Market,
    Other,
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Purpose::Home => write!(f, "Home"),
            Purpose::Work => write!(f, "Work"),
            Purpose::School => write!(f, "School"),
            Purpose::Market => write!(f, "Market"),
            Purpose::Other => write!(f, "Other"),
        }
    }
}

/// One trip of a chain. The per-mode feasibility flags and deterministic
/// utilities are supplied by the instance (they are computed outside of this
/// engine) and indexed by mode.
pub struct Trip {
    origin: ZoneId,
    destination: ZoneId,
    purpose: Purpose,
    start_time: Time,     // departure at the origin
    activity_start: Time, // arrival at the destination
    mode_feasible: Vec<bool>,
    mode_utility: Vec<Utility>,
    observed_mode: Option<ModeIdx>,
}

impl Trip {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        origin: ZoneId,
        destination: ZoneId,
        purpose: Purpose,
        start_time: Time,
        activity_start: Time,
        mode_feasible: Vec<bool>,
        mode_utility: Vec<Utility>,
        observed_mode: Option<ModeIdx>,
    ) -> Trip {
        assert!(
            start_time <= activity_start,
            "A trip cannot arrive ({}) before it departs ({}).",
            activity_start,
            start_time
        );
        assert!(
            mode_feasible.len() == mode_utility.len(),
            "Feasibility and utility rows must cover the same modes."
        );
        Trip {
            origin,
            destination,
            purpose,
            start_time,
            activity_start,
            mode_feasible,
            mode_utility,
            observed_mode,
        }
    }

    /// A virtual trip of a driver who leaves home only to drop somebody off,
    /// available during the given time window. Used by passenger matching;
    /// such trips never enter enumeration, so their table rows are empty.
    pub fn drop_off_only(home_zone: ZoneId, window: TimeSpan, number_of_modes: usize) -> Trip {
        Trip {
            origin: home_zone,
            destination: home_zone,
            purpose: Purpose::Home,
            start_time: window.start(),
            activity_start: window.end(),
            mode_feasible: vec![false; number_of_modes],
            mode_utility: vec![Utility::NEG_INFINITY; number_of_modes],
            observed_mode: None,
        }
    }

    pub fn origin(&self) -> ZoneId {
        self.origin
    }

    pub fn destination(&self) -> ZoneId {
        self.destination
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn start_time(&self) -> Time {
        self.start_time
    }

    pub fn activity_start(&self) -> Time {
        self.activity_start
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time, self.activity_start)
    }

    pub fn mode_feasible(&self) -> &[bool] {
        &self.mode_feasible
    }

    pub fn mode_utility(&self) -> &[Utility] {
        &self.mode_utility
    }

    pub fn observed_mode(&self) -> Option<ModeIdx> {
        self.observed_mode
    }
}
