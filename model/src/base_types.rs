use derive_more::{Display, From};

#[derive(Display, From, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(pub u32);

#[derive(Display, From, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HouseholdId(pub u32);

#[derive(Display, From, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(pub u32);

#[derive(Display, From, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointTourId(pub u32);

pub type ModeIdx = usize;
pub type VehicleTypeIdx = usize;

pub type Utility = f32;

/// Index of a trip chain within its household (person-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TourRef {
    pub person: usize,
    pub chain: usize,
}

/// Index of a trip within its household (person-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripRef {
    pub person: usize,
    pub chain: usize,
    pub trip: usize,
}

impl TripRef {
    pub fn tour(&self) -> TourRef {
        TourRef {
            person: self.person,
            chain: self.chain,
        }
    }
}
