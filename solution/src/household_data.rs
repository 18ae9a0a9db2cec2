use model::base_types::{TourRef, TripRef};
use model::household::Household;

use crate::trip_chain_data::TripChainData;
use crate::trip_data::TripData;

pub struct PersonData {
    pub trip_chain_data: Vec<TripChainData>,
}

/// Working state of one household, mirroring its person/chain/trip layout.
/// Allocated once per household and reused across its iterations; nothing in
/// here is shared between households.
pub struct HouseholdData {
    pub person_data: Vec<PersonData>,
}

impl HouseholdData {
    pub fn new(
        household: &Household,
        number_of_modes: usize,
        number_of_categories: usize,
    ) -> HouseholdData {
        HouseholdData {
            person_data: household
                .persons()
                .iter()
                .map(|person| PersonData {
                    trip_chain_data: person
                        .trip_chains()
                        .iter()
                        .map(|chain| {
                            TripChainData::new(chain, number_of_modes, number_of_categories)
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn trip_chain_data(&self, tour: TourRef) -> &TripChainData {
        &self.person_data[tour.person].trip_chain_data[tour.chain]
    }

    pub fn trip_chain_data_mut(&mut self, tour: TourRef) -> &mut TripChainData {
        &mut self.person_data[tour.person].trip_chain_data[tour.chain]
    }

    pub fn trip_data(&self, trip: TripRef) -> &TripData {
        &self.person_data[trip.person].trip_chain_data[trip.chain].trip_data[trip.trip]
    }

    pub fn trip_data_mut(&mut self, trip: TripRef) -> &mut TripData {
        &mut self.person_data[trip.person].trip_chain_data[trip.chain].trip_data[trip.trip]
    }
}
