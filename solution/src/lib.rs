pub mod household_data;
pub mod possible_solution;
pub mod test_utilities;
pub mod trip_chain_data;
pub mod trip_data;

pub use household_data::{HouseholdData, PersonData};
pub use possible_solution::PossibleTripChainSolution;
pub use trip_chain_data::TripChainData;
pub use trip_data::{DriverRef, TripData};
