pub mod base_types;
pub mod config;
pub mod household;
pub mod json_serialisation;
pub mod modes;
pub mod vehicles;

#[cfg(test)]
mod json_serialisation_tests;
