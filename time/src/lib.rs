pub mod duration;
pub mod time_of_day;
pub mod time_span;

pub use duration::Duration;
pub use time_of_day::Time;
pub use time_span::TimeSpan;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
