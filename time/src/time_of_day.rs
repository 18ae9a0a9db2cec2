use std::fmt;
use std::ops::{Add, Sub};

use crate::Duration;

/// A point on the travel-day clock. The model day starts at 4:00 and runs to
/// 28:00, so an activity ending after midnight stays on the same day (27:30
/// is half past three in the morning).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Time {
    minutes: u32, // minutes since midnight of the travel day
}

impl Time {
    pub const START_OF_DAY: Time = Time { minutes: 4 * 60 };
    pub const END_OF_DAY: Time = Time { minutes: 28 * 60 };

    pub fn new(string: &str) -> Time {
        // "h:mm" or "hh:mm"
        let splitted: Vec<&str> = string.split(':').collect();
        assert!(splitted.len() == 2, "Wrong time format! string: {}", string);

        let hours: u32 = splitted[0].parse().expect("Error at hour.");
        let minutes: u32 = splitted[1].parse().expect("Error at minute.");
        assert!(minutes < 60, "Wrong minute format.");

        Time {
            minutes: hours * 60 + minutes,
        }
    }

    pub fn from_minutes(minutes: u32) -> Time {
        Time { minutes }
    }

    pub fn in_min(&self) -> u32 {
        self.minutes
    }

    pub fn hours(&self) -> u32 {
        self.minutes / 60
    }

    pub fn minutes(&self) -> u32 {
        self.minutes % 60
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, other: Duration) -> Self {
        Time {
            minutes: self.minutes + other.in_min(),
        }
    }
}

impl Sub<Duration> for Time {
    type Output = Self;

    fn sub(self, other: Duration) -> Self {
        assert!(
            self.minutes >= other.in_min(),
            "Cannot subtract {} from {}.",
            other,
            self
        );
        Time {
            minutes: self.minutes - other.in_min(),
        }
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, other: Time) -> Duration {
        assert!(
            self >= other,
            "Cannot subtract a later time ({}) from an earlier time ({}).",
            other,
            self
        );
        Duration::from_minutes(self.minutes - other.minutes)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}
