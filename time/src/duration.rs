use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Duration {
    minutes: u32,
}

impl Duration {
    pub fn new(string: &str) -> Duration {
        // "hh:mm"
        let splitted: Vec<&str> = string.split(':').collect();
        assert!(
            splitted.len() == 2,
            "Wrong duration format! string: {}",
            string
        );

        let hours: u32 = splitted[0].parse().expect("Error at hour.");
        let minutes: u32 = splitted[1].parse().expect("Error at minute.");
        assert!(minutes < 60, "Wrong minute format.");

        Duration {
            minutes: hours * 60 + minutes,
        }
    }

    pub fn from_minutes(minutes: u32) -> Duration {
        Duration { minutes }
    }

    pub fn zero() -> Duration {
        Duration { minutes: 0 }
    }

    pub fn in_min(&self) -> u32 {
        self.minutes
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Duration {
            minutes: self.minutes + other.minutes,
        }
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        assert!(
            self >= other,
            "Cannot subtract a longer duration ({}) from a shorter duration ({}).",
            other,
            self
        );
        Duration {
            minutes: self.minutes - other.minutes,
        }
    }
}

impl Sum for Duration {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Duration::zero(), |a, b| a + b)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}h", self.minutes / 60, self.minutes % 60)
    }
}
