use std::fmt;

use crate::{Duration, Time};

/// A half-open interval [start, end) on the travel-day clock.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TimeSpan {
    start: Time,
    end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> TimeSpan {
        assert!(
            start <= end,
            "Time span must not end ({}) before it starts ({}).",
            end,
            start
        );
        TimeSpan { start, end }
    }

    pub fn whole_day() -> TimeSpan {
        TimeSpan {
            start: Time::START_OF_DAY,
            end: Time::END_OF_DAY,
        }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The common sub-interval of the two spans, if they share more than a
    /// single instant.
    pub fn intersect(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(TimeSpan { start, end })
        } else {
            None
        }
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.intersect(other).is_some()
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}
