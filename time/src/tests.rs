#[cfg(test)]
use super::*;

#[test]
fn sum_up_duration() {
    let dur1 = Duration::new("5:40");
    let dur2 = Duration::new("00:46");
    let sum = Duration::new("6:26");
    assert!(
        dur1 + dur2 == sum,
        "Duration does not sum up correctly. dur1: {} + dur2: {} is {}; but should be {}",
        dur1,
        dur2,
        dur1 + dur2,
        sum
    );
}

#[test]
fn add_duration_to_time() {
    let time = Time::new("23:40");
    let dur = Duration::new("2:46");
    let sum = Time::new("26:26");
    assert!(
        time + dur == sum,
        "Duration does not sum up correctly. time: {} + dur: {} is {}; but should be {}",
        time,
        dur,
        time + dur,
        sum
    );
}

#[test]
fn subtract_times() {
    let earlier = Time::new("7:15");
    let later = Time::new("9:05");
    assert_eq!(later - earlier, Duration::new("1:50"));
}

#[test]
fn time_stays_on_the_travel_day_after_midnight() {
    let late = Time::new("27:30");
    assert!(late > Time::new("23:59"));
    assert!(late < Time::END_OF_DAY);
    assert_eq!(format!("{}", late), "27:30");
}

#[test]
fn ordering_of_day_bounds() {
    assert!(Time::START_OF_DAY < Time::new("4:01"));
    assert!(Time::new("27:59") < Time::END_OF_DAY);
}

#[test]
fn intersect_overlapping_spans() {
    let a = TimeSpan::new(Time::new("7:00"), Time::new("9:00"));
    let b = TimeSpan::new(Time::new("8:00"), Time::new("10:00"));
    let cut = a.intersect(&b).unwrap();
    assert_eq!(cut.start(), Time::new("8:00"));
    assert_eq!(cut.end(), Time::new("9:00"));
    assert_eq!(cut.duration(), Duration::new("1:00"));
}

#[test]
fn touching_spans_do_not_intersect() {
    let a = TimeSpan::new(Time::new("7:00"), Time::new("8:00"));
    let b = TimeSpan::new(Time::new("8:00"), Time::new("9:00"));
    assert!(
        a.intersect(&b).is_none(),
        "Spans {} and {} only share an instant and must not intersect.",
        a,
        b
    );
}

#[test]
fn disjoint_spans_do_not_overlap() {
    let a = TimeSpan::new(Time::new("7:00"), Time::new("8:00"));
    let b = TimeSpan::new(Time::new("12:00"), Time::new("13:00"));
    assert!(!a.overlaps(&b));
    assert!(!b.overlaps(&a));
}

#[test]
fn whole_day_contains_everything() {
    let span = TimeSpan::new(Time::new("6:30"), Time::new("26:00"));
    let cut = TimeSpan::whole_day().intersect(&span).unwrap();
    assert_eq!(cut, span);
}
