//! Integration tests for the tracker surface.
//!
//! Covers registration, check-in recording, cluster evaluation, streaks and
//! summaries end to end through `HabitTracker`.

use chrono::{Days, NaiveDate};
use habitcluster_core::{
    CoreError, HabitTracker, NotFoundError, RecordStatus, StreakTier, ValidationError,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn tracker() -> HabitTracker {
    let mut tracker = HabitTracker::in_memory();
    for (id, name, category) in [
        ("yoga", "Yoga", "physical"),
        ("gym", "Gym", "physical"),
        ("jiu-jitsu", "Jiu-Jitsu", "physical"),
        ("meditation", "Meditation", "mental"),
        ("not-yelling", "Not Yelling", "mental"),
    ] {
        tracker.register_habit(id, name, category).unwrap();
    }
    tracker
        .register_cluster("physical", "Physical", "physical", ids(&["yoga", "gym", "jiu-jitsu"]), 1)
        .unwrap();
    tracker
        .register_cluster("mental", "Mental", "mental", ids(&["meditation", "not-yelling"]), 2)
        .unwrap();
    tracker
}

#[test]
fn test_one_habit_satisfies_one_of_three_cluster() {
    let tracker = tracker();
    tracker.record_check_in("yoga", day(10)).unwrap();

    let status = tracker.cluster_status("physical", day(10)).unwrap();
    assert_eq!(status.satisfied_count, 1);
    assert!(status.satisfied);
    assert_eq!(status.required, 1);
}

#[test]
fn test_two_of_two_cluster_needs_both() {
    let tracker = tracker();
    tracker.record_check_in("meditation", day(10)).unwrap();

    let status = tracker.cluster_status("mental", day(10)).unwrap();
    assert!(!status.satisfied);
    assert_eq!(status.satisfied_count, 1);

    tracker.record_check_in("not-yelling", day(10)).unwrap();
    let status = tracker.cluster_status("mental", day(10)).unwrap();
    assert!(status.satisfied);
    assert_eq!(status.satisfied_count, 2);
}

#[test]
fn test_five_day_streak_broken_on_sixth() {
    let tracker = tracker();
    for d in 1..=5 {
        tracker.record_check_in("gym", day(d)).unwrap();
    }

    let streak = tracker.streak("physical", day(6)).unwrap();
    assert_eq!(streak.current, 0);
    assert_eq!(streak.longest, 5);

    let range = tracker.range_summary("physical", day(1), day(6)).unwrap();
    assert_eq!(range.streak.longest, 5);
    assert_eq!(range.satisfied_days, 5);
    assert_eq!(range.total_days, 6);

    let at_five = tracker.streak("physical", day(5)).unwrap();
    assert_eq!(at_five.current, 5);
    assert_eq!(at_five.tier, StreakTier::Bronze);
}

#[test]
fn test_unknown_member_leaves_no_cluster() {
    let mut tracker = tracker();
    let err = tracker
        .register_cluster("spiritual", "Spiritual", "spiritual", ids(&["prayer"]), 1)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::UnknownMember { .. })
    ));

    let err = tracker.cluster_status("spiritual", day(1)).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(NotFoundError::Cluster(_))));
    assert!(tracker.cluster("spiritual").unwrap_err().is_not_found());
}

#[test]
fn test_daily_summary_on_empty_day() {
    let tracker = tracker();
    tracker.record_check_in("yoga", day(1)).unwrap();

    let summary = tracker.daily_summary(day(2)).unwrap();
    assert_eq!(summary.clusters.len(), 2);
    for status in summary.clusters.values() {
        assert!(!status.satisfied);
        assert_eq!(status.satisfied_count, 0);
    }
}

#[test]
fn test_duplicate_check_in_is_idempotent() {
    let tracker = tracker();
    assert_eq!(
        tracker.record_check_in("gym", day(3)).unwrap(),
        RecordStatus::Recorded
    );
    let before = tracker.daily_summary(day(3)).unwrap();

    assert_eq!(
        tracker.record_check_in("gym", day(3)).unwrap(),
        RecordStatus::AlreadyRecorded
    );
    assert_eq!(tracker.daily_summary(day(3)).unwrap(), before);
    assert_eq!(tracker.store().events_between(day(3), day(3)).unwrap().len(), 1);
}

#[test]
fn test_unknown_ids_surface_not_found() {
    let tracker = tracker();
    assert!(tracker.record_check_in("rowing", day(1)).unwrap_err().is_not_found());
    assert!(tracker.retract_check_in("rowing", day(1)).unwrap_err().is_not_found());
    assert!(tracker.streak("spiritual", day(1)).unwrap_err().is_not_found());
    assert!(tracker
        .range_summary("spiritual", day(1), day(2))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_registration_errors() {
    let mut tracker = tracker();
    assert!(tracker.register_habit("yoga", "Yoga", "physical").unwrap_err().is_validation());
    assert!(tracker
        .register_cluster("physical", "Again", "physical", ids(&["gym"]), 1)
        .unwrap_err()
        .is_validation());
    assert!(tracker
        .register_cluster("pair", "Pair", "physical", ids(&["gym", "gym"]), 1)
        .unwrap_err()
        .is_validation());
    assert!(tracker
        .register_cluster("pair", "Pair", "physical", ids(&["gym", "yoga"]), 3)
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_retraction_breaks_streak() {
    let tracker = tracker();
    for d in 1..=4 {
        tracker.record_check_in("yoga", day(d)).unwrap();
    }
    assert_eq!(tracker.streak("physical", day(4)).unwrap().current, 4);

    tracker.retract_check_in("yoga", day(3)).unwrap();
    let streak = tracker.streak("physical", day(4)).unwrap();
    assert_eq!(streak.current, 1);
    assert_eq!(streak.longest, 2);
}

#[test]
fn test_overview_over_week() {
    let tracker = tracker();
    for d in 1..=7 {
        tracker.record_check_in("jiu-jitsu", day(d)).unwrap();
    }
    for d in [2, 4, 6] {
        tracker.record_check_in("meditation", day(d)).unwrap();
        tracker.record_check_in("not-yelling", day(d)).unwrap();
    }

    let overview = tracker.overview(day(1), day(7)).unwrap();
    assert_eq!(overview.total_days, 7);
    assert_eq!(overview.all_satisfied_days, 3);
    assert_eq!(overview.most_consistent_habit.as_deref(), Some("jiu-jitsu"));

    let physical = overview
        .clusters
        .iter()
        .find(|c| c.cluster_id == "physical")
        .unwrap();
    assert_eq!(physical.satisfied_days, 7);
    assert!((physical.fraction - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_cluster_history_is_restartable() {
    let tracker = tracker();
    tracker.record_check_in("gym", day(2)).unwrap();

    let history = tracker.cluster_history("physical", day(1), day(3)).unwrap();
    let first: Vec<bool> = history.iter().map(|r| r.satisfied).collect();
    let second: Vec<bool> = history.iter().map(|r| r.satisfied).collect();
    assert_eq!(first, vec![false, true, false]);
    assert_eq!(first, second);
}

#[test]
fn test_unbroken_run_over_a_year_counts_every_day() {
    let tracker = tracker();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let last = start.checked_add_days(Days::new(399)).unwrap();
    let mut date = start;
    while date <= last {
        tracker.record_check_in("yoga", date).unwrap();
        date = date.succ_opt().unwrap();
    }

    let streak = tracker.streak("physical", last).unwrap();
    assert_eq!(streak.current, 400);
    assert_eq!(streak.longest, 400);
    assert_eq!(streak.tier, StreakTier::Legendary);
}
