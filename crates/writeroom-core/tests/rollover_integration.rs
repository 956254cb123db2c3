//! Day and week rollover across process restarts.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use writeroom_core::{
    BudgetPolicy, Database, Event, FixedClock, ManualEntry, SessionManager, Stage, StateStore,
    WeekPhase,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn open(path: &std::path::Path, clock: &FixedClock) -> SessionManager<Database, FixedClock> {
    let db = Database::open_path(path).unwrap();
    SessionManager::open(BudgetPolicy::default(), Weekday::Sun, db, clock.clone()).unwrap()
}

fn log(manager: &mut SessionManager<Database, FixedClock>, stage: Stage, minutes: u64) {
    manager
        .log_manual(ManualEntry {
            stage: Some(stage),
            title: "Draft".into(),
            duration_minutes: Some(minutes),
            start_time: NaiveTime::from_hms_opt(7, 0, 0),
            ..ManualEntry::default()
        })
        .unwrap();
}

#[test]
fn a_week_of_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writeroom.db");
    // Sunday
    let clock = FixedClock::new(at(2026, 10, 11, 9));

    let mut manager = open(&path, &clock);
    assert_eq!(manager.week().day_index, 1);
    manager.set_tomorrow_plan("start chapter four").unwrap();
    log(&mut manager, Stage::Prewriting, 240);
    assert_eq!(manager.budget().daily_remaining(), 0);
    drop(manager);

    // same day, later: nothing resets
    clock.set(at(2026, 10, 11, 22));
    let manager = open(&path, &clock);
    assert_eq!(manager.budget().daily_remaining(), 0);
    assert_eq!(manager.daily_plan(), "");
    drop(manager);

    // skip Monday; Tuesday is the second active day
    clock.set(at(2026, 10, 13, 9));
    let mut manager = open(&path, &clock);
    assert_eq!(manager.week().day_index, 2);
    assert_eq!(manager.budget().daily_remaining(), 14_400);
    assert_eq!(manager.budget().weekly_remaining(Stage::Prewriting), 3_600);
    assert_eq!(manager.daily_plan(), "start chapter four");
    log(&mut manager, Stage::Prewriting, 60);
    drop(manager);

    for (day, expected_index) in [(14, 3), (15, 4), (16, 5), (17, 5)] {
        clock.set(at(2026, 10, day, 9));
        let manager = open(&path, &clock);
        assert_eq!(manager.week().day_index, expected_index);
        assert_eq!(manager.budget().weekly_remaining(Stage::Prewriting), 0);
    }

    // next Sunday starts over, history kept
    clock.set(at(2026, 10, 18, 9));
    let manager = open(&path, &clock);
    assert_eq!(manager.week().day_index, 1);
    assert_eq!(manager.phase(), WeekPhase::Initial);
    assert_eq!(manager.budget().total_used(), 0);
    assert_eq!(manager.sessions().len(), 2);
}

#[test]
fn roll_over_reports_the_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writeroom.db");
    let clock = FixedClock::new(at(2026, 10, 16, 23));
    let mut manager = open(&path, &clock);

    clock.advance(Duration::hours(2));
    assert!(matches!(
        manager.roll_over().unwrap(),
        Some(Event::DayRolledOver { day_index: 2, .. })
    ));

    clock.advance(Duration::days(1));
    match manager.roll_over().unwrap() {
        Some(Event::WeekRolledOver { week_start, .. }) => {
            assert_eq!(week_start, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        }
        other => panic!("expected week rollover, got {other:?}"),
    }
    assert_eq!(
        manager.store().load_state().unwrap().last_active_date,
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    );
}

#[test]
fn clock_moving_backwards_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writeroom.db");
    let clock = FixedClock::new(at(2026, 10, 14, 9));
    let mut manager = open(&path, &clock);
    log(&mut manager, Stage::Writing, 30);

    clock.set(at(2026, 10, 12, 9));
    assert!(manager.roll_over().unwrap().is_none());
    assert_eq!(manager.budget().daily_remaining(), 12_600);
}

#[test]
fn corrupt_row_is_replaced_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("writeroom.db");
    {
        let db = Database::open_path(&path).unwrap();
        db.kv_set(writeroom_core::storage::STATE_KEY, "{\"dailyRemaining\":")
            .unwrap();
    }
    let clock = FixedClock::new(at(2026, 10, 14, 9));
    let manager = open(&path, &clock);
    assert_eq!(manager.budget().daily_remaining(), 14_400);
    assert!(manager.store().load_state().is_some());
}
