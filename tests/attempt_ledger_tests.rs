mod common;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use signup_coordinator::db::attempt_repo;
use signup_coordinator::db::models::AttemptKind;
use signup_coordinator::signup::engine;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

#[tokio::test]
async fn begin_marks_an_attempt_active() {
    let db = common::mem_pool().await;
    let player = 20;

    assert!(!attempt_repo::has_active(&db, player, AttemptKind::Signup)
        .await
        .unwrap());

    attempt_repo::begin(&db, player, AttemptKind::Signup, base())
        .await
        .unwrap();

    assert!(attempt_repo::has_active(&db, player, AttemptKind::Signup)
        .await
        .unwrap());
    // The other kind is untouched.
    assert!(!attempt_repo::has_active(&db, player, AttemptKind::Unsign)
        .await
        .unwrap());
}

#[tokio::test]
async fn end_all_is_idempotent_and_keeps_history() {
    let db = common::mem_pool().await;
    let player = 21;

    attempt_repo::begin(&db, player, AttemptKind::Signup, base())
        .await
        .unwrap();
    attempt_repo::begin(&db, player, AttemptKind::Signup, base() + Duration::seconds(5))
        .await
        .unwrap();

    attempt_repo::end_all(&db, player, AttemptKind::Signup)
        .await
        .unwrap();
    attempt_repo::end_all(&db, player, AttemptKind::Signup)
        .await
        .unwrap();

    assert!(!attempt_repo::has_active(&db, player, AttemptKind::Signup)
        .await
        .unwrap());

    // Rows survive deactivation for the limiter's lookback.
    let stamps = attempt_repo::recent_timestamps(&db, player, AttemptKind::Signup, 10)
        .await
        .unwrap();
    assert_eq!(stamps.len(), 2);
}

#[tokio::test]
async fn recent_timestamps_come_newest_first() {
    let db = common::mem_pool().await;
    let player = 22;

    for offset in [0, 60, 120, 180] {
        attempt_repo::begin(
            &db,
            player,
            AttemptKind::Unsign,
            base() + Duration::seconds(offset),
        )
        .await
        .unwrap();
    }

    let stamps = attempt_repo::recent_timestamps(&db, player, AttemptKind::Unsign, 3)
        .await
        .unwrap();
    assert_eq!(stamps.len(), 3);
    assert_eq!(stamps[0], "2024-03-01 09:33:00.000000");
    assert_eq!(stamps[2], "2024-03-01 09:31:00.000000");
}

#[tokio::test]
async fn process_wide_reset_clears_both_kinds_for_everyone() {
    let db = common::mem_pool().await;

    attempt_repo::begin(&db, 23, AttemptKind::Signup, base())
        .await
        .unwrap();
    attempt_repo::begin(&db, 24, AttemptKind::Unsign, base())
        .await
        .unwrap();

    // The host-facing reset: re-runs the idempotent bootstrap, then
    // clears every open marker.
    engine::startup_reset(&db).await.unwrap();

    assert!(!attempt_repo::has_active(&db, 23, AttemptKind::Signup)
        .await
        .unwrap());
    assert!(!attempt_repo::has_active(&db, 24, AttemptKind::Unsign)
        .await
        .unwrap());
}
