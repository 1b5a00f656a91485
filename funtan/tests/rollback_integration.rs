//! A failure anywhere inside an operation must leave no partial writes.
//!
//! Uses the in-memory store's fault injection to fail individual store calls
//! after earlier writes in the same transaction already happened.

use chrono::{Duration, TimeZone, Utc};
use funtan::game::{ManualClock, models::WorkStatus};
use funtan::{
    Catalog, Currency, CurrencyDeltas, GameConfig, GameEngine, ItemKind, MemoryGameStore,
    ReasonCode,
};
use std::sync::Arc;

fn setup_engine() -> (GameEngine, Arc<ManualClock>, MemoryGameStore) {
    let store = MemoryGameStore::new();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 10, 18, 30, 0).unwrap(),
    ));
    let engine = GameEngine::new(
        Arc::new(store.clone()),
        Arc::new(Catalog::standard()),
        GameConfig::default(),
    )
    .with_clock(clock.clone());
    (engine, clock, store)
}

#[tokio::test]
async fn test_daily_claim_rolls_back_credit() {
    let (engine, _, store) = setup_engine();
    engine.ensure_player("7").await.unwrap();

    // Player row is saved before the claim row
    store.fail_operation("save_daily_claim");
    let err = engine.claim_daily("7").await.unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.reason(), ReasonCode::Error);
    assert!(!err.client_message().contains("save_daily_claim"));

    store.clear_faults();
    assert_eq!(engine.get_balance("7").await.unwrap().bronze, 0);

    let reward = engine.claim_daily("7").await.unwrap();
    assert_eq!(reward.streak, 1);
    assert_eq!(reward.new_bronze, 50);
}

#[tokio::test]
async fn test_collect_rolls_back_finish_flip() {
    let (engine, clock, store) = setup_engine();
    engine.start_work("8").await.unwrap();
    clock.advance(Duration::hours(10));

    store.fail_operation("save_player");
    assert!(engine.collect_work("8").await.unwrap_err().is_internal());
    store.clear_faults();

    let status = engine.work_status("8").await.unwrap();
    assert_eq!(status.session.map(|s| s.status), Some(WorkStatus::Working));
    assert_eq!(engine.get_balance("8").await.unwrap().silver, 0);

    let payout = engine.collect_work("8").await.unwrap();
    assert_eq!(payout.total_reward, 100);
}

#[tokio::test]
async fn test_hunt_rolls_back_kills_and_gems() {
    let (engine, _, store) = setup_engine();
    engine.ensure_player("9").await.unwrap();

    store.fail_operation("save_hunt_cooldown");
    assert!(engine.hunt("9", None).await.unwrap_err().is_internal());
    store.clear_faults();

    assert!(engine.hunt_records("9").await.unwrap().is_empty());
    assert_eq!(engine.get_balance("9").await.unwrap().gems, 0);

    // No cooldown was left behind either
    let report = engine.hunt("9", None).await.unwrap();
    assert_eq!(report.kills_in_tier, 1);
}

#[tokio::test]
async fn test_failed_commit_discards_adjustment() {
    let (engine, _, store) = setup_engine();
    engine
        .adjust_currency("10", &CurrencyDeltas::single(Currency::Silver, 40))
        .await
        .unwrap();

    store.fail_operation("commit");
    assert!(
        engine
            .adjust_currency("10", &CurrencyDeltas::single(Currency::Silver, -15))
            .await
            .is_err()
    );
    store.clear_faults();

    assert_eq!(engine.get_balance("10").await.unwrap().silver, 40);
}

#[tokio::test]
async fn test_failed_first_touch_creates_nothing() {
    let (engine, _, store) = setup_engine();

    // Starter kit grant fails inside player creation
    store.fail_operation("insert_item");
    assert!(
        engine
            .give_item("11", ItemKind::Weapon, "w4", 1)
            .await
            .is_err()
    );
    store.clear_faults();

    let items = engine.inventory("11", None).await.unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.catalog_id.as_str()).collect();
    assert_eq!(ids, vec!["w0", "g0"]);
}
