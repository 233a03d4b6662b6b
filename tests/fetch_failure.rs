mod common;

use common::{config, fetch_tickets, history, loaded_engine};
use price_viewport_wasm::domain::errors::FetchError;
use price_viewport_wasm::domain::market_data::Timeframe;

#[test]
fn failure_reverts_and_waits_for_retry() {
    let (mut engine, _) = loaded_engine(config(200, 500), 10_000);
    engine.take_effects();
    engine.pan_by(1_150.0, 0.0);
    let ticket = fetch_tickets(&engine.take_effects()).pop().unwrap();

    engine.apply_fetch(ticket, Err(FetchError::Network("offline".to_string())));
    assert_eq!(engine.requested_points(), 200);
    insta::assert_json_snapshot!(engine.status(), @r#"
    {
      "isLive": false,
      "isLoading": false,
      "error": "Network error: offline",
      "loadedCount": 200
    }
    "#);

    engine.pan_by(-5.0, 0.0);
    engine.pan_by(5.0, 0.0);
    assert!(fetch_tickets(&engine.take_effects()).is_empty());

    assert!(engine.retry_prefetch());
    let retry = fetch_tickets(&engine.take_effects()).pop().unwrap();
    assert_eq!(retry.points, 300);
    engine.apply_fetch(retry, Ok(history(300)));

    let status = engine.status();
    assert_eq!(status.error, None);
    assert_eq!(status.loaded_count, 300);
}

#[test]
fn retry_without_error_is_a_no_op() {
    let (mut engine, _) = loaded_engine(config(200, 500), 10_000);
    assert!(!engine.retry_prefetch());
}

#[test]
fn failed_initial_load_retries_initial_size() {
    let (mut engine, _) = loaded_engine(config(200, 500), 10_000);
    engine.select("QQQ".into(), Timeframe::OneHour);
    let ticket = fetch_tickets(&engine.take_effects()).pop().unwrap();
    engine.apply_fetch(ticket, Err(FetchError::Http { status: 503 }));

    let status = engine.status();
    assert_eq!(status.error.as_deref(), Some("HTTP error: 503"));
    assert_eq!(status.loaded_count, 0);
    assert!(engine.frame().is_none());

    assert!(engine.retry_prefetch());
    let retry = fetch_tickets(&engine.take_effects()).pop().unwrap();
    assert_eq!(retry.points, 200);
}
