mod common;

use common::{NEWEST, config, loaded_engine, spy, tick_at};
use price_viewport_wasm::domain::chart::{LiveMode, ViewportWindow};

#[test]
fn short_store_fills_the_window() {
    let (engine, _) = loaded_engine(config(200, 500), 80);
    assert_eq!(engine.window(), Some(ViewportWindow::new(0, 79)));
    assert!(engine.is_history_exhausted());
}

#[test]
fn pixel_offset_converts_to_data_points() {
    let (mut engine, _) = loaded_engine(config(500, 500), 10_000);
    engine.pan_by(300.0, 0.0);

    assert_eq!(engine.scales().index.pan_points(), 30.0);
    assert_eq!(engine.window(), Some(ViewportWindow::new(390, 469)));
}

#[test]
fn full_store_never_prefetches() {
    let (mut engine, _) = loaded_engine(config(500, 500), 10_000);
    engine.take_effects();

    engine.pan_by(4_200.0, 0.0);
    assert_eq!(engine.window(), Some(ViewportWindow::new(0, 79)));
    assert!(common::fetch_tickets(&engine.take_effects()).is_empty());
    assert!(engine.in_flight().is_none());
    assert_eq!(engine.status().loaded_count, 500);
}

#[test]
fn tick_for_last_timestamp_updates_in_place() {
    let (mut engine, _) = loaded_engine(config(200, 500), 10_000);
    engine.apply_tick(tick_at(NEWEST, 150.0));

    let store = engine.store().unwrap();
    assert_eq!(store.len(), 200);
    assert_eq!(store.symbol(), &spy());
    let last = store.last().unwrap();
    assert_eq!(last.ohlcv.close.value(), 150.0);
    assert_eq!(last.ohlcv.high.value(), 151.0);
}

#[test]
fn append_while_scrolled_back_keeps_window() {
    let (mut engine, _) = loaded_engine(config(500, 1_000), 10_000);
    engine.pan_by(1_000.0, 0.0);
    let window = engine.window();
    assert_eq!(window, Some(ViewportWindow::new(320, 399)));
    assert_eq!(engine.live_mode(), LiveMode::Historical);

    engine.apply_tick(tick_at(NEWEST + 1, 120.0));

    assert_eq!(engine.store().unwrap().len(), 501);
    assert_eq!(engine.window(), window);
    assert_eq!(engine.live_mode(), LiveMode::Historical);
    assert!(!engine.status().is_live);
}

#[test]
fn append_at_cap_while_scrolled_back_keeps_same_bars() {
    let (mut engine, _) = loaded_engine(config(500, 500), 10_000);
    engine.pan_by(1_000.0, 0.0);
    assert_eq!(engine.window(), Some(ViewportWindow::new(320, 399)));
    let shown = engine.store().unwrap().slice(320, 399).to_vec();

    engine.apply_tick(tick_at(NEWEST + 1, 120.0));

    let store = engine.store().unwrap();
    assert_eq!(store.len(), 500);
    assert_eq!(engine.window(), Some(ViewportWindow::new(319, 398)));
    assert_eq!(store.slice(319, 398), shown.as_slice());
    assert_eq!(engine.live_mode(), LiveMode::Historical);
    assert!(engine.buffer_range().unwrap().contains_window(&engine.window().unwrap()));
}
