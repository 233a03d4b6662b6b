mod common;

use common::{FakeFeed, FakeSource, ManualClock, config, fetch_tickets, loaded_engine, spy};
use futures::executor::block_on;
use price_viewport_wasm::application::{ChartSession, ViewportEngine};
use price_viewport_wasm::domain::chart::{FetchKind, ViewportWindow};
use price_viewport_wasm::domain::market_data::Timeframe;
use std::sync::Arc;

#[test]
fn trigger_near_oldest_bar_is_issued_once() {
    let (mut engine, _) = loaded_engine(config(200, 500), 10_000);
    engine.take_effects();

    engine.pan_by(1_150.0, 0.0);
    assert_eq!(engine.window(), Some(ViewportWindow::new(5, 84)));
    engine.pan_by(-5.0, 0.0);
    engine.pan_by(5.0, 0.0);
    engine.pan_by(5.0, 0.0);

    let tickets = fetch_tickets(&engine.take_effects());
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].points, 300);
    assert_eq!(tickets[0].kind, FetchKind::Expand);
    assert_eq!(engine.requested_points(), 300);
}

#[test]
fn session_expands_history_without_retriggering() {
    let mut engine =
        ViewportEngine::new(config(200, 500), Arc::new(ManualClock::default())).unwrap();
    engine.resize(800.0, 400.0);
    let session = ChartSession::new(engine, FakeSource::new(10_000), FakeFeed::default());

    block_on(session.select(spy(), Timeframe::OneMinute));
    assert_eq!(*session.source().calls.borrow(), vec![200]);

    session.engine_mut().pan_by(1_150.0, 0.0);
    let oldest_visible = {
        let engine = session.engine();
        let start = engine.window().unwrap().start_index;
        engine.store().unwrap().bars()[start].timestamp
    };
    block_on(session.drive());

    assert_eq!(*session.source().calls.borrow(), vec![200, 300]);
    let engine = session.engine();
    let window = engine.window().unwrap();
    assert_eq!(window, ViewportWindow::new(105, 184));
    assert_eq!(engine.store().unwrap().bars()[window.start_index].timestamp, oldest_visible);
    assert_eq!(engine.status().loaded_count, 300);
    assert!(engine.in_flight().is_none());
}

#[test]
fn short_response_stops_expansion() {
    let (mut engine, _) = loaded_engine(config(200, 500), 250);
    engine.take_effects();

    engine.pan_by(1_150.0, 0.0);
    let ticket = fetch_tickets(&engine.take_effects()).pop().unwrap();
    engine.apply_fetch(ticket, Ok(common::history(250)));
    assert!(engine.is_history_exhausted());

    engine.pan_by(10_000.0, 0.0);
    assert_eq!(engine.window().map(|w| w.start_index), Some(0));
    assert!(fetch_tickets(&engine.take_effects()).is_empty());
}
