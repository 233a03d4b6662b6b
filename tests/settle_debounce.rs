mod common;

use common::{config, loaded_engine};

#[test]
fn ticks_refresh_once_gestures_settle() {
    let (mut engine, clock) = loaded_engine(config(200, 500), 10_000);
    let ticks = engine.price_ticks().to_vec();
    assert!(!ticks.is_empty());

    engine.pan_by(0.0, 200.0);
    assert_eq!(engine.settle_in(), Some(150));
    clock.advance(100);
    engine.pan_by(0.0, 0.0);
    clock.advance(100);
    assert!(!engine.poll());
    assert_eq!(engine.price_ticks(), ticks.as_slice());

    clock.advance(50);
    assert!(engine.poll());
    assert!(engine.needs_render());
    assert_ne!(engine.price_ticks(), ticks.as_slice());
    assert!(!engine.poll());
}

#[test]
fn teardown_cancels_pending_settle() {
    let (mut engine, clock) = loaded_engine(config(200, 500), 10_000);
    engine.pan_by(30.0, 0.0);
    assert!(engine.settle_in().is_some());

    engine.teardown();
    clock.advance(1_000);

    assert_eq!(engine.settle_in(), None);
    assert!(!engine.poll());
}

#[test]
fn reset_cancels_pending_settle() {
    let (mut engine, clock) = loaded_engine(config(200, 500), 10_000);
    engine.pan_by(30.0, 0.0);
    engine.reset_transform();
    clock.advance(1_000);

    assert!(!engine.poll());
}
