mod common;

use common::{config, loaded_engine};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

#[quickcheck]
fn window_stays_inside_store(len: u16, gestures: Vec<(f64, f64)>) -> TestResult {
    let len = usize::from(len % 500) + 1;
    let (mut engine, _) = loaded_engine(config(500, 500), len);

    for (pan, zoom) in gestures {
        engine.pan_by(pan, 0.0);
        engine.zoom_to(zoom);

        let Some(window) = engine.window() else {
            return TestResult::failed();
        };
        if window.start_index > window.end_index || window.end_index >= len {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn buffer_contains_window(len: u16, pans: Vec<i32>) -> TestResult {
    let len = usize::from(len % 500) + 1;
    let (mut engine, _) = loaded_engine(config(500, 500), len);

    for dx in pans {
        engine.pan_by(f64::from(dx % 2_000), 0.0);

        let (Some(window), Some(buffer)) = (engine.window(), engine.buffer_range()) else {
            return TestResult::failed();
        };
        if !buffer.contains_window(&window) || buffer.buffer_end >= len {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[test]
fn non_finite_gestures_are_ignored() {
    let (mut engine, _) = loaded_engine(config(500, 500), 10_000);
    let before = engine.transform();

    engine.pan_by(f64::NAN, 0.0);
    engine.pan_by(f64::INFINITY, 0.0);
    engine.zoom_to(f64::NAN);

    assert_eq!(engine.transform(), before);
}
