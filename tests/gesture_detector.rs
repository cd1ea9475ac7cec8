use shortcut_panel::gesture::{ClickState, GestureDetector, GestureEvent};
use std::time::{Duration, Instant};

fn at(base: Instant, ms: u64) -> Instant {
    base + Duration::from_millis(ms)
}

/// Feed presses at the given offsets and return the offsets that fired.
fn fired_at(offsets: &[u64]) -> Vec<u64> {
    let base = Instant::now();
    let mut detector = GestureDetector::default();
    offsets
        .iter()
        .copied()
        .filter(|&ms| detector.feed(at(base, ms)).is_some())
        .collect()
}

#[test]
fn two_presses_within_window_fire_once() {
    assert_eq!(fired_at(&[0, 300]), vec![300]);
}

#[test]
fn press_right_after_gesture_does_not_fire() {
    let base = Instant::now();
    let mut detector = GestureDetector::default();
    assert_eq!(detector.feed(at(base, 0)), None);
    assert_eq!(detector.feed(at(base, 300)), Some(GestureEvent));
    assert_eq!(
        detector.state(),
        ClickState {
            last_click: None,
            click_count: 0
        }
    );

    assert_eq!(detector.feed(at(base, 301)), None);
    assert_eq!(detector.state().click_count, 1);
    assert_eq!(detector.feed(at(base, 700)), Some(GestureEvent));
}

#[test]
fn slow_presses_do_not_fire() {
    let base = Instant::now();
    let mut detector = GestureDetector::default();
    assert_eq!(detector.feed(at(base, 0)), None);
    assert_eq!(detector.feed(at(base, 600)), None);
    assert_eq!(
        detector.state(),
        ClickState {
            last_click: Some(at(base, 600)),
            click_count: 1
        }
    );
}

#[test]
fn exact_threshold_counts_as_within() {
    assert_eq!(fired_at(&[0, 500]), vec![500]);
    assert!(fired_at(&[0, 501]).is_empty());
}

#[test]
fn rapid_presses_fire_at_most_once_per_pair() {
    assert_eq!(fired_at(&[0, 100, 200, 300]), vec![100, 300]);
    assert_eq!(fired_at(&[0, 100, 200]), vec![100]);
}

#[test]
fn slow_press_rearms_window() {
    // 0 and 600 are too far apart, but 600 starts a new window that 900 completes.
    assert_eq!(fired_at(&[0, 600, 900]), vec![900]);
}

#[test]
fn count_never_exceeds_one_between_events() {
    let base = Instant::now();
    let mut detector = GestureDetector::default();
    for ms in [0, 50, 120, 900, 1000, 1300, 2500, 2600, 2650] {
        detector.feed(at(base, ms));
        assert!(detector.state().click_count <= 1);
    }
}

#[test]
fn no_two_gestures_share_a_press() {
    let offsets = [0, 10, 20, 30, 40, 50, 60];
    let fired = fired_at(&offsets);
    assert_eq!(fired, vec![10, 30, 50]);
}
