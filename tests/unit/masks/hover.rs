use super::*;
use crate::foundation::core::Rgb;
use crate::masks::color_map::SegmentId;

fn hit(id: u32) -> SegmentHit {
    SegmentHit {
        segment_id: SegmentId(id),
        confidence: 0.5,
        color: Rgb::new(1, 2, 3),
        texel: (0, 0),
    }
}

#[test]
fn newest_ticket_wins_regardless_of_resolution_order() {
    let mut t = HoverTracker::new();
    let first = t.issue(1.0, 1.0);
    let second = t.issue(2.0, 2.0);

    assert!(t.resolve(second, Some(hit(2))));
    assert!(!t.resolve(first, Some(hit(1))));
    assert_eq!(t.current().map(|h| h.segment_id), Some(SegmentId(2)));
}

#[test]
fn miss_clears_current_hit() {
    let mut t = HoverTracker::new();
    let a = t.issue(0.0, 0.0);
    t.resolve(a, Some(hit(7)));
    let b = t.issue(5.0, 5.0);
    assert!(t.resolve(b, None));
    assert!(t.current().is_none());
}

#[test]
fn reset_makes_in_flight_results_stale() {
    let mut t = HoverTracker::new();
    let a = t.issue(0.0, 0.0);
    t.reset();
    assert!(!t.resolve(a, Some(hit(1))));
    assert!(t.current().is_none());
}
