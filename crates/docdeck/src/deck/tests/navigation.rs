//! Slide index, progress readout, and button enablement.

use crate::deck::test_decks::{deck, deck_with};
use crate::deck::controls::ControlsVariant;

fn progress(deck: &crate::deck::Deck) -> &str {
    &deck
        .controls()
        .progress
        .as_ref()
        .expect("full variant has a readout")
        .text
}

#[test]
fn construction_shows_the_first_slide_only() {
    let d = deck(&["one", "two", "three"]);
    assert_eq!(d.current(), 0);
    assert!(d.is_slide_visible(0));
    assert!(!d.is_slide_visible(1));
    assert!(!d.is_slide_visible(2));
    assert_eq!(progress(&d), "1 / 3");
}

#[test]
fn go_to_updates_progress_and_enablement() {
    let mut d = deck(&["one", "two", "three"]);
    for i in 0..3 {
        d.go_to(i);
        assert_eq!(progress(&d), format!("{} / 3", i + 1));
        assert_eq!(d.controls().prev.unwrap().enabled, i > 0);
        assert_eq!(d.controls().next.unwrap().enabled, i < 2);
    }
}

#[test]
fn go_to_out_of_range_is_a_safe_no_op() {
    let mut d = deck(&["one", "two"]);
    d.go_to(1);
    d.go_to(2);
    d.go_to(usize::MAX);
    assert_eq!(d.current(), 1);
    assert_eq!(progress(&d), "2 / 2");
}

#[test]
fn prev_at_first_slide_does_not_wrap() {
    let mut d = deck(&["one", "two"]);
    d.prev();
    assert_eq!(d.current(), 0);
    assert!(d.is_slide_visible(0));
}

#[test]
fn next_at_last_slide_does_not_wrap() {
    let mut d = deck(&["one", "two"]);
    d.go_to(1);
    d.next();
    assert_eq!(d.current(), 1);
    assert!(d.is_slide_visible(1));
}

#[test]
fn single_slide_deck_disables_both_directions() {
    let d = deck(&["only"]);
    assert!(!d.controls().prev.unwrap().enabled);
    assert!(!d.controls().next.unwrap().enabled);
    assert!(!d.prev_allowed());
    assert!(!d.next_allowed());
}

#[test]
fn touch_buttons_track_the_same_enablement() {
    let mut d = deck(&["one", "two"]);
    assert!(!d.controls().touch_prev.unwrap().enabled);
    assert!(d.controls().touch_next.unwrap().enabled);
    d.next();
    assert!(d.controls().touch_prev.unwrap().enabled);
    assert!(!d.controls().touch_next.unwrap().enabled);
}

#[test]
fn minimal_deck_has_no_mode_toggles_but_navigates() {
    let mut d = deck_with(&["one", "two"], ControlsVariant::Minimal);
    assert!(d.controls().overview_toggle.is_none());
    assert!(d.controls().fullscreen_toggle.is_none());
    d.next();
    assert_eq!(d.current(), 1);
    assert_eq!(progress(&d), "2 / 2");
}
