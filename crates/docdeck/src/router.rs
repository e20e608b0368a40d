//! Global keyboard routing.
//!
//! One dispatch point for the whole page: every keydown is offered to the
//! active deck, and only to it. The return value says whether the event was
//! consumed (the app then swallows the key so nothing else reacts to it,
//! the equivalent of suppressing default browser behavior).

use std::time::Instant;

use eframe::egui;

use crate::page::Page;
use crate::platform::FullscreenHost;

/// Route one keydown. Returns true iff the event was consumed.
pub fn route(
    page: &mut Page,
    key: egui::Key,
    viewport: egui::Rect,
    host: &mut dyn FullscreenHost,
    now: Instant,
) -> bool {
    // 1. No active deck: the event is ignored entirely.
    let Some(id) = page.active_deck() else {
        return false;
    };
    let Some(deck) = page.deck(id) else {
        return false;
    };

    // 2. Eligibility: fullscreen always receives input; otherwise the deck
    // must sit fully inside the viewport (all four edges in bounds).
    let eligible = deck.is_fullscreen()
        || deck
            .last_rect
            .is_some_and(|rect| viewport.contains_rect(rect));
    if !eligible {
        return false;
    }

    // 3. Key table. Navigation shortcuts honor button enablement, not just
    // index bounds, so keyboard and pointer behavior never diverge.
    match key {
        egui::Key::ArrowLeft | egui::Key::PageUp => {
            if !deck.prev_allowed() {
                return false;
            }
            if let Some(deck) = page.deck_mut(id) {
                deck.prev();
            }
            page.note_interaction(id, now);
            true
        }
        egui::Key::ArrowRight | egui::Key::PageDown | egui::Key::Space => {
            if !deck.next_allowed() {
                return false;
            }
            if let Some(deck) = page.deck_mut(id) {
                deck.next();
            }
            page.note_interaction(id, now);
            true
        }
        egui::Key::Escape => {
            if deck.is_overview() {
                if let Some(deck) = page.deck_mut(id) {
                    deck.toggle_overview();
                }
                true
            } else if deck.is_fullscreen() {
                if deck.is_portrait() {
                    // Touch layouts exit through the close control's local
                    // path; the platform fullscreen API may be restricted.
                    page.close_fullscreen_local(id);
                } else {
                    page.toggle_fullscreen(id, host);
                }
                true
            } else {
                false
            }
        }
        egui::Key::O => {
            if let Some(deck) = page.deck_mut(id) {
                deck.toggle_overview();
            }
            true
        }
        _ => false,
    }
}
