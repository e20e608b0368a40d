//! Viewport orientation and platform fullscreen-change monitoring.
//!
//! Runs every frame, independently of which deck is active. Presentation
//! mode is landscape-only: entering portrait forces any fullscreen deck out
//! and flags every deck for the touch layout. Leaving portrait clears the
//! flag and nothing else; fullscreen is never re-entered automatically.

use eframe::egui;

use crate::page::Page;
use crate::platform::FullscreenHost;

#[derive(Debug, Default)]
pub struct OrientationMonitor {
    /// None until the first poll, so load applies the initial orientation.
    portrait: Option<bool>,
    /// Last fullscreen state the platform reported, for edge detection of
    /// out-of-band exits (e.g. a platform-level Escape).
    platform_fullscreen: bool,
}

impl OrientationMonitor {
    /// Recompute portrait-vs-landscape from the viewport size and apply any
    /// transition to every deck on the page.
    pub fn poll(&mut self, page: &mut Page, size: egui::Vec2, host: &mut dyn FullscreenHost) {
        let portrait = size.y > size.x;
        if self.portrait == Some(portrait) {
            return;
        }
        self.portrait = Some(portrait);

        if portrait {
            let mut forced = false;
            for id in 0..page.deck_count() {
                let was_fullscreen = match page.deck_mut(id) {
                    Some(deck) => {
                        deck.set_portrait(true);
                        deck.is_fullscreen()
                    }
                    None => continue,
                };
                if was_fullscreen {
                    // Landscape-only presentation: leave fullscreen now.
                    if let Err(error) = host.exit() {
                        tracing::debug!(deck = id, %error, "platform exit during rotation");
                    }
                    page.close_fullscreen_local(id);
                    forced = true;
                }
            }
            if forced {
                tracing::info!("portrait rotation forced fullscreen exit");
            }
        } else {
            for deck in page.decks_mut() {
                deck.set_portrait(false);
            }
        }
    }

    /// Track the platform's own fullscreen flag. On a true→false edge that
    /// the controller did not initiate, resync deck flags via the local
    /// close path.
    pub fn observe_platform_fullscreen(&mut self, page: &mut Page, platform_fullscreen: bool) {
        let was = self.platform_fullscreen;
        self.platform_fullscreen = platform_fullscreen;
        if was && !platform_fullscreen {
            if let Some(id) = page.fullscreen_deck() {
                tracing::debug!(deck = id, "out-of-band fullscreen exit observed");
                page.close_fullscreen_local(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::test_decks::deck;
    use crate::platform::test_host::FakeHost;

    const LANDSCAPE: egui::Vec2 = egui::vec2(1280.0, 720.0);
    const PORTRAIT: egui::Vec2 = egui::vec2(720.0, 1280.0);

    fn two_deck_page() -> Page {
        Page::from_decks(vec![deck(&["a", "b"]), deck(&["x", "y"])])
    }

    #[test]
    fn initial_poll_applies_current_orientation_to_all_decks() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        monitor.poll(&mut page, PORTRAIT, &mut host);
        assert!(page.decks().iter().all(|d| d.is_portrait()));
    }

    #[test]
    fn entering_portrait_forces_fullscreen_exit_on_every_deck() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        monitor.poll(&mut page, LANDSCAPE, &mut host);
        page.toggle_fullscreen(1, &mut host);

        monitor.poll(&mut page, PORTRAIT, &mut host);
        assert!(!page.deck(1).unwrap().is_fullscreen());
        assert!(page.deck(0).unwrap().is_portrait());
        assert!(page.deck(1).unwrap().is_portrait());
    }

    #[test]
    fn leaving_portrait_clears_flag_without_reentering_fullscreen() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        monitor.poll(&mut page, LANDSCAPE, &mut host);
        page.toggle_fullscreen(0, &mut host);
        monitor.poll(&mut page, PORTRAIT, &mut host);
        monitor.poll(&mut page, LANDSCAPE, &mut host);

        let deck = page.deck(0).unwrap();
        assert!(!deck.is_portrait());
        assert!(!deck.is_fullscreen());
    }

    #[test]
    fn resize_without_orientation_change_is_inert() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        monitor.poll(&mut page, LANDSCAPE, &mut host);
        page.toggle_fullscreen(0, &mut host);
        let generation = page.layout_generation();

        monitor.poll(&mut page, egui::vec2(1920.0, 1080.0), &mut host);
        assert!(page.deck(0).unwrap().is_fullscreen());
        assert_eq!(page.layout_generation(), generation);
    }

    #[test]
    fn out_of_band_platform_exit_resyncs_the_deck_flag() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        page.toggle_fullscreen(0, &mut host);
        monitor.observe_platform_fullscreen(&mut page, true);
        // Platform-level Escape: the window left fullscreen on its own.
        monitor.observe_platform_fullscreen(&mut page, false);

        assert!(!page.deck(0).unwrap().is_fullscreen());
    }

    #[test]
    fn platform_staying_windowed_never_touches_decks() {
        let mut monitor = OrientationMonitor::default();
        let mut page = two_deck_page();
        let mut host = FakeHost::default();

        page.toggle_fullscreen(0, &mut host);
        // The platform has not yet applied the request; no edge, no resync.
        monitor.observe_platform_fullscreen(&mut page, false);
        assert!(page.deck(0).unwrap().is_fullscreen());
    }
}
