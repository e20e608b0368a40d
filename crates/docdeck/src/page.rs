//! The page: every deck parsed from one document, plus the process-wide
//! state they share.
//!
//! The active-deck handle, the controls-visibility timer, and the layout
//! generation counter are singletons here by design: one page per process,
//! one UI event loop, no locks. The active handle is weak: a reload that
//! removes the referenced deck invalidates it rather than keeping a dangling
//! index alive.

use std::time::{Duration, Instant};

use crate::deck::Deck;
use crate::parser::{MarkupSegment, PageMarkup};
use crate::platform::FullscreenHost;

pub type DeckId = usize;

/// Fullscreen on-screen controls hide after this much idle time.
pub const HIDE_CONTROLS_AFTER: Duration = Duration::from_millis(3000);

/// The single pending hide deadline. A new qualifying interaction replaces
/// any pending one; timers never stack.
#[derive(Debug, Default)]
pub struct HideTimer {
    pending: Option<(DeckId, Instant)>,
}

impl HideTimer {
    pub fn poke(&mut self, deck: DeckId, now: Instant) {
        self.pending = Some((deck, now + HIDE_CONTROLS_AFTER));
    }

    pub fn cancel(&mut self, deck: DeckId) {
        if self.pending.is_some_and(|(owner, _)| owner == deck) {
            self.pending = None;
        }
    }

    /// Take the owner if the deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Option<DeckId> {
        let (owner, deadline) = self.pending?;
        if now >= deadline {
            self.pending = None;
            Some(owner)
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }
}

/// A renderable segment of the page, in document order.
pub enum PageSegment {
    Prose(String),
    Deck(DeckId),
    /// A deck block that failed to parse, degraded to an inline notice.
    Notice(String),
}

pub struct Page {
    segments: Vec<PageSegment>,
    decks: Vec<Deck>,
    active: Option<DeckId>,
    hide_timer: HideTimer,
    layout_generation: u64,
}

/// Borrow-split view handed to the draw pass.
pub struct PageView<'a> {
    pub segments: &'a [PageSegment],
    pub decks: &'a mut [Deck],
    pub active: Option<DeckId>,
    pub generation: u64,
}

impl Page {
    pub fn from_markup(markup: PageMarkup) -> Self {
        let mut segments = Vec::new();
        let mut decks = Vec::new();
        for segment in markup.segments {
            match segment {
                MarkupSegment::Prose(text) => segments.push(PageSegment::Prose(text)),
                MarkupSegment::Invalid { message } => {
                    segments.push(PageSegment::Notice(message));
                }
                MarkupSegment::Deck(deck_markup) => {
                    let id = decks.len();
                    decks.push(Deck::new(deck_markup));
                    segments.push(PageSegment::Deck(id));
                }
            }
        }
        Self {
            segments,
            decks,
            active: None,
            hide_timer: HideTimer::default(),
            layout_generation: 0,
        }
    }

    pub fn deck_count(&self) -> usize {
        self.decks.len()
    }

    pub fn deck(&self, id: DeckId) -> Option<&Deck> {
        self.decks.get(id)
    }

    pub fn deck_mut(&mut self, id: DeckId) -> Option<&mut Deck> {
        self.decks.get_mut(id)
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn decks_mut(&mut self) -> &mut [Deck] {
        &mut self.decks
    }

    /// The deck currently targeted by global keyboard input, if any.
    pub fn active_deck(&self) -> Option<DeckId> {
        self.active
    }

    /// Make `id` the active deck. Called on pointer enter, on any click
    /// inside the deck, and on fullscreen entry. Stickiness is deliberate:
    /// nothing ever clears this except another deck taking over or the deck
    /// disappearing on reload.
    pub fn activate(&mut self, id: DeckId) {
        if id < self.decks.len() {
            self.active = Some(id);
        }
    }

    /// The deck currently presented fullscreen, if any.
    pub fn fullscreen_deck(&self) -> Option<DeckId> {
        self.decks.iter().position(Deck::is_fullscreen)
    }

    /// Flip fullscreen for `id` through the platform host.
    ///
    /// Entry that the platform denies leaves the deck's flag unchanged. The
    /// layout-resize notification fires after every call, success or not;
    /// diagram fitting listens for it.
    pub fn toggle_fullscreen(&mut self, id: DeckId, host: &mut dyn FullscreenHost) {
        if let Some(deck) = self.decks.get_mut(id) {
            if deck.is_fullscreen() {
                match host.exit() {
                    Ok(()) => {
                        deck.set_fullscreen(false);
                        self.hide_timer.cancel(id);
                    }
                    Err(error) => {
                        tracing::warn!(deck = id, %error, "platform fullscreen exit failed");
                    }
                }
            } else {
                match host.request(id) {
                    Ok(()) => {
                        deck.set_fullscreen(true);
                        deck.set_controls_visible(true);
                        self.active = Some(id);
                    }
                    Err(error) => {
                        tracing::warn!(deck = id, %error, "platform fullscreen request denied");
                    }
                }
            }
        }
        self.notify_resize();
    }

    /// Flag-only fullscreen exit for `id`: the touch close control, portrait
    /// forcing, and out-of-band platform exits.
    pub fn close_fullscreen_local(&mut self, id: DeckId) {
        let Some(deck) = self.decks.get_mut(id) else {
            return;
        };
        if !deck.is_fullscreen() {
            return;
        }
        deck.close_fullscreen_local();
        self.hide_timer.cancel(id);
        self.notify_resize();
    }

    /// Global layout-resize notification: bump the generation so every
    /// cached diagram fit (any deck) recomputes on its next draw.
    pub fn notify_resize(&mut self) {
        self.layout_generation += 1;
    }

    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    /// A qualifying interaction on `id`: while fullscreen, show the controls
    /// and restart the single process-wide hide deadline.
    pub fn note_interaction(&mut self, id: DeckId, now: Instant) {
        let Some(deck) = self.decks.get_mut(id) else {
            return;
        };
        if deck.is_fullscreen() {
            deck.set_controls_visible(true);
            self.hide_timer.poke(id, now);
        }
    }

    /// Expire the hide timer if due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(owner) = self.hide_timer.expire(now) {
            if let Some(deck) = self.decks.get_mut(owner) {
                deck.set_controls_visible(false);
            }
        }
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_timer.deadline()
    }

    /// Carry what survives a document reload: per-position slide indices and
    /// the active handle (dropped if its deck no longer exists).
    pub fn carry_over_from(&mut self, previous: &Page) {
        for (id, deck) in self.decks.iter_mut().enumerate() {
            if let Some(old) = previous.deck(id) {
                let index = old.current().min(deck.slide_count().saturating_sub(1));
                deck.go_to(index);
                deck.set_portrait(old.is_portrait());
            }
        }
        self.active = previous.active.filter(|&id| id < self.decks.len());
        self.layout_generation = previous.layout_generation + 1;
    }

    /// Split borrows for the draw pass: segments stay immutable while decks
    /// are drawn (and their cached rects/fits updated).
    pub fn view_mut(&mut self) -> PageView<'_> {
        PageView {
            segments: &self.segments,
            decks: &mut self.decks,
            active: self.active,
            generation: self.layout_generation,
        }
    }

    /// Build a page straight from decks, bypassing markup. Test scaffolding.
    #[cfg(test)]
    pub(crate) fn from_decks(decks: Vec<Deck>) -> Self {
        let segments = (0..decks.len()).map(PageSegment::Deck).collect();
        Self {
            segments,
            decks,
            active: None,
            hide_timer: HideTimer::default(),
            layout_generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::test_decks::deck;
    use crate::platform::test_host::FakeHost;

    fn page_of(decks: Vec<Deck>) -> Page {
        Page::from_decks(decks)
    }

    #[test]
    fn activation_is_sticky_until_another_deck_takes_over() {
        let mut page = page_of(vec![deck(&["a1", "a2"]), deck(&["b1", "b2"])]);
        assert_eq!(page.active_deck(), None);

        page.activate(0);
        assert_eq!(page.active_deck(), Some(0));

        // Pointer leaving deck 0 clears nothing; only activating deck 1 does.
        page.activate(1);
        assert_eq!(page.active_deck(), Some(1));
    }

    #[test]
    fn activating_unknown_deck_is_ignored() {
        let mut page = page_of(vec![deck(&["a"])]);
        page.activate(7);
        assert_eq!(page.active_deck(), None);
    }

    #[test]
    fn fullscreen_entry_marks_deck_active_and_bumps_generation() {
        let mut page = page_of(vec![deck(&["a"]), deck(&["b"])]);
        let mut host = FakeHost::default();
        let before = page.layout_generation();

        page.toggle_fullscreen(1, &mut host);

        assert!(page.deck(1).unwrap().is_fullscreen());
        assert_eq!(page.active_deck(), Some(1));
        assert_eq!(host.requests, vec![1]);
        assert_eq!(page.layout_generation(), before + 1);
    }

    #[test]
    fn double_toggle_restores_mode_and_index() {
        let mut page = page_of(vec![deck(&["a", "b", "c"])]);
        let mut host = FakeHost::default();
        page.deck_mut(0).unwrap().go_to(1);

        page.toggle_fullscreen(0, &mut host);
        page.toggle_fullscreen(0, &mut host);

        let deck = page.deck(0).unwrap();
        assert!(!deck.is_fullscreen());
        assert_eq!(deck.current(), 1);
        assert_eq!(host.exits, 1);
    }

    #[test]
    fn denied_request_leaves_mode_flag_unset_but_still_notifies() {
        let mut page = page_of(vec![deck(&["a"])]);
        let mut host = FakeHost::denying();
        let before = page.layout_generation();

        page.toggle_fullscreen(0, &mut host);

        assert!(!page.deck(0).unwrap().is_fullscreen());
        assert_eq!(page.active_deck(), None);
        assert_eq!(page.layout_generation(), before + 1);
    }

    #[test]
    fn hide_timer_replaces_rather_than_stacks() {
        let mut timer = HideTimer::default();
        let start = Instant::now();
        timer.poke(0, start);
        // A later interaction pushes the single deadline out.
        timer.poke(0, start + Duration::from_millis(2000));

        assert_eq!(timer.expire(start + HIDE_CONTROLS_AFTER), None);
        assert_eq!(
            timer.expire(start + Duration::from_millis(2000) + HIDE_CONTROLS_AFTER),
            Some(0)
        );
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn interaction_outside_fullscreen_does_not_arm_timer() {
        let mut page = page_of(vec![deck(&["a"])]);
        page.note_interaction(0, Instant::now());
        assert!(page.hide_deadline().is_none());
    }

    #[test]
    fn expiry_hides_the_owning_decks_controls() {
        let mut page = page_of(vec![deck(&["a"])]);
        let mut host = FakeHost::default();
        page.toggle_fullscreen(0, &mut host);

        let start = Instant::now();
        page.note_interaction(0, start);
        assert!(page.deck(0).unwrap().controls_visible());

        page.tick(start + HIDE_CONTROLS_AFTER);
        assert!(!page.deck(0).unwrap().controls_visible());
    }

    #[test]
    fn local_close_cancels_the_timer() {
        let mut page = page_of(vec![deck(&["a"])]);
        let mut host = FakeHost::default();
        page.toggle_fullscreen(0, &mut host);
        let start = Instant::now();
        page.note_interaction(0, start);

        page.close_fullscreen_local(0);
        assert!(!page.deck(0).unwrap().is_fullscreen());
        assert!(page.hide_deadline().is_none());
        // No platform exit call was made on the local path.
        assert_eq!(host.exits, 0);
    }

    #[test]
    fn carry_over_preserves_position_and_invalidates_dangling_active() {
        let mut old = page_of(vec![deck(&["a", "b", "c"]), deck(&["x"])]);
        old.deck_mut(0).unwrap().go_to(2);
        old.activate(1);

        // Reload drops the second deck and shortens the first.
        let mut fresh = page_of(vec![deck(&["a", "b"])]);
        fresh.carry_over_from(&old);

        assert_eq!(fresh.deck(0).unwrap().current(), 1);
        assert_eq!(fresh.active_deck(), None);
    }
}
