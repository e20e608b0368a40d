//! One deck's state machine.
//!
//! A deck owns an ordered slide sequence, the current position, and the
//! normal/fullscreen/overview mode flags. All mutation goes through the
//! operations here; everything runs on the UI event loop, so there is no
//! locking. Cross-deck concerns (active tracker, hide timer, fullscreen
//! platform calls) live in [`crate::page`].

pub mod controls;

#[cfg(test)]
mod tests;

use eframe::egui;

use crate::diagram::Diagram;
use crate::parser::{DeckMarkup, SlideMarkup};
use controls::Controls;

pub struct Deck {
    title: String,
    slides: Vec<SlideMarkup>,
    diagrams: Vec<Diagram>,
    current: usize,
    fullscreen: bool,
    overview: bool,
    portrait: bool,
    controls_visible: bool,
    controls: Controls,
    /// Bounding box from the last draw pass, used by the input router's
    /// visibility check. None until the deck has been drawn once.
    pub last_rect: Option<egui::Rect>,
}

impl Deck {
    pub fn new(markup: DeckMarkup) -> Self {
        let controls = Controls::for_variant(markup.controls);
        let diagrams = markup
            .diagram_sources
            .into_iter()
            .map(Diagram::new)
            .collect();
        let mut deck = Self {
            title: markup.title,
            slides: markup.slides,
            diagrams,
            current: 0,
            fullscreen: false,
            overview: false,
            portrait: false,
            controls_visible: true,
            controls,
            last_rect: None,
        };
        deck.refresh_controls();
        deck
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[SlideMarkup] {
        &self.slides
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Exactly one slide is visible: the one at `current`.
    pub fn is_slide_visible(&self, index: usize) -> bool {
        index == self.current
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_overview(&self) -> bool {
        self.overview
    }

    pub fn is_portrait(&self) -> bool {
        self.portrait
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn diagrams(&self) -> &[Diagram] {
        &self.diagrams
    }

    pub fn diagrams_mut(&mut self) -> impl Iterator<Item = &mut Diagram> {
        self.diagrams.iter_mut()
    }

    pub fn diagram(&self, slot: usize) -> Option<&Diagram> {
        self.diagrams.get(slot)
    }

    pub fn diagram_mut(&mut self, slot: usize) -> Option<&mut Diagram> {
        self.diagrams.get_mut(slot)
    }

    /// Diagram slots referenced by one slide, for the fit pre-pass.
    pub fn slide_diagram_slots(&self, index: usize) -> Vec<usize> {
        let Some(slide) = self.slides.get(index) else {
            return Vec::new();
        };
        slide
            .blocks
            .iter()
            .filter_map(|block| match block {
                crate::parser::Block::Diagram { slot } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    /// Jump to `index`. Out of range is a safe no-op; callers that want
    /// clamping use `prev`/`next`.
    pub fn go_to(&mut self, index: usize) {
        if index >= self.slide_count() {
            return;
        }
        self.current = index;
        self.refresh_controls();
    }

    /// Step back one slide; no-op (no wrap) at the first slide.
    pub fn prev(&mut self) {
        if self.current > 0 {
            self.go_to(self.current - 1);
        }
    }

    /// Step forward one slide; no-op (no wrap) at the last slide.
    pub fn next(&mut self) {
        if self.current + 1 < self.slide_count() {
            self.go_to(self.current + 1);
        }
    }

    /// Whether a backward step may be triggered. Mirrors the prev button's
    /// enabled state; a deck without nav buttons falls back to the index
    /// bound so keyboard-only decks stay navigable.
    pub fn prev_allowed(&self) -> bool {
        match self.controls.prev {
            Some(button) => button.enabled,
            None => self.current > 0,
        }
    }

    pub fn next_allowed(&self) -> bool {
        match self.controls.next {
            Some(button) => button.enabled,
            None => self.current + 1 < self.slide_count(),
        }
    }

    pub fn toggle_overview(&mut self) {
        self.overview = !self.overview;
    }

    /// Selecting an overview tile jumps to it and closes the overview, even
    /// when the index is out of range (the jump no-ops, the overview still
    /// closes).
    pub fn select_overview_tile(&mut self, index: usize) {
        self.go_to(index);
        self.overview = false;
    }

    pub fn set_portrait(&mut self, portrait: bool) {
        self.portrait = portrait;
    }

    /// Flag-only fullscreen exit: touch close control, orientation forcing,
    /// and out-of-band platform exits. Never calls the platform API.
    pub fn close_fullscreen_local(&mut self) {
        self.fullscreen = false;
    }

    pub(crate) fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub(crate) fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }

    fn refresh_controls(&mut self) {
        let count = self.slide_count();
        if count == 0 {
            return;
        }
        self.controls.set_progress(self.current, count);
        self.controls.set_prev_enabled(self.current > 0);
        self.controls.set_next_enabled(self.current + 1 < count);
    }
}
