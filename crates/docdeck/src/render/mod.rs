//! Drawing the page and its deck widgets.
//!
//! Drawing never mutates navigation state directly; pointer interactions
//! come back as [`DeckEvent`]s the app applies through the page, so the
//! same operations serve pointer and keyboard input. Clicks land on the
//! deck widgets themselves (egui sense), so they never leak to page-level
//! handlers.

pub mod syntax;
pub mod text;

use eframe::egui;

use crate::deck::Deck;
use crate::diagram::{DiagramFit, RenderState};
use crate::page::{DeckId, PageSegment, PageView};
use crate::theme::Theme;

const DECK_MAX_WIDTH: f32 = 960.0;
const SLIDE_ASPECT: f32 = 9.0 / 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeckEvent {
    /// Pointer entered or clicked the deck; it becomes the active deck.
    Activate(DeckId),
    /// Qualifying interaction for the controls-visibility timer.
    Interact(DeckId),
    Prev(DeckId),
    Next(DeckId),
    ToggleOverview(DeckId),
    CloseOverview(DeckId),
    ToggleFullscreen(DeckId),
    CloseFullscreenLocal(DeckId),
    SelectTile(DeckId, usize),
}

/// Draw the scrollable document: prose, notices, and embedded decks.
pub fn draw_page(ui: &mut egui::Ui, view: &mut PageView<'_>, theme: &Theme) -> Vec<DeckEvent> {
    let mut events = Vec::new();
    for segment in view.segments {
        match segment {
            PageSegment::Prose(prose) => text::draw_prose(ui, prose, theme),
            PageSegment::Notice(message) => {
                ui.label(
                    egui::RichText::new(format!("⚠ {message}"))
                        .color(theme.error)
                        .size(theme.body_size * 0.8),
                );
                ui.add_space(8.0);
            }
            PageSegment::Deck(id) => {
                if let Some(deck) = view.decks.get_mut(*id) {
                    draw_deck_embedded(
                        ui,
                        deck,
                        *id,
                        view.active == Some(*id),
                        view.generation,
                        theme,
                        &mut events,
                    );
                }
                ui.add_space(16.0);
            }
        }
    }
    events
}

/// Draw one deck taking over the whole window (fullscreen presentation).
pub fn draw_fullscreen(
    ui: &mut egui::Ui,
    deck: &mut Deck,
    id: DeckId,
    generation: u64,
    theme: &Theme,
) -> Vec<DeckEvent> {
    let mut events = Vec::new();
    let rect = ui.max_rect();
    deck.last_rect = Some(rect);

    ui.painter().rect_filled(rect, 0.0, theme.deck_background);
    fit_diagrams(deck, rect.width() - 48.0, generation);

    if deck.is_overview() {
        draw_overview_grid(ui, deck, id, rect, theme, &mut events);
    } else {
        let index = deck.current();
        let diagram_of = diagram_lookup(deck);
        if let Some(slide) = deck.slides().get(index) {
            text::draw_blocks(ui, &slide.blocks, &diagram_of, theme, rect, 1.0);
        }
    }

    let response = ui.interact(rect, egui::Id::new(("deck-fs", id)), egui::Sense::click());
    if response.clicked() {
        events.push(DeckEvent::Activate(id));
        events.push(DeckEvent::Interact(id));
    }

    // On-screen controls ride on the hide timer while presenting.
    if deck.controls_visible() {
        if deck.is_portrait() {
            draw_touch_controls(ui, deck, id, rect, theme, &mut events);
        } else {
            let bar = egui::Rect::from_center_size(
                egui::pos2(rect.center().x, rect.bottom() - 36.0),
                egui::vec2(rect.width().min(420.0), 40.0),
            );
            let mut bar_ui = ui.new_child(egui::UiBuilder::new().max_rect(bar).id_salt(("fs-bar", id)));
            bar_ui.horizontal_centered(|ui| {
                draw_control_bar(ui, deck, id, &mut events);
            });
        }
    }
    events
}

fn draw_deck_embedded(
    ui: &mut egui::Ui,
    deck: &mut Deck,
    id: DeckId,
    is_active: bool,
    generation: u64,
    theme: &Theme,
    events: &mut Vec<DeckEvent>,
) {
    let width = ui.available_width().min(DECK_MAX_WIDTH);
    let height = width * SLIDE_ASPECT;

    let outer = ui
        .vertical(|ui| {
            ui.label(
                egui::RichText::new(deck.title())
                    .size(13.0)
                    .color(theme.muted),
            );

            // Slide viewport. Sense::click keeps deck clicks on the deck.
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::click());
            ui.painter().rect_filled(rect, 6.0, theme.deck_background);

            fit_diagrams(deck, rect.width() - 48.0, generation);

            if deck.is_overview() {
                draw_overview_grid(ui, deck, id, rect, theme, events);
            } else {
                let index = deck.current();
                let diagram_of = diagram_lookup(deck);
                if let Some(slide) = deck.slides().get(index) {
                    text::draw_blocks(ui, &slide.blocks, &diagram_of, theme, rect, width / 1280.0);
                }
            }

            let border = if is_active {
                egui::Stroke::new(2.0, theme.accent)
            } else {
                egui::Stroke::new(1.0, theme.muted)
            };
            ui.painter()
                .rect_stroke(rect, 6.0, border, egui::StrokeKind::Outside);

            if response.clicked() {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::Interact(id));
            }
            if response.hovered() {
                events.push(DeckEvent::Activate(id));
            }

            if deck.is_portrait() {
                draw_touch_controls(ui, deck, id, rect, theme, events);
            } else {
                ui.horizontal(|ui| {
                    draw_control_bar(ui, deck, id, events);
                });
            }
        })
        .response;

    deck.last_rect = Some(outer.rect);
}

/// Desktop control bar: nav cluster, progress readout, mode toggles.
/// Every control is optional; absent ones simply are not drawn.
fn draw_control_bar(ui: &mut egui::Ui, deck: &Deck, id: DeckId, events: &mut Vec<DeckEvent>) {
    let controls = deck.controls();

    if let Some(button) = controls.prev {
        if ui
            .add_enabled(button.enabled, egui::Button::new("←"))
            .on_hover_text("Previous (← / PageUp)")
            .clicked()
        {
            events.push(DeckEvent::Activate(id));
            events.push(DeckEvent::Prev(id));
        }
    }
    if let Some(progress) = &controls.progress {
        ui.monospace(&progress.text);
    }
    if let Some(button) = controls.next {
        if ui
            .add_enabled(button.enabled, egui::Button::new("→"))
            .on_hover_text("Next (→ / PageDown / Space)")
            .clicked()
        {
            events.push(DeckEvent::Activate(id));
            events.push(DeckEvent::Next(id));
        }
    }

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if let Some(button) = controls.fullscreen_toggle {
            if ui
                .add_enabled(button.enabled, egui::Button::new("⛶"))
                .on_hover_text("Toggle fullscreen")
                .clicked()
            {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::ToggleFullscreen(id));
            }
        }
        if let Some(button) = controls.overview_toggle {
            if ui
                .add_enabled(button.enabled, egui::Button::new("⊞"))
                .on_hover_text("Toggle overview (O)")
                .clicked()
            {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::ToggleOverview(id));
            }
        }
    });
}

/// Touch variant: big prev/overview/next bar plus a floating close while
/// fullscreen.
fn draw_touch_controls(
    ui: &mut egui::Ui,
    deck: &Deck,
    id: DeckId,
    rect: egui::Rect,
    theme: &Theme,
    events: &mut Vec<DeckEvent>,
) {
    let controls = deck.controls();
    ui.horizontal(|ui| {
        if let Some(button) = controls.touch_prev {
            if ui
                .add_enabled(button.enabled, egui::Button::new("←").min_size(egui::vec2(64.0, 36.0)))
                .clicked()
            {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::Prev(id));
            }
        }
        if let Some(button) = controls.touch_overview {
            if ui
                .add_enabled(button.enabled, egui::Button::new("⊞").min_size(egui::vec2(64.0, 36.0)))
                .clicked()
            {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::ToggleOverview(id));
            }
        }
        if let Some(button) = controls.touch_next {
            if ui
                .add_enabled(button.enabled, egui::Button::new("→").min_size(egui::vec2(64.0, 36.0)))
                .clicked()
            {
                events.push(DeckEvent::Activate(id));
                events.push(DeckEvent::Next(id));
            }
        }
    });

    if deck.is_fullscreen() && controls.touch_close.is_some() {
        let close = egui::Rect::from_center_size(
            egui::pos2(rect.right() - 28.0, rect.top() + 28.0),
            egui::vec2(36.0, 36.0),
        );
        let response = ui.interact(close, egui::Id::new(("touch-close", id)), egui::Sense::click());
        ui.painter()
            .text(
                close.center(),
                egui::Align2::CENTER_CENTER,
                "×",
                egui::FontId::proportional(28.0),
                theme.foreground,
            );
        if response.clicked() {
            events.push(DeckEvent::Activate(id));
            events.push(DeckEvent::CloseFullscreenLocal(id));
        }
    }
}

/// All slides at reduced scale for direct selection.
fn draw_overview_grid(
    ui: &mut egui::Ui,
    deck: &Deck,
    id: DeckId,
    rect: egui::Rect,
    theme: &Theme,
    events: &mut Vec<DeckEvent>,
) {
    let count = deck.slide_count();
    let cols = grid_columns(count);
    let rows = count.div_ceil(cols);
    let gap = 8.0;
    let padding = 16.0;

    let grid = rect.shrink(padding);
    let cell_w = (grid.width() - gap * (cols as f32 - 1.0)) / cols as f32;
    let cell_h = (grid.height() - gap * (rows as f32 - 1.0)) / rows as f32;
    let diagram_of = diagram_lookup(deck);

    for index in 0..count {
        let col = index % cols;
        let row = index / cols;
        let cell = egui::Rect::from_min_size(
            egui::pos2(
                grid.left() + col as f32 * (cell_w + gap),
                grid.top() + row as f32 * (cell_h + gap),
            ),
            egui::vec2(cell_w, cell_h),
        );

        ui.painter().rect_filled(cell, 4.0, theme.deck_background);
        if let Some(slide) = deck.slides().get(index) {
            text::draw_blocks(ui, &slide.blocks, &diagram_of, theme, cell, cell_w / 1280.0);
        }

        // Slide number badge.
        ui.painter().text(
            cell.left_top() + egui::vec2(6.0, 6.0),
            egui::Align2::LEFT_TOP,
            format!("{}", index + 1),
            egui::FontId::monospace(11.0),
            Theme::with_opacity(theme.foreground, 0.6),
        );

        let stroke = if deck.is_slide_visible(index) {
            egui::Stroke::new(2.0, theme.accent)
        } else {
            egui::Stroke::new(1.0, theme.muted)
        };
        ui.painter()
            .rect_stroke(cell, 4.0, stroke, egui::StrokeKind::Outside);

        let response = ui.interact(cell, egui::Id::new(("tile", id, index)), egui::Sense::click());
        if response.clicked() {
            events.push(DeckEvent::Activate(id));
            events.push(DeckEvent::SelectTile(id, index));
        }
    }

    if deck.controls().overview_close.is_some() {
        let close = egui::Rect::from_center_size(
            egui::pos2(rect.right() - 18.0, rect.top() + 18.0),
            egui::vec2(28.0, 28.0),
        );
        let response = ui.interact(close, egui::Id::new(("ov-close", id)), egui::Sense::click());
        ui.painter().text(
            close.center(),
            egui::Align2::CENTER_CENTER,
            "×",
            egui::FontId::proportional(22.0),
            theme.foreground,
        );
        if response.clicked() {
            events.push(DeckEvent::Activate(id));
            events.push(DeckEvent::CloseOverview(id));
        }
    }
}

fn grid_columns(count: usize) -> usize {
    if count <= 4 {
        2
    } else if count <= 9 {
        3
    } else {
        4
    }
}

/// Recompute cached full-width fits for the current slide's diagrams when
/// the layout generation moved (fullscreen toggles, resizes).
fn fit_diagrams(deck: &mut Deck, content_width: f32, generation: u64) {
    for slot in deck.slide_diagram_slots(deck.current()) {
        let code_size = 14.0;
        if let Some(diagram) = deck.diagram_mut(slot) {
            if diagram.fit.is_some_and(|fit| fit.generation == generation) {
                continue;
            }
            let RenderState::Rendered(markup) = &diagram.state else {
                continue;
            };
            let widest = markup
                .lines()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(1)
                .max(1);
            // Monospace glyphs are ~0.6 em wide; solve for the font size
            // that makes the widest line span the content width.
            let font_size = (content_width / (widest as f32 * 0.6)).clamp(6.0, code_size);
            diagram.fit = Some(DiagramFit {
                generation,
                font_size,
            });
        }
    }
}

fn diagram_lookup(deck: &Deck) -> impl Fn(usize) -> Option<(RenderState, Option<DiagramFit>)> + '_ {
    move |slot| {
        deck.diagram(slot)
            .map(|diagram| (diagram.state.clone(), diagram.fit))
    }
}
