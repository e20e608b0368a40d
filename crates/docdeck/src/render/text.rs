//! Painter-based block drawing for slides.
//!
//! Slides are absolutely positioned inside their viewport rect, so blocks
//! are laid out with galleys against a running y cursor instead of egui's
//! widget flow. `scale` shrinks everything uniformly for overview tiles.

use eframe::egui;

use crate::diagram::{DiagramFit, RenderState};
use crate::parser::Block;
use crate::theme::Theme;

use super::syntax;

/// Draw one slide's blocks clipped to `rect`. `diagram_of` resolves a
/// placeholder slot to its render state and cached fit.
pub fn draw_blocks(
    ui: &egui::Ui,
    blocks: &[Block],
    diagram_of: &dyn Fn(usize) -> Option<(RenderState, Option<DiagramFit>)>,
    theme: &Theme,
    rect: egui::Rect,
    scale: f32,
) {
    let padding = 24.0 * scale;
    let content = rect.shrink(padding);
    if content.width() <= 0.0 || content.height() <= 0.0 {
        return;
    }
    let painter = ui.painter_at(rect);
    let mut y = content.top();

    for block in blocks {
        if y > content.bottom() {
            break;
        }
        match block {
            Block::Heading { level, text } => {
                let size = theme.heading_size(*level) * scale;
                let galley = painter.layout(
                    text.clone(),
                    egui::FontId::proportional(size),
                    theme.heading_color,
                    content.width(),
                );
                let height = galley.rect.height();
                painter.galley(egui::pos2(content.left(), y), galley, theme.heading_color);
                y += height + 12.0 * scale;
            }
            Block::Paragraph { text } => {
                let galley = painter.layout(
                    text.clone(),
                    egui::FontId::proportional(theme.body_size * scale),
                    theme.foreground,
                    content.width(),
                );
                let height = galley.rect.height();
                painter.galley(egui::pos2(content.left(), y), galley, theme.foreground);
                y += height + 10.0 * scale;
            }
            Block::List { ordered, items } => {
                for (n, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}. ", n + 1)
                    } else {
                        "• ".to_string()
                    };
                    let galley = painter.layout(
                        format!("{marker}{item}"),
                        egui::FontId::proportional(theme.body_size * scale),
                        theme.foreground,
                        content.width() - 16.0 * scale,
                    );
                    let height = galley.rect.height();
                    painter.galley(
                        egui::pos2(content.left() + 16.0 * scale, y),
                        galley,
                        theme.foreground,
                    );
                    y += height + 4.0 * scale;
                }
                y += 6.0 * scale;
            }
            Block::BlockQuote { text } => {
                let galley = painter.layout(
                    text.clone(),
                    egui::FontId::proportional(theme.body_size * scale),
                    theme.muted,
                    content.width() - 24.0 * scale,
                );
                let height = galley.rect.height();
                painter.line_segment(
                    [
                        egui::pos2(content.left() + 4.0 * scale, y),
                        egui::pos2(content.left() + 4.0 * scale, y + height),
                    ],
                    egui::Stroke::new(3.0 * scale, theme.accent),
                );
                painter.galley(
                    egui::pos2(content.left() + 24.0 * scale, y),
                    galley,
                    theme.muted,
                );
                y += height + 10.0 * scale;
            }
            Block::CodeBlock { language, code } => {
                let job = syntax::highlight_code(
                    code,
                    language.as_deref(),
                    theme,
                    theme.code_size * scale,
                );
                let galley = ui.fonts_mut(|fonts| fonts.layout_job(job));
                let height = galley.rect.height();
                let bg = egui::Rect::from_min_size(
                    egui::pos2(content.left(), y),
                    egui::vec2(content.width(), height + 16.0 * scale),
                );
                painter.rect_filled(bg, 4.0 * scale, theme.code_background);
                painter.galley(
                    egui::pos2(content.left() + 8.0 * scale, y + 8.0 * scale),
                    galley,
                    theme.code_foreground,
                );
                y += height + 26.0 * scale;
            }
            Block::Diagram { slot } => {
                y = draw_diagram(
                    ui, &painter, diagram_of, *slot, theme, content, y, scale,
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_diagram(
    ui: &egui::Ui,
    painter: &egui::Painter,
    diagram_of: &dyn Fn(usize) -> Option<(RenderState, Option<DiagramFit>)>,
    slot: usize,
    theme: &Theme,
    content: egui::Rect,
    y: f32,
    scale: f32,
) -> f32 {
    let Some((state, fit)) = diagram_of(slot) else {
        return y;
    };
    match state {
        RenderState::Rendered(markup) => {
            // Full width, intrinsic height: the cached fit sizes the
            // monospace font so the widest line spans the content width.
            let font_size = fit
                .map(|f| f.font_size)
                .unwrap_or(theme.code_size)
                * scale;
            let galley = ui.fonts_mut(|fonts| {
                fonts.layout_no_wrap(
                    markup,
                    egui::FontId::monospace(font_size),
                    theme.foreground,
                )
            });
            let height = galley.rect.height();
            painter.galley(egui::pos2(content.left(), y), galley, theme.foreground);
            y + height + 12.0 * scale
        }
        RenderState::Failed(message) => {
            let galley = painter.layout(
                format!("diagram failed to render: {message}"),
                egui::FontId::proportional(theme.body_size * 0.7 * scale),
                theme.error,
                content.width(),
            );
            let height = galley.rect.height();
            painter.galley(egui::pos2(content.left(), y), galley, theme.error);
            y + height + 12.0 * scale
        }
        RenderState::Unrendered | RenderState::Rendering => {
            // Show the raw source dimmed until the worker reports back.
            let galley = painter.layout(
                "rendering diagram…".to_string(),
                egui::FontId::proportional(theme.body_size * 0.7 * scale),
                theme.muted,
                content.width(),
            );
            let height = galley.rect.height();
            painter.galley(egui::pos2(content.left(), y), galley, theme.muted);
            y + height + 12.0 * scale
        }
    }
}

/// Draw document prose between decks, using egui's normal flow.
pub fn draw_prose(ui: &mut egui::Ui, text: &str, theme: &Theme) {
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        if let Some(heading) = paragraph.strip_prefix("# ") {
            ui.label(
                egui::RichText::new(heading)
                    .size(theme.h2_size * 0.8)
                    .color(theme.heading_color)
                    .strong(),
            );
        } else if let Some(heading) = paragraph.strip_prefix("## ") {
            ui.label(
                egui::RichText::new(heading)
                    .size(theme.h3_size * 0.8)
                    .color(theme.heading_color)
                    .strong(),
            );
        } else {
            ui.label(
                egui::RichText::new(paragraph)
                    .size(theme.body_size * 0.85)
                    .color(theme.foreground),
            );
        }
        ui.add_space(8.0);
    }
}
