//! Code block highlighting via syntect.

use std::sync::OnceLock;

use eframe::egui::text::LayoutJob;
use eframe::egui::{Color32, FontId, TextFormat};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::theme::Theme;

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

/// Lay out a code block, highlighted when the language is known, plain
/// monospace otherwise.
pub fn highlight_code(code: &str, language: Option<&str>, theme: &Theme, font_size: f32) -> LayoutJob {
    let font = FontId::monospace(font_size);
    let mut job = LayoutJob::default();

    let syntax = language.and_then(|l| {
        syntax_set()
            .find_syntax_by_token(l)
            .or_else(|| syntax_set().find_syntax_by_extension(l))
    });

    let Some(syntax) = syntax else {
        job.append(
            code,
            0.0,
            TextFormat::simple(font, theme.code_foreground),
        );
        return job;
    };

    let syntect_theme_name = if theme.name == "dark" {
        "base16-eighties.dark"
    } else {
        "InspiredGitHub"
    };
    let Some(syntect_theme) = theme_set().themes.get(syntect_theme_name) else {
        job.append(code, 0.0, TextFormat::simple(font, theme.code_foreground));
        return job;
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    for line in syntect::util::LinesWithEndings::from(code) {
        let Ok(regions) = highlighter.highlight_line(line, syntax_set()) else {
            job.append(line, 0.0, TextFormat::simple(font.clone(), theme.code_foreground));
            continue;
        };
        for (style, text) in regions {
            let color = Color32::from_rgb(
                style.foreground.r,
                style.foreground.g,
                style.foreground.b,
            );
            job.append(text, 0.0, TextFormat::simple(font.clone(), color));
        }
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_plain_monospace() {
        let theme = Theme::dark();
        let job = highlight_code("whatever", Some("no-such-lang"), &theme, 14.0);
        assert_eq!(job.sections.len(), 1);
        assert_eq!(job.text, "whatever");
    }

    #[test]
    fn rust_code_gets_multiple_color_sections() {
        let theme = Theme::dark();
        let job = highlight_code("fn main() { let x = 1; }\n", Some("rust"), &theme, 14.0);
        assert!(job.sections.len() > 1);
    }
}
