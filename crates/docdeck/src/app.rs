//! The eframe shell: wires egui input to the router, tracker, and monitor,
//! and draws the page each frame.

use std::path::{Path, PathBuf};
use std::time::Instant;

use eframe::egui;

use crate::config::Config;
use crate::diagram::textgraph::TextGraphRenderer;
use crate::diagram::RendererAdapter;
use crate::monitor::OrientationMonitor;
use crate::page::Page;
use crate::parser::{self, MarkupSegment, PageMarkup};
use crate::platform::ViewportHost;
use crate::render::{self, DeckEvent};
use crate::router;
use crate::theme::Theme;
use crate::watcher::DocWatcher;

#[derive(Debug, Default, Clone)]
pub struct StartOptions {
    pub windowed: bool,
    /// 1-indexed start slide for the selected deck.
    pub slide: Option<usize>,
    /// 1-indexed deck to preselect as the active deck.
    pub deck: Option<usize>,
    /// Open the selected deck's overview on startup.
    pub overview: bool,
}

struct DocdeckApp {
    doc_path: PathBuf,
    page: Page,
    theme: Theme,
    adapter: RendererAdapter,
    monitor: OrientationMonitor,
    watcher: Option<DocWatcher>,
}

impl DocdeckApp {
    fn reload(&mut self) {
        let content = match std::fs::read_to_string(&self.doc_path) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(path = %self.doc_path.display(), %error, "reload failed, keeping current page");
                return;
            }
        };
        let base = doc_base(&self.doc_path);
        let markup = parser::parse_document(&content, &base);
        let watch_paths = watch_paths(&self.doc_path, &markup);

        let mut fresh = Page::from_markup(markup);
        fresh.carry_over_from(&self.page);
        for deck in fresh.decks_mut() {
            self.adapter.render_all(deck);
        }
        self.page = fresh;
        self.watcher = rebuild_watcher(&watch_paths);
        tracing::info!(path = %self.doc_path.display(), decks = self.page.deck_count(), "document reloaded");
    }

    fn apply_events(&mut self, events: Vec<DeckEvent>, ctx: &egui::Context, now: Instant) {
        let mut host = ViewportHost { ctx };
        for event in events {
            match event {
                DeckEvent::Activate(id) => self.page.activate(id),
                DeckEvent::Interact(id) => self.page.note_interaction(id, now),
                DeckEvent::Prev(id) => {
                    if let Some(deck) = self.page.deck_mut(id) {
                        deck.prev();
                    }
                    self.page.note_interaction(id, now);
                }
                DeckEvent::Next(id) => {
                    if let Some(deck) = self.page.deck_mut(id) {
                        deck.next();
                    }
                    self.page.note_interaction(id, now);
                }
                DeckEvent::ToggleOverview(id) => {
                    if let Some(deck) = self.page.deck_mut(id) {
                        deck.toggle_overview();
                    }
                    self.page.note_interaction(id, now);
                }
                DeckEvent::CloseOverview(id) => {
                    if let Some(deck) = self.page.deck_mut(id) {
                        if deck.is_overview() {
                            deck.toggle_overview();
                        }
                    }
                }
                DeckEvent::ToggleFullscreen(id) => {
                    self.page.toggle_fullscreen(id, &mut host);
                }
                DeckEvent::CloseFullscreenLocal(id) => {
                    self.page.close_fullscreen_local(id);
                }
                DeckEvent::SelectTile(id, index) => {
                    if let Some(deck) = self.page.deck_mut(id) {
                        deck.select_overview_tile(index);
                    }
                    self.page.note_interaction(id, now);
                }
            }
        }
    }
}

impl eframe::App for DocdeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if self.watcher.as_ref().is_some_and(DocWatcher::take_dirty) {
            self.reload();
        }

        // Async boundary: apply finished diagram renders.
        self.adapter.drain(self.page.decks_mut());

        // Keyboard. Collect first, dispatch outside the input closure
        // (viewport commands sent inside ctx.input() deadlock).
        let viewport = ctx.screen_rect();
        let keys: Vec<egui::Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key, pressed: true, ..
                    } => Some(*key),
                    _ => None,
                })
                .collect()
        });
        {
            let mut host = ViewportHost { ctx };
            for key in keys {
                if router::route(&mut self.page, key, viewport, &mut host, now) {
                    ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, key));
                }
            }
            self.monitor.poll(&mut self.page, viewport.size(), &mut host);
        }

        let platform_fullscreen = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
        self.monitor
            .observe_platform_fullscreen(&mut self.page, platform_fullscreen);

        self.page.tick(now);
        if let Some(deadline) = self.page.hide_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        let background = self.theme.page_background;
        let mut events = Vec::new();
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(background).inner_margin(0.0))
            .show(ctx, |ui| {
                if let Some(id) = self.page.fullscreen_deck() {
                    let generation = self.page.layout_generation();
                    if let Some(deck) = self.page.deck_mut(id) {
                        events = render::draw_fullscreen(ui, deck, id, generation, &self.theme);
                    }
                } else {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            ui.add_space(24.0);
                            ui.horizontal(|ui| {
                                ui.add_space(32.0);
                                ui.vertical(|ui| {
                                    ui.set_max_width(ui.available_width() - 32.0);
                                    let mut view = self.page.view_mut();
                                    events = render::draw_page(ui, &mut view, &self.theme);
                                });
                            });
                            ui.add_space(24.0);
                        });
                }
            });

        self.apply_events(events, ctx, now);
    }
}

fn doc_base(doc_path: &Path) -> PathBuf {
    doc_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}

fn watch_paths(doc_path: &Path, markup: &PageMarkup) -> Vec<PathBuf> {
    let mut paths = vec![doc_path.to_path_buf()];
    for segment in &markup.segments {
        if let MarkupSegment::Deck(deck) = segment {
            paths.extend(deck.source_files.iter().cloned());
        }
    }
    paths
}

fn rebuild_watcher(paths: &[PathBuf]) -> Option<DocWatcher> {
    match DocWatcher::watch(paths) {
        Ok(watcher) => Some(watcher),
        Err(error) => {
            tracing::warn!(%error, "live reload disabled");
            None
        }
    }
}

fn apply_start_options(page: &mut Page, options: &StartOptions, config: &Config) {
    if page.deck_count() == 0 {
        return;
    }
    let target = options
        .deck
        .map(|d| d.saturating_sub(1))
        .unwrap_or(0)
        .min(page.deck_count() - 1);

    let config_start = config
        .defaults
        .as_ref()
        .and_then(|d| d.start_mode.as_deref());

    let (start_slide, start_overview) = if options.overview {
        (options.slide, true)
    } else if options.slide.is_some() {
        (options.slide, false)
    } else {
        match config_start {
            Some("overview") => (None, true),
            Some("first") | None => (None, false),
            Some(n) => (n.parse::<usize>().ok(), false),
        }
    };

    if let Some(deck) = page.deck_mut(target) {
        if let Some(slide) = start_slide {
            let index = slide
                .saturating_sub(1)
                .min(deck.slide_count().saturating_sub(1));
            deck.go_to(index);
        }
        if start_overview && !deck.is_overview() {
            deck.toggle_overview();
        }
    }
    if options.deck.is_some() || options.slide.is_some() || start_overview {
        page.activate(target);
    }
}

pub fn run(file: PathBuf, options: StartOptions) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)?;
    let base = doc_base(&file);
    let markup = parser::parse_document(&content, &base);
    let paths = watch_paths(&file, &markup);

    let mut page = Page::from_markup(markup);
    if page.deck_count() == 0 {
        tracing::warn!(path = %file.display(), "document contains no deck blocks");
    }

    let config = Config::load_or_default();
    let theme_name = config
        .defaults
        .as_ref()
        .and_then(|d| d.theme.as_deref())
        .unwrap_or("light");
    let theme = Theme::from_name(theme_name);

    apply_start_options(&mut page, &options, &config);

    let (renderer, outcomes) = TextGraphRenderer::spawn()?;
    let adapter = RendererAdapter::new(Box::new(renderer), outcomes);
    for deck in page.decks_mut() {
        adapter.render_all(deck);
    }
    let diagram_count: usize = page.decks().iter().map(|d| d.diagrams().len()).sum();
    if diagram_count > 0 {
        tracing::debug!(count = diagram_count, "diagram rendering scheduled");
    }

    let watcher = rebuild_watcher(&paths);

    let title = format!(
        "docdeck — {}",
        file.file_name().unwrap_or_default().to_string_lossy()
    );
    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let app = DocdeckApp {
        doc_path: file,
        page,
        theme,
        adapter,
        monitor: OrientationMonitor::default(),
        watcher,
    };
    eframe::run_native(&title, native_options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("{e}"))
}
