//! Diagram placeholders and the renderer adapter.
//!
//! Each placeholder holds immutable source text and a render state. Rendering
//! happens at most once per placeholder, off the UI thread, behind the
//! [`DiagramRenderer`] trait; completions cross back over a channel and are
//! applied by [`RendererAdapter::drain`] on the UI thread.

pub mod textgraph;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;

use crate::deck::Deck;

pub type DiagramId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique placeholder id.
pub fn next_diagram_id() -> DiagramId {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid diagram source: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Unrendered,
    Rendering,
    Rendered(String),
    Failed(String),
}

/// Cached full-width fit for rendered markup, invalidated whenever the
/// page-level layout generation changes (fullscreen toggles, window resizes).
#[derive(Debug, Clone, Copy)]
pub struct DiagramFit {
    pub generation: u64,
    pub font_size: f32,
}

#[derive(Debug)]
pub struct Diagram {
    pub id: DiagramId,
    pub source: String,
    pub state: RenderState,
    pub fit: Option<DiagramFit>,
}

impl Diagram {
    pub fn new(source: String) -> Self {
        Self {
            id: next_diagram_id(),
            source,
            state: RenderState::Unrendered,
            fit: None,
        }
    }

    pub fn is_unrendered(&self) -> bool {
        self.state == RenderState::Unrendered
    }

    pub fn is_rendering(&self) -> bool {
        self.state == RenderState::Rendering
    }
}

/// A finished render, success or failure, tagged with the placeholder id.
#[derive(Debug)]
pub struct RenderOutcome {
    pub id: DiagramId,
    pub result: Result<String, RenderError>,
}

/// The opaque external renderer. `submit` must not block; the outcome is
/// delivered later through the adapter's channel.
pub trait DiagramRenderer: Send {
    fn submit(&self, id: DiagramId, source: String);
}

pub struct RendererAdapter {
    renderer: Box<dyn DiagramRenderer>,
    outcomes: Receiver<RenderOutcome>,
}

impl RendererAdapter {
    pub fn new(renderer: Box<dyn DiagramRenderer>, outcomes: Receiver<RenderOutcome>) -> Self {
        Self { renderer, outcomes }
    }

    /// Submit every unrendered, non-empty placeholder in `deck`.
    ///
    /// Idempotent: placeholders already Rendering, Rendered, or Failed are
    /// skipped, so calling this again after a reload never re-renders.
    pub fn render_all(&self, deck: &mut Deck) {
        for diagram in deck.diagrams_mut() {
            if diagram.source.trim().is_empty() || !diagram.is_unrendered() {
                continue;
            }
            diagram.state = RenderState::Rendering;
            self.renderer.submit(diagram.id, diagram.source.clone());
        }
    }

    /// Apply all pending completions to the decks.
    ///
    /// A completion whose placeholder no longer exists (document reload) or is
    /// no longer Rendering is dropped. Failures mark only their own diagram.
    pub fn drain(&self, decks: &mut [Deck]) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            let Some(diagram) = decks
                .iter_mut()
                .flat_map(|deck| deck.diagrams_mut())
                .find(|d| d.id == outcome.id)
            else {
                tracing::debug!(id = outcome.id, "dropping stale render completion");
                continue;
            };
            if !diagram.is_rendering() {
                tracing::debug!(id = outcome.id, "render completion for superseded diagram");
                continue;
            }
            match outcome.result {
                Ok(markup) => {
                    diagram.state = RenderState::Rendered(markup);
                    diagram.fit = None;
                }
                Err(error) => {
                    tracing::warn!(id = outcome.id, %error, "diagram render failed");
                    diagram.state = RenderState::Failed(error.to_string());
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_renderer::ManualRenderer;
    use super::*;
    use crate::deck::test_decks::deck_with_diagrams;

    #[test]
    fn render_all_submits_each_diagram_once() {
        let (adapter, log) = ManualRenderer::counting();
        let mut deck = deck_with_diagrams(&["graph\na -> b", "graph\nc -> d"]);

        adapter.render_all(&mut deck);
        assert_eq!(log.lock().unwrap().len(), 2);
        assert!(deck.diagrams().iter().all(Diagram::is_rendering));

        // Second pass is a no-op: nothing is Unrendered any more.
        adapter.render_all(&mut deck);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn empty_source_is_never_submitted() {
        let (adapter, log) = ManualRenderer::counting();
        let mut deck = deck_with_diagrams(&["  \n ", "graph\na -> b"]);

        adapter.render_all(&mut deck);
        assert_eq!(log.lock().unwrap().len(), 1);
        assert!(deck.diagrams()[0].is_unrendered());
    }

    #[test]
    fn completions_update_only_their_own_diagram() {
        let (adapter, tx) = ManualRenderer::adapter();
        let mut deck = deck_with_diagrams(&["graph\na -> b", "graph\nc -> d"]);
        adapter.render_all(&mut deck);

        let first = deck.diagrams()[0].id;
        let second = deck.diagrams()[1].id;

        tx.send(RenderOutcome {
            id: first,
            result: Err(RenderError::Invalid("bad edge".into())),
        })
        .unwrap();
        tx.send(RenderOutcome {
            id: second,
            result: Ok("[boxes]".into()),
        })
        .unwrap();

        adapter.drain(std::slice::from_mut(&mut deck));

        assert!(matches!(deck.diagrams()[0].state, RenderState::Failed(_)));
        assert_eq!(
            deck.diagrams()[1].state,
            RenderState::Rendered("[boxes]".into())
        );
    }

    #[test]
    fn stale_completion_is_dropped() {
        let (adapter, tx) = ManualRenderer::adapter();
        let mut deck = deck_with_diagrams(&["graph\na -> b"]);
        adapter.render_all(&mut deck);
        let old_id = deck.diagrams()[0].id;

        // Reload replaces the deck; the in-flight completion must not land.
        let mut reloaded = deck_with_diagrams(&["graph\nx -> y"]);
        tx.send(RenderOutcome {
            id: old_id,
            result: Ok("late".into()),
        })
        .unwrap();
        adapter.drain(std::slice::from_mut(&mut reloaded));

        assert!(reloaded.diagrams()[0].is_unrendered());
    }

    #[test]
    fn completion_for_non_rendering_diagram_is_ignored() {
        let (adapter, tx) = ManualRenderer::adapter();
        let mut deck = deck_with_diagrams(&["graph\na -> b"]);
        adapter.render_all(&mut deck);
        let id = deck.diagrams()[0].id;

        tx.send(RenderOutcome {
            id,
            result: Ok("first".into()),
        })
        .unwrap();
        tx.send(RenderOutcome {
            id,
            result: Ok("duplicate".into()),
        })
        .unwrap();
        adapter.drain(std::slice::from_mut(&mut deck));

        // The first completion wins; the duplicate finds the diagram already
        // Rendered and leaves it alone.
        assert_eq!(deck.diagrams()[0].state, RenderState::Rendered("first".into()));
    }
}
