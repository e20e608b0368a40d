//! The platform fullscreen interface.
//!
//! Entry and exit are both fallible: a denied request must leave the deck's
//! own mode flag untouched. Out-of-band exits (a platform-level Escape) are
//! observed separately, through the viewport state the monitor polls.

use eframe::egui;

use crate::page::DeckId;

#[derive(Debug, thiserror::Error)]
pub enum FullscreenError {
    #[error("fullscreen request denied: {0}")]
    Denied(String),
}

pub trait FullscreenHost {
    fn request(&mut self, deck: DeckId) -> Result<(), FullscreenError>;
    fn exit(&mut self) -> Result<(), FullscreenError>;
}

/// The eframe-backed host: fullscreen maps to the native window.
pub struct ViewportHost<'a> {
    pub ctx: &'a egui::Context,
}

impl FullscreenHost for ViewportHost<'_> {
    fn request(&mut self, _deck: DeckId) -> Result<(), FullscreenError> {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Fullscreen(true));
        Ok(())
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_host {
    use super::*;

    /// Scriptable host for tests: counts calls, optionally denies requests.
    #[derive(Default)]
    pub struct FakeHost {
        pub deny_requests: bool,
        pub requests: Vec<DeckId>,
        pub exits: usize,
    }

    impl FakeHost {
        pub fn denying() -> Self {
            Self {
                deny_requests: true,
                ..Self::default()
            }
        }
    }

    impl FullscreenHost for FakeHost {
        fn request(&mut self, deck: DeckId) -> Result<(), FullscreenError> {
            if self.deny_requests {
                return Err(FullscreenError::Denied("platform refused".to_string()));
            }
            self.requests.push(deck);
            Ok(())
        }

        fn exit(&mut self) -> Result<(), FullscreenError> {
            self.exits += 1;
            Ok(())
        }
    }
}
