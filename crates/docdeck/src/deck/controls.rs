//! Optional per-deck control elements.
//!
//! A deck block chooses a controls variant in its header; every control is an
//! optional capability, and operations on an absent control are skipped.

/// Which controls a deck block declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlsVariant {
    /// Prev/next, progress readout, overview and fullscreen toggles,
    /// overview close, and the touch variants.
    #[default]
    Full,
    /// Prev/next and progress readout only.
    Minimal,
    /// No on-screen controls; the deck is keyboard-only.
    None,
}

impl ControlsVariant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "full" => Some(Self::Full),
            "minimal" => Some(Self::Minimal),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A navigation button. Enablement is recomputed on every `go_to`.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    pub enabled: bool,
}

impl Button {
    fn new() -> Self {
        Self { enabled: true }
    }
}

/// The `"{index+1} / {count}"` readout.
#[derive(Debug, Clone, Default)]
pub struct ProgressReadout {
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Controls {
    pub prev: Option<Button>,
    pub next: Option<Button>,
    pub overview_toggle: Option<Button>,
    pub overview_close: Option<Button>,
    pub fullscreen_toggle: Option<Button>,
    pub touch_prev: Option<Button>,
    pub touch_next: Option<Button>,
    pub touch_overview: Option<Button>,
    pub touch_close: Option<Button>,
    pub progress: Option<ProgressReadout>,
}

impl Controls {
    pub fn for_variant(variant: ControlsVariant) -> Self {
        match variant {
            ControlsVariant::Full => Self {
                prev: Some(Button::new()),
                next: Some(Button::new()),
                overview_toggle: Some(Button::new()),
                overview_close: Some(Button::new()),
                fullscreen_toggle: Some(Button::new()),
                touch_prev: Some(Button::new()),
                touch_next: Some(Button::new()),
                touch_overview: Some(Button::new()),
                touch_close: Some(Button::new()),
                progress: Some(ProgressReadout::default()),
            },
            ControlsVariant::Minimal => Self {
                prev: Some(Button::new()),
                next: Some(Button::new()),
                progress: Some(ProgressReadout::default()),
                ..Self::default()
            },
            ControlsVariant::None => Self::default(),
        }
    }

    /// Update the progress readout, if present.
    pub fn set_progress(&mut self, index: usize, count: usize) {
        if let Some(progress) = &mut self.progress {
            progress.text = format!("{} / {}", index + 1, count);
        }
    }

    pub fn set_prev_enabled(&mut self, enabled: bool) {
        if let Some(button) = &mut self.prev {
            button.enabled = enabled;
        }
        if let Some(button) = &mut self.touch_prev {
            button.enabled = enabled;
        }
    }

    pub fn set_next_enabled(&mut self, enabled: bool) {
        if let Some(button) = &mut self.next {
            button.enabled = enabled;
        }
        if let Some(button) = &mut self.touch_next {
            button.enabled = enabled;
        }
    }
}
