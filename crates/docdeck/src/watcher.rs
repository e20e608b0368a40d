//! Debounced live reload of the document and its slide files.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, channel};
use std::time::Duration;

use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

pub struct DocWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<()>,
}

impl DocWatcher {
    pub fn watch(paths: &[PathBuf]) -> anyhow::Result<Self> {
        let (tx, rx) = channel();
        let mut debouncer = new_debouncer(
            Duration::from_millis(250),
            move |result: DebounceEventResult| match result {
                Ok(_) => {
                    let _ = tx.send(());
                }
                Err(error) => tracing::debug!(%error, "file watcher error"),
            },
        )?;
        for path in paths {
            if let Err(error) = debouncer.watcher().watch(path, RecursiveMode::NonRecursive) {
                tracing::warn!(path = %path.display(), %error, "cannot watch file");
            }
        }
        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// Drain pending change notifications; true if anything changed.
    pub fn take_dirty(&self) -> bool {
        let mut dirty = false;
        while self.rx.try_recv().is_ok() {
            dirty = true;
        }
        dirty
    }
}
