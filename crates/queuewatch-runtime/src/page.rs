//! In-memory dashboard page.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use queuewatch_core::view::{JobRow, PLACEHOLDER};
use queuewatch_core::Renderer;
use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct PageState {
    texts: BTreeMap<String, String>,
    jobs: Vec<JobRow>,
}

/// Text elements and the jobs table, as last written by the poller.
///
/// Every write bumps the page revision, published on a watch channel so
/// views can redraw.
pub struct Page {
    state: RwLock<PageState>,
    revision_tx: watch::Sender<u64>,
}

/// Point-in-time copy of a [`Page`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub revision: u64,
    pub texts: BTreeMap<String, String>,
    pub jobs: Vec<JobRow>,
}

impl PageSnapshot {
    /// Text of element `id`, or the placeholder if it was never written.
    pub fn text_or_placeholder(&self, id: &str) -> &str {
        self.texts.get(id).map(String::as_str).unwrap_or(PLACEHOLDER)
    }
}

impl Page {
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(PageState::default()),
            revision_tx,
        }
    }

    /// Current text of element `id`.
    pub fn text(&self, id: &str) -> Option<String> {
        self.read().texts.get(id).cloned()
    }

    /// Rows currently in the jobs table.
    pub fn jobs(&self) -> Vec<JobRow> {
        self.read().jobs.clone()
    }

    /// Number of writes applied so far.
    pub fn revision(&self) -> u64 {
        *self.revision_tx.borrow()
    }

    /// Subscribe to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let state = self.read();
        PageSnapshot {
            revision: self.revision(),
            texts: state.texts.clone(),
            jobs: state.jobs.clone(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PageState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PageState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self) {
        self.revision_tx.send_modify(|rev| *rev += 1);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Page {
    fn set_text(&self, id: &str, value: Option<&str>) {
        let text = value.unwrap_or(PLACEHOLDER).to_string();
        self.write().texts.insert(id.to_string(), text);
        self.bump();
    }

    fn replace_jobs(&self, rows: Vec<JobRow>) {
        self.write().jobs = rows;
        self.bump();
    }
}
