//! Change notifications emitted to subscribers (typically a UI layer).
//!
//! Every event names the project root it concerns so a subscriber can
//! decide what to re-render.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use log::debug;

/// What changed in a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    StateChanged { root: PathBuf },
    BuildMapChanged { root: PathBuf },
    LibraryListChanged { root: PathBuf },
    JobLogsChanged { root: PathBuf },
    /// The project was dropped from the registry.
    Removed { root: PathBuf },
    /// The descriptor of this root could not be parsed.
    LoadFailed { root: PathBuf, message: String },
}

impl ProjectEvent {
    pub fn root(&self) -> &Path {
        match self {
            ProjectEvent::StateChanged { root }
            | ProjectEvent::BuildMapChanged { root }
            | ProjectEvent::LibraryListChanged { root }
            | ProjectEvent::JobLogsChanged { root }
            | ProjectEvent::Removed { root }
            | ProjectEvent::LoadFailed { root, .. } => root,
        }
    }
}

/// Fan-out of events to any number of channel subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<ProjectEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ProjectEvent> {
        let (sender, receiver) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(sender);
        }
        receiver
    }

    /// Deliver an event; subscribers whose receiver is gone are dropped.
    pub fn emit(&self, event: ProjectEvent) {
        debug!("Emitting {:?}", event);
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
