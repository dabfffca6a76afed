//! Collaborator seams
//!
//! The editor shell implements these; the core only calls through them. All
//! traits used from the bake worker thread are `Send + Sync`.

use std::collections::HashMap;
use std::sync::Mutex;

/// Entity categories the project lookup can resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Actor,
    Sound,
    InGameType,
}

/// A resolved project entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
}

/// Project-wide data lookup, used to display names for referenced entities
pub trait ProjectLookup: Send + Sync {
    fn resolve(&self, id: &str, kind: EntityKind) -> Option<ProjectEntry>;
}

/// User-confirmation prompt guarding destructive edits
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Progress reporting for long-running passes
pub trait ProgressSink: Send + Sync {
    fn report(&self, current: u32, total: u32);
}

/// In-memory lookup for tests and headless tools
#[derive(Debug, Default)]
pub struct StaticLookup {
    entries: HashMap<(EntityKind, String), String>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, id: &str, name: &str) {
        self.entries.insert((kind, id.to_string()), name.to_string());
    }
}

impl ProjectLookup for StaticLookup {
    fn resolve(&self, id: &str, kind: EntityKind) -> Option<ProjectEntry> {
        self.entries.get(&(kind, id.to_string())).map(|name| ProjectEntry {
            id: id.to_string(),
            name: name.clone(),
        })
    }
}

/// Prompt that always confirms, for headless use
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }
}

/// Prompt that always declines
#[derive(Debug, Default)]
pub struct AutoDecline;

impl ConfirmPrompt for AutoDecline {
    fn confirm(&self, _title: &str, _message: &str) -> bool {
        false
    }
}

/// Discards progress reports
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _current: u32, _total: u32) {}
}

/// Records progress reports, for tests asserting tick shape
#[derive(Debug, Default)]
pub struct RecordingProgress {
    reports: Mutex<Vec<(u32, u32)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(u32, u32)> {
        self.reports.lock().expect("progress mutex poisoned").clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, current: u32, total: u32) {
        self.reports
            .lock()
            .expect("progress mutex poisoned")
            .push((current, total));
    }
}
