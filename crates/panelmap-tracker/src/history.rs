//! Undo/redo history of status edits
//!
//! The current feature collection is replaced wholesale on every edit. Prior
//! collections are kept as shared snapshots on two bounded stacks.

use panelmap_core::error::{Error, Result};
use panelmap_core::models::EnrichedFeature;
use panelmap_core::normalize::normalize_id;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;

/// An immutable copy of the feature collection
pub type Snapshot = Arc<Vec<EnrichedFeature>>;

/// Availability of undo and redo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Owner of the enriched features and their edit history
#[derive(Debug)]
pub struct StatusHistory {
    current: Snapshot,
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    limit: usize,
    events: watch::Sender<HistoryState>,
}

impl StatusHistory {
    /// Start a history over a freshly enriched collection.
    ///
    /// `limit` bounds each stack; the oldest snapshot is discarded first. A
    /// limit of zero is raised to one so the last edit can always be undone.
    pub fn new(features: Vec<EnrichedFeature>, limit: usize) -> Self {
        let (events, _) = watch::channel(HistoryState::default());
        Self {
            current: Arc::new(features),
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            limit: limit.max(1),
            events,
        }
    }

    /// The current collection
    pub fn features(&self) -> &[EnrichedFeature] {
        &self.current
    }

    /// A shared handle on the current collection
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.current)
    }

    pub fn state(&self) -> HistoryState {
        HistoryState { can_undo: !self.undo_stack.is_empty(), can_redo: !self.redo_stack.is_empty() }
    }

    /// Receive the history state after every operation
    pub fn subscribe(&self) -> watch::Receiver<HistoryState> {
        self.events.subscribe()
    }

    /// Flip the status of the feature identified by `id`.
    ///
    /// Features whose authored identifier equals `id` are flipped. When there
    /// are none, the first feature whose normalized identifier matches is
    /// flipped instead. Unknown identifiers leave the history untouched.
    pub fn toggle_status(&mut self, id: &str) -> Result<HistoryState> {
        let targets = self.resolve(id);
        if targets.is_empty() {
            return Err(Error::FeatureNotFound { id: id.to_string() });
        }

        let next: Vec<EnrichedFeature> = self
            .current
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                if targets.contains(&index) {
                    feature.with_status_toggled()
                } else {
                    feature.clone()
                }
            })
            .collect();

        let previous = std::mem::replace(&mut self.current, Arc::new(next));
        push_bounded(&mut self.undo_stack, previous, self.limit);
        self.redo_stack.clear();

        tracing::debug!("Toggled status of {}", id);
        Ok(self.publish())
    }

    /// Restore the previous collection; no-op when there is nothing to undo
    pub fn undo(&mut self) -> HistoryState {
        if let Some(previous) = self.undo_stack.pop_back() {
            let current = std::mem::replace(&mut self.current, previous);
            push_bounded(&mut self.redo_stack, current, self.limit);
        }
        self.publish()
    }

    /// Reapply the last undone collection; no-op when there is nothing to redo
    pub fn redo(&mut self) -> HistoryState {
        if let Some(next) = self.redo_stack.pop_back() {
            let current = std::mem::replace(&mut self.current, next);
            push_bounded(&mut self.undo_stack, current, self.limit);
        }
        self.publish()
    }

    /// Indices of the features `id` refers to
    fn resolve(&self, id: &str) -> Vec<usize> {
        let exact: Vec<usize> = self
            .current
            .iter()
            .enumerate()
            .filter(|(_, feature)| feature.inverter_id == id)
            .map(|(index, _)| index)
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let normalized = normalize_id(id);
        if normalized.is_empty() {
            return Vec::new();
        }
        self.current
            .iter()
            .position(|feature| feature.normalized_id == normalized)
            .into_iter()
            .collect()
    }

    fn publish(&self) -> HistoryState {
        let state = self.state();
        self.events.send_replace(state);
        state
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, limit: usize) {
    stack.push_back(snapshot);
    while stack.len() > limit {
        stack.pop_front();
    }
}
