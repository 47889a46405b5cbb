//! The document store: shape records, instance state, and history.
//!
//! The store is the single mutable resource shared by every interaction.
//! All record writes go through `create_shapes` / `update_shapes` /
//! `delete_shapes`, which apply the change and record it in `History` in one
//! step, so marks taken before a gesture can always restore the exact
//! pre-gesture records.

use crate::history::{History, MarkId, RecordChange};
use crate::id::RecordId;
use crate::model::{Shape, ShapeKind, ShapePartial};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    DuplicateRecord(RecordId),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Per-editor state that lives next to the document but is not undoable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceState {
    pub selected_ids: Vec<RecordId>,
    /// The image currently being cropped, if any.
    pub cropping_shape_id: Option<RecordId>,
}

/// Serializable point-in-time copy of a store's records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub instance: InstanceState,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact binary form (MessagePack).
    pub fn to_msgpack(&self) -> Result<Vec<u8>, StoreError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, StoreError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[derive(Debug)]
pub struct Store {
    records: HashMap<RecordId, Shape>,
    instance: InstanceState,
    history: History,
    /// Bumped on every record change. Renderers compare it to skip redraws.
    version: u64,
}

impl Store {
    pub fn new(max_history: usize) -> Self {
        Self {
            records: HashMap::new(),
            instance: InstanceState::default(),
            history: History::new(max_history),
            version: 0,
        }
    }

    /// Build a store from a snapshot. The snapshot's records are the initial
    /// document and are not undoable.
    pub fn from_snapshot(snapshot: StoreSnapshot, max_history: usize) -> Result<Self, StoreError> {
        let mut store = Self::new(max_history);
        for shape in snapshot.shapes {
            if store.records.contains_key(&shape.id) {
                return Err(StoreError::DuplicateRecord(shape.id));
            }
            store.records.insert(shape.id, shape);
        }
        store.instance = snapshot.instance;
        store
            .instance
            .selected_ids
            .retain(|id| store.records.contains_key(id));
        Ok(store)
    }

    /// Records sorted by id, plus instance state.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut shapes: Vec<Shape> = self.records.values().cloned().collect();
        shapes.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        StoreSnapshot {
            shapes,
            instance: self.instance.clone(),
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn shape(&self, id: RecordId) -> Option<&Shape> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn instance(&self) -> &InstanceState {
        &self.instance
    }

    // ─── Record writes ───────────────────────────────────────────────────

    /// Insert new shapes. Fails without changing anything if any id exists.
    pub fn create_shapes(&mut self, shapes: Vec<Shape>) -> Result<(), StoreError> {
        if let Some(dup) = shapes.iter().find(|s| self.records.contains_key(&s.id)) {
            return Err(StoreError::DuplicateRecord(dup.id));
        }
        for shape in shapes {
            self.history.record(RecordChange {
                id: shape.id,
                before: None,
                after: Some(shape.clone()),
            });
            self.records.insert(shape.id, shape);
        }
        self.version += 1;
        Ok(())
    }

    /// Apply partial updates. Partials for missing records are skipped.
    /// Returns the number of records that actually changed.
    pub fn update_shapes(&mut self, partials: &[ShapePartial]) -> usize {
        let mut changed = 0;
        for partial in partials {
            let Some(shape) = self.records.get_mut(&partial.id) else {
                log::debug!("store: update skipped, {} is gone", partial.id);
                continue;
            };
            let before = shape.clone();
            if shape.apply(partial) {
                self.history.record(RecordChange {
                    id: partial.id,
                    before: Some(before),
                    after: Some(shape.clone()),
                });
                changed += 1;
            }
        }
        if changed > 0 {
            self.version += 1;
        }
        changed
    }

    /// Remove shapes (and drop them from the selection).
    /// Returns the number of records removed.
    pub fn delete_shapes(&mut self, ids: &[RecordId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if let Some(shape) = self.records.remove(id) {
                self.history.record(RecordChange {
                    id: *id,
                    before: Some(shape),
                    after: None,
                });
                removed += 1;
            }
        }
        if removed > 0 {
            self.instance.selected_ids.retain(|id| !ids.contains(id));
            if self
                .instance
                .cropping_shape_id
                .is_some_and(|id| ids.contains(&id))
            {
                self.instance.cropping_shape_id = None;
            }
            self.version += 1;
        }
        removed
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn mark_history_stopping_point(&mut self, label: &str) -> MarkId {
        self.history.mark(label)
    }

    /// Discard every record change since `mark`.
    pub fn bail_to_mark(&mut self, mark: MarkId) -> bool {
        let bailed = self.history.bail_to_mark(mark, &mut self.records);
        if bailed {
            self.after_history_jump();
        }
        bailed
    }

    /// Commit every record change since `mark` as one undo step.
    pub fn squash_to_mark(&mut self, mark: MarkId) -> bool {
        self.history.squash_to_mark(mark)
    }

    pub fn undo(&mut self) -> Option<String> {
        let label = self.history.undo(&mut self.records)?;
        self.after_history_jump();
        Some(label)
    }

    pub fn redo(&mut self) -> Option<String> {
        let label = self.history.redo(&mut self.records)?;
        self.after_history_jump();
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn after_history_jump(&mut self) {
        let records = &self.records;
        self.instance.selected_ids.retain(|id| records.contains_key(id));
        self.version += 1;
    }

    // ─── Instance state ──────────────────────────────────────────────────

    pub fn selected_ids(&self) -> &[RecordId] {
        &self.instance.selected_ids
    }

    /// The innermost unlocked frame whose bounds contain the center of
    /// `shape`. Frames inside `shape` itself are never candidates.
    pub fn drop_target(&self, shape: &Shape) -> Option<RecordId> {
        let center = shape.bounds().center();
        self.records
            .values()
            .filter(|frame| matches!(frame.kind, ShapeKind::Frame { .. }) && !frame.is_locked)
            .filter(|frame| frame.bounds().contains(center))
            .filter(|frame| !self.is_within(frame.id, shape.id))
            .min_by(|a, b| {
                a.bounds()
                    .area()
                    .total_cmp(&b.bounds().area())
                    .then_with(|| a.id.as_str().cmp(b.id.as_str()))
            })
            .map(|frame| frame.id)
    }

    /// Whether `id` is `ancestor` or nested under it.
    fn is_within(&self, id: RecordId, ancestor: RecordId) -> bool {
        let mut current = Some(id);
        let mut hops = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.records.len() {
                return false;
            }
            current = self.records.get(&id).and_then(|s| s.parent_id);
        }
        false
    }

    /// The selected shape, if exactly one is selected.
    pub fn only_selected_shape(&self) -> Option<&Shape> {
        match self.instance.selected_ids.as_slice() {
            [id] => self.records.get(id),
            _ => None,
        }
    }

    /// Replace the selection. Unknown ids are dropped.
    pub fn select(&mut self, ids: &[RecordId]) {
        self.instance.selected_ids = ids
            .iter()
            .copied()
            .filter(|id| self.records.contains_key(id))
            .collect();
    }

    pub fn toggle_selected(&mut self, id: RecordId) {
        if let Some(pos) = self.instance.selected_ids.iter().position(|s| *s == id) {
            self.instance.selected_ids.remove(pos);
        } else if self.records.contains_key(&id) {
            self.instance.selected_ids.push(id);
        }
    }

    pub fn select_all(&mut self) {
        let mut ids: Vec<RecordId> = self.records.keys().copied().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        self.instance.selected_ids = ids;
    }

    pub fn clear_selection(&mut self) {
        self.instance.selected_ids.clear();
    }

    pub fn cropping_shape_id(&self) -> Option<RecordId> {
        self.instance.cropping_shape_id
    }

    pub fn set_cropping_shape(&mut self, id: Option<RecordId>) {
        self.instance.cropping_shape_id = id.filter(|id| self.records.contains_key(id));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(100)
    }
}
