//! Undo/redo history with named stopping points.
//!
//! Every record change is captured as a before/after pair. Changes are
//! accumulated into the diff on top of the undo stack until the next
//! stopping point (a *mark*), so a drag gesture that touches the same shape
//! on every pointer move still costs one entry per shape.
//!
//! Marks are what interactions hold on to:
//!
//! - **bail** to a mark reverts every change recorded since it and drops the
//!   mark (cancelled gestures leave no trace and no redo entry);
//! - **squash** to a mark folds everything since it into a single step;
//! - **undo** reverts back to the most recent mark that has changes after it.
//!
//! A mark is *held* from the moment it is taken until it is bailed to or
//! squashed. Trimming to `max_depth` only drops whole steps older than the
//! oldest held mark, so an in-flight gesture can always roll back.

use crate::id::RecordId;
use crate::model::Shape;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque handle to a history stopping point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkId(u64);

impl fmt::Debug for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mark:{}", self.0)
    }
}

impl fmt::Display for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mark:{}", self.0)
    }
}

/// One record's state before and after a change. `None` means absent.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChange {
    pub id: RecordId,
    pub before: Option<Shape>,
    pub after: Option<Shape>,
}

/// A set of record changes, at most one per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsDiff {
    changes: Vec<RecordChange>,
}

impl RecordsDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[RecordChange] {
        &self.changes
    }

    /// Fold a change into this diff, keeping the earliest `before` and the
    /// latest `after` for each record. A record that ends up where it started
    /// drops out of the diff.
    pub fn record(&mut self, change: RecordChange) {
        if let Some(pos) = self.changes.iter().position(|c| c.id == change.id) {
            let existing = &mut self.changes[pos];
            existing.after = change.after;
            if existing.before == existing.after {
                self.changes.remove(pos);
            }
        } else if change.before != change.after {
            self.changes.push(change);
        }
    }

    /// Fold another (later) diff into this one.
    pub fn merge(&mut self, later: RecordsDiff) {
        for change in later.changes {
            self.record(change);
        }
    }

    /// Put every record back to its `before` state.
    pub fn revert(&self, records: &mut HashMap<RecordId, Shape>) {
        for change in self.changes.iter().rev() {
            restore(records, change.id, change.before.as_ref());
        }
    }

    /// Put every record into its `after` state.
    pub fn reapply(&self, records: &mut HashMap<RecordId, Shape>) {
        for change in &self.changes {
            restore(records, change.id, change.after.as_ref());
        }
    }
}

fn restore(records: &mut HashMap<RecordId, Shape>, id: RecordId, state: Option<&Shape>) {
    match state {
        Some(shape) => {
            records.insert(id, shape.clone());
        }
        None => {
            records.remove(&id);
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Mark { id: MarkId, label: String },
    Diff(RecordsDiff),
}

/// Undo/redo stacks of marks and diffs.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    /// Maximum number of marks kept on the undo stack.
    max_depth: usize,
    next_mark: u64,
    /// Marks not yet bailed to or squashed.
    held: Vec<MarkId>,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            next_mark: 0,
            held: Vec::new(),
        }
    }

    /// Push a stopping point and return its handle.
    pub fn mark(&mut self, label: &str) -> MarkId {
        let id = MarkId(self.next_mark);
        self.next_mark += 1;
        self.undo_stack.push(Entry::Mark {
            id,
            label: label.to_string(),
        });
        self.held.push(id);
        self.trim();
        log::trace!("history: {id} {label}");
        id
    }

    /// Record a change that has already been applied to the records.
    /// Clears the redo stack.
    pub fn record(&mut self, change: RecordChange) {
        match self.undo_stack.last_mut() {
            Some(Entry::Diff(diff)) => diff.record(change),
            _ => {
                let mut diff = RecordsDiff::default();
                diff.record(change);
                if diff.is_empty() {
                    return;
                }
                self.undo_stack.push(Entry::Diff(diff));
            }
        }
        self.redo_stack.clear();
    }

    /// Whether `mark` is still on the undo stack.
    pub fn contains(&self, mark: MarkId) -> bool {
        self.position_of(mark).is_some()
    }

    /// Revert every change since `mark` and drop the mark itself.
    /// Returns `false` (and changes nothing) if the mark is gone.
    pub fn bail_to_mark(&mut self, mark: MarkId, records: &mut HashMap<RecordId, Shape>) -> bool {
        let Some(pos) = self.position_of(mark) else {
            log::warn!("history: bail to unknown {mark}");
            return false;
        };
        for entry in self.undo_stack.drain(pos..).rev() {
            if let Entry::Diff(diff) = entry {
                diff.revert(records);
            }
        }
        self.release_dropped();
        self.trim();
        true
    }

    /// Fold everything recorded since `mark` into one diff directly after it,
    /// discarding any marks taken in between.
    pub fn squash_to_mark(&mut self, mark: MarkId) -> bool {
        let Some(pos) = self.position_of(mark) else {
            log::warn!("history: squash to unknown {mark}");
            return false;
        };
        let mut squashed = RecordsDiff::default();
        for entry in self.undo_stack.drain(pos + 1..) {
            if let Entry::Diff(diff) = entry {
                squashed.merge(diff);
            }
        }
        if !squashed.is_empty() {
            self.undo_stack.push(Entry::Diff(squashed));
        }
        self.held.retain(|&held| held != mark);
        self.release_dropped();
        self.trim();
        true
    }

    /// Revert back to the most recent mark with changes after it.
    /// Returns that mark's label.
    pub fn undo(&mut self, records: &mut HashMap<RecordId, Shape>) -> Option<String> {
        if !self.can_undo() {
            return None;
        }
        let mut reverted = false;
        while let Some(entry) = self.undo_stack.pop() {
            let mark_label = match &entry {
                Entry::Diff(diff) => {
                    diff.revert(records);
                    reverted |= !diff.is_empty();
                    None
                }
                Entry::Mark { label, .. } => Some(label.clone()),
            };
            self.redo_stack.push(entry);
            if let Some(label) = mark_label
                && reverted
            {
                self.release_dropped();
                return Some(label);
            }
        }
        self.release_dropped();
        reverted.then(String::new)
    }

    /// Re-apply the most recently undone step. Returns its mark's label.
    pub fn redo(&mut self, records: &mut HashMap<RecordId, Shape>) -> Option<String> {
        if !self.can_redo() {
            return None;
        }
        let mut label: Option<String> = None;
        while let Some(entry) = self.redo_stack.pop() {
            if let Entry::Mark { label: l, .. } = &entry {
                if label.is_some() {
                    // Start of the next redo step; leave it for later.
                    self.redo_stack.push(entry);
                    break;
                }
                label = Some(l.clone());
            } else if let Entry::Diff(diff) = &entry {
                diff.reapply(records);
                label.get_or_insert_with(String::new);
            }
            self.undo_stack.push(entry);
        }
        label
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack
            .iter()
            .any(|e| matches!(e, Entry::Diff(d) if !d.is_empty()))
    }

    pub fn can_redo(&self) -> bool {
        self.redo_stack
            .iter()
            .any(|e| matches!(e, Entry::Diff(d) if !d.is_empty()))
    }

    /// Labels of the marks on the undo stack, oldest first.
    pub fn marks(&self) -> Vec<&str> {
        self.undo_stack
            .iter()
            .filter_map(|e| match e {
                Entry::Mark { label, .. } => Some(label.as_str()),
                Entry::Diff(_) => None,
            })
            .collect()
    }

    /// The diff accumulated since the most recent mark.
    pub fn pending(&self) -> Option<&RecordsDiff> {
        match self.undo_stack.last() {
            Some(Entry::Diff(diff)) => Some(diff),
            _ => None,
        }
    }

    /// Whether `mark` is still waiting to be bailed to or squashed.
    pub fn is_held(&self, mark: MarkId) -> bool {
        self.held.contains(&mark)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.held.clear();
    }

    fn position_of(&self, mark: MarkId) -> Option<usize> {
        self.undo_stack
            .iter()
            .rposition(|e| matches!(e, Entry::Mark { id, .. } if *id == mark))
    }

    /// Forget held marks that are no longer on the undo stack.
    fn release_dropped(&mut self) {
        let stack = &self.undo_stack;
        self.held.retain(|&held| {
            stack
                .iter()
                .any(|e| matches!(e, Entry::Mark { id, .. } if *id == held))
        });
    }

    /// Drop the oldest steps while more than `max_depth` marks are kept.
    /// A step is everything before the second mark; one containing a held
    /// mark stops the trim.
    fn trim(&mut self) {
        loop {
            let marks: Vec<(usize, MarkId)> = self
                .undo_stack
                .iter()
                .enumerate()
                .filter_map(|(i, e)| match e {
                    Entry::Mark { id, .. } => Some((i, *id)),
                    Entry::Diff(_) => None,
                })
                .collect();
            if marks.len() <= self.max_depth {
                return;
            }
            let (oldest, end) = (marks[0].1, marks[1].0);
            if self.held.contains(&oldest) {
                log::debug!("history: over depth, {oldest} is still held");
                return;
            }
            self.undo_stack.drain(..end);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
