/// Linear undo/redo history with a cursor.
///
/// Operations before the cursor are applied, the ones after it can be
/// redone. Committing a new operation discards the redoable tail, so an
/// abandoned branch can never be reached again.
use std::fmt;

use crate::config::HistoryConfig;
use crate::operation::{Reversible, TargetId};

/// Undo/redo history for one editing session over a document of type `C`.
///
/// The pipeline stores only target ids. It never owns or destroys the
/// targets; callers must [`prune`](Pipeline::prune) a target before it is
/// removed from the document.
pub struct Pipeline<C> {
    /// Operations in the order they were committed.
    history: Vec<Box<dyn Reversible<C>>>,
    /// Number of applied operations, i.e. cursor + 1.
    applied: usize,
    config: HistoryConfig,
}

/// One row of [`Pipeline::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry<'a> {
    pub index: usize,
    pub target: TargetId,
    pub label: &'a str,
    /// Whether the operation is currently applied (at or before the cursor).
    pub applied: bool,
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("len", &self.history.len())
            .field("cursor", &self.cursor())
            .field("max_depth", &self.config.max_depth)
            .finish()
    }
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<C> Pipeline<C> {
    /// Creates an empty pipeline with the cursor before the first entry.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            history: Vec::new(),
            applied: 0,
            config,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Number of stored operations, applied or not.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Index of the last applied operation, or `None` when everything
    /// has been undone.
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.history.len()
    }

    /// Label of the operation the next `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        let index = self.cursor()?;
        Some(self.history[index].label())
    }

    /// Label of the operation the next `redo` would re-apply.
    pub fn redo_label(&self) -> Option<&str> {
        self.history.get(self.applied).map(|op| op.label())
    }

    /// Commits an operation that the caller has already applied.
    ///
    /// Everything after the cursor is discarded first. The operation is
    /// stored as-is; it is not re-applied.
    pub fn add_operation<O>(&mut self, op: O)
    where
        O: Reversible<C> + 'static,
    {
        let abandoned = self.history.len() - self.applied;
        if abandoned > 0 {
            self.history.truncate(self.applied);
            tracing::debug!(abandoned, "Discarded redo branch");
        }

        tracing::debug!(
            target_id = %op.target().short(),
            label = op.label(),
            "Recorded operation"
        );
        self.history.push(Box::new(op));
        self.applied = self.history.len();

        self.enforce_max_depth();
    }

    /// Reverts the last applied operation.
    ///
    /// Returns the target that changed so the caller can refresh it, or
    /// `None` if there is nothing to undo.
    pub fn undo(&mut self, ctx: &mut C) -> Option<TargetId> {
        let index = self.cursor()?;
        let op = &self.history[index];
        op.undo(ctx);
        self.applied = index;

        let target = op.target();
        tracing::debug!(target_id = %target.short(), label = op.label(), "Undo");
        Some(target)
    }

    /// Re-applies the first redoable operation.
    ///
    /// Returns the target that changed, or `None` if there is nothing to redo.
    pub fn redo(&mut self, ctx: &mut C) -> Option<TargetId> {
        let op = self.history.get(self.applied)?;
        op.redo(ctx);
        self.applied += 1;

        let target = op.target();
        tracing::debug!(target_id = %target.short(), label = op.label(), "Redo");
        Some(target)
    }

    /// Removes every operation that references `target`.
    ///
    /// Used when the target is permanently deleted. The relative order of
    /// the remaining operations is kept, and the cursor moves back by the
    /// number of removed operations that were applied. Pruning cannot be
    /// undone. Returns the number of removed operations.
    pub fn prune(&mut self, target: TargetId) -> usize {
        let before = self.history.len();
        let applied = self.applied;
        let mut removed_applied = 0;
        let mut index = 0;

        self.history.retain(|op| {
            let keep = op.target() != target;
            if !keep && index < applied {
                removed_applied += 1;
            }
            index += 1;
            keep
        });
        self.applied -= removed_applied;

        let removed = before - self.history.len();
        if removed > 0 {
            tracing::debug!(
                target_id = %target.short(),
                removed,
                removed_applied,
                "Pruned history"
            );
        }
        removed
    }

    /// Drops the whole history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.applied = 0;
    }

    /// Iterates over all stored operations, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = HistoryEntry<'_>> + '_ {
        self.history
            .iter()
            .enumerate()
            .map(move |(index, op)| HistoryEntry {
                index,
                target: op.target(),
                label: op.label(),
                applied: index < self.applied,
            })
    }

    /// Evicts the oldest operations past the configured depth.
    fn enforce_max_depth(&mut self) {
        let Some(max_depth) = self.config.max_depth else {
            return;
        };
        let excess = self.history.len().saturating_sub(max_depth.get());
        if excess == 0 {
            return;
        }
        self.history.drain(..excess);
        self.applied = self.applied.saturating_sub(excess);
        tracing::debug!(excess, "Evicted oldest history entries");
    }
}
