/// Core types for reversible edit records.
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of an edited entity.
///
/// History entries are matched against targets by this id only, never by
/// comparing the entity's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(Uuid);

impl TargetId {
    /// Allocates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// First eight hex digits, for log lines and listings.
    pub fn short(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(8);
        s
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Writes a value into one field of one target living in the context `C`.
pub type Setter<C, V> = fn(&mut C, TargetId, &V);

/// A history entry that can be replayed in both directions.
///
/// Implemented by [`Operation`] for every value type, so a single
/// `Pipeline` can hold edits of different kinds.
pub trait Reversible<C> {
    /// The entity this entry mutates.
    fn target(&self) -> TargetId;

    /// Restores the target to its state before the edit.
    fn undo(&self, ctx: &mut C);

    /// Re-applies the edit.
    fn redo(&self, ctx: &mut C);

    /// Short description for listings, e.g. "Set color".
    fn label(&self) -> &str {
        "Edit"
    }
}

/// A single committed edit: the value of one field before and after.
///
/// Created by the code that performs the edit, right after the new value
/// has been written. The operation never re-applies itself on creation.
pub struct Operation<C, V> {
    target: TargetId,
    setter: Setter<C, V>,
    from_value: V,
    to_value: V,
    label: &'static str,
}

impl<C, V> Operation<C, V> {
    pub fn new(target: TargetId, setter: Setter<C, V>, from_value: V, to_value: V) -> Self {
        Self {
            target,
            setter,
            from_value,
            to_value,
            label: "Edit",
        }
    }

    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Value the target held before the edit.
    pub fn from_value(&self) -> &V {
        &self.from_value
    }

    /// Value the target holds after the edit.
    pub fn to_value(&self) -> &V {
        &self.to_value
    }
}

impl<C, V> Reversible<C> for Operation<C, V> {
    fn target(&self) -> TargetId {
        self.target
    }

    fn undo(&self, ctx: &mut C) {
        (self.setter)(ctx, self.target, &self.from_value);
    }

    fn redo(&self, ctx: &mut C) {
        (self.setter)(ctx, self.target, &self.to_value);
    }

    fn label(&self) -> &str {
        self.label
    }
}

impl<C, V: Clone> Clone for Operation<C, V> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            setter: self.setter,
            from_value: self.from_value.clone(),
            to_value: self.to_value.clone(),
            label: self.label,
        }
    }
}

impl<C, V: fmt::Debug> fmt::Debug for Operation<C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("target", &self.target)
            .field("label", &self.label)
            .field("from_value", &self.from_value)
            .field("to_value", &self.to_value)
            .finish()
    }
}
