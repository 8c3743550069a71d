/// Undo/redo history for edits on identified targets.
///
/// Provides a `Pipeline` that keeps a linear history of reversible
/// `Operation`s with a cursor. Committing a new edit after undoing
/// discards the abandoned redo branch, and `Pipeline::prune` drops every
/// entry tied to a target that no longer exists.
pub mod config;
pub mod operation;
pub mod pipeline;

pub use config::HistoryConfig;
pub use operation::{Operation, Reversible, Setter, TargetId};
pub use pipeline::{HistoryEntry, Pipeline};
