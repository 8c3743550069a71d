/// Scene model and editing session for the 3D editor.
///
/// A `Scene` holds the editable objects. Every property setter writes the
/// new value and hands back the matching history `Operation`, which the
/// `EditSession` records in its undo/redo pipeline.
pub mod error;
pub mod object;
pub mod property;
pub mod scene;
pub mod session;

pub use error::SceneError;
pub use object::{ObjectId, SceneObject, Shape};
pub use property::Property;
pub use scene::Scene;
pub use session::EditSession;
