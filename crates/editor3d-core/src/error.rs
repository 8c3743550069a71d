use thiserror::Error;

use crate::object::ObjectId;
use crate::property::Property;

/// Errors raised when an edit cannot be applied to the scene.
///
/// A rejected edit leaves the scene and the history untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Object not found: {0}")]
    UnknownObject(ObjectId),

    #[error("No object named '{0}'")]
    UnknownName(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("A {shape} has no {property} property")]
    ShapeMismatch {
        shape: &'static str,
        property: Property,
    },

    #[error("Invalid {property}: {reason}")]
    InvalidValue { property: Property, reason: String },

    #[error("Cannot move {child} under {parent}: it would become its own ancestor")]
    ParentCycle { child: ObjectId, parent: ObjectId },
}

impl SceneError {
    pub(crate) fn invalid(property: Property, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            property,
            reason: reason.into(),
        }
    }
}
