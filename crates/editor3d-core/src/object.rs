/// Scene objects and their shapes.
use std::path::PathBuf;

use glam::Vec3;
use serde::Serialize;

use editor3d_config::Color;
use editor3d_history::TargetId;

/// Identity of a scene object. Doubles as the history target id.
pub type ObjectId = TargetId;

/// Shape-specific parameters of an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Box { length: f32, width: f32, height: f32 },
    Sphere { radius: f32 },
    /// Mesh loaded from an STL file.
    Mesh { path: PathBuf, scale: f32 },
}

impl Shape {
    /// Unit cube.
    pub fn cuboid() -> Self {
        Shape::Box {
            length: 1.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Unit sphere.
    pub fn sphere() -> Self {
        Shape::Sphere { radius: 1.0 }
    }

    pub fn mesh(path: impl Into<PathBuf>) -> Self {
        Shape::Mesh {
            path: path.into(),
            scale: 1.0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Sphere { .. } => "sphere",
            Shape::Mesh { .. } => "mesh",
        }
    }

    /// Name given to new objects of this shape.
    pub fn default_name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "Box",
            Shape::Sphere { .. } => "Sphere",
            Shape::Mesh { .. } => "Mesh",
        }
    }
}

/// An editable object in the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub color: Color,
    /// `None` for objects attached to the scene root.
    pub parent: Option<ObjectId>,
    pub shape: Shape,
}

impl SceneObject {
    /// Creates an object at the origin with a fresh id.
    ///
    /// Inner whitespace in `name` is replaced by `_`.
    pub fn new(shape: Shape, name: Option<&str>, color: Color) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(shape.default_name())
            .replace(char::is_whitespace, "_");
        Self {
            id: ObjectId::new(),
            name,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            color,
            parent: None,
            shape,
        }
    }
}
