/// The scene: an ordered set of objects and their property setters.
///
/// Each `set_*` method validates the new value, writes it, and returns the
/// `Operation` that reverts or replays the change. The write functions
/// stored in those operations tolerate missing objects, so replaying an
/// operation never panics even if its target has gone away.
use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;

use editor3d_config::Color;
use editor3d_history::Operation;

use crate::error::SceneError;
use crate::object::{ObjectId, SceneObject, Shape};
use crate::property::Property;

/// Operation over the scene carrying values of type `V`.
pub type SceneOperation<V> = Operation<Scene, V>;

/// All objects of a document, in creation order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    /// Position of each object in `objects`.
    index: HashMap<ObjectId, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new object at the scene root and returns its id.
    pub fn add(&mut self, shape: Shape, name: Option<&str>, color: Color) -> ObjectId {
        let object = SceneObject::new(shape, name, color);
        let id = object.id;
        self.index.insert(id, self.objects.len());
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.index.get(&id).map(|&i| &self.objects[i])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.index.get(&id).map(|&i| &mut self.objects[i])
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    /// First object with the given name, in creation order.
    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects attached to the scene root.
    pub fn roots(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.parent.is_none())
            .map(|o| o.id)
            .collect()
    }

    /// Direct children of `id`, in creation order.
    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.parent == Some(id))
            .map(|o| o.id)
            .collect()
    }

    /// `id` and everything below it, children before their parents and
    /// `id` itself last.
    pub fn descendants_of(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    fn collect_subtree(&self, id: ObjectId, out: &mut Vec<ObjectId>) {
        for child in self.children_of(id) {
            self.collect_subtree(child, out);
        }
        out.push(id);
    }

    /// Whether `ancestor` is `id` or one of its parents.
    fn is_ancestor_or_self(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        // Bounded walk so a corrupted parent chain cannot loop forever
        for _ in 0..=self.objects.len() {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = self.get(c).and_then(|o| o.parent),
                None => return false,
            }
        }
        false
    }

    /// Removes a single object.
    ///
    /// Children of the removed object are moved to the scene root. Callers
    /// that delete whole subtrees remove the children first.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let position = self.index.remove(&id)?;
        let removed = self.objects.remove(position);
        for object in &mut self.objects {
            if object.parent == Some(id) {
                tracing::warn!(child = %object.name, "Parent removed, moving child to scene root");
                object.parent = None;
            }
        }
        self.reindex();
        Some(removed)
    }

    fn reindex(&mut self) {
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id, i))
            .collect();
    }

    fn object(&self, id: ObjectId) -> Result<&SceneObject, SceneError> {
        self.get(id).ok_or(SceneError::UnknownObject(id))
    }

    /// Lookup used by the write functions replayed from history.
    fn target_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        let object = self.get_mut(id);
        if object.is_none() {
            tracing::warn!(object = %id, "History replay targets a missing object");
        }
        object
    }

    /// Writes `to` and wraps the change into an operation.
    fn commit<V>(
        &mut self,
        id: ObjectId,
        property: Property,
        from: V,
        to: V,
        write: fn(&mut Scene, ObjectId, &V),
    ) -> SceneOperation<V> {
        write(self, id, &to);
        Operation::new(id, write, from, to).with_label(property.label())
    }

    // --- Common properties ---

    pub fn set_name(
        &mut self,
        id: ObjectId,
        name: &str,
    ) -> Result<SceneOperation<String>, SceneError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::invalid(Property::Name, "name must not be empty"));
        }
        // Names are looked up as single words
        if name.contains(char::is_whitespace) {
            return Err(SceneError::invalid(
                Property::Name,
                format!("'{name}' must not contain spaces"),
            ));
        }
        let from = self.object(id)?.name.clone();
        Ok(self.commit(id, Property::Name, from, name.to_string(), write_name))
    }

    pub fn set_color(
        &mut self,
        id: ObjectId,
        color: Color,
    ) -> Result<SceneOperation<Color>, SceneError> {
        let from = self.object(id)?.color;
        Ok(self.commit(id, Property::Color, from, color, write_color))
    }

    pub fn set_position(
        &mut self,
        id: ObjectId,
        position: Vec3,
    ) -> Result<SceneOperation<Vec3>, SceneError> {
        check_finite(Property::Position, position)?;
        let from = self.object(id)?.position;
        Ok(self.commit(id, Property::Position, from, position, write_position))
    }

    pub fn set_rotation(
        &mut self,
        id: ObjectId,
        rotation: Vec3,
    ) -> Result<SceneOperation<Vec3>, SceneError> {
        check_finite(Property::Rotation, rotation)?;
        let from = self.object(id)?.rotation;
        Ok(self.commit(id, Property::Rotation, from, rotation, write_rotation))
    }

    /// Attaches `id` under `parent`, or to the scene root for `None`.
    pub fn set_parent(
        &mut self,
        id: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<SceneOperation<Option<ObjectId>>, SceneError> {
        let from = self.object(id)?.parent;
        if let Some(p) = parent {
            self.object(p)?;
            if self.is_ancestor_or_self(id, p) {
                return Err(SceneError::ParentCycle {
                    child: id,
                    parent: p,
                });
            }
        }
        Ok(self.commit(id, Property::Parent, from, parent, write_parent))
    }

    // --- Shape properties ---

    pub fn set_radius(
        &mut self,
        id: ObjectId,
        radius: f32,
    ) -> Result<SceneOperation<f32>, SceneError> {
        check_size(Property::Radius, radius)?;
        let object = self.object(id)?;
        let Shape::Sphere { radius: from } = object.shape else {
            return Err(mismatch(object, Property::Radius));
        };
        Ok(self.commit(id, Property::Radius, from, radius, write_radius))
    }

    pub fn set_width(&mut self, id: ObjectId, width: f32) -> Result<SceneOperation<f32>, SceneError> {
        check_size(Property::Width, width)?;
        let object = self.object(id)?;
        let Shape::Box { width: from, .. } = object.shape else {
            return Err(mismatch(object, Property::Width));
        };
        Ok(self.commit(id, Property::Width, from, width, write_width))
    }

    pub fn set_height(
        &mut self,
        id: ObjectId,
        height: f32,
    ) -> Result<SceneOperation<f32>, SceneError> {
        check_size(Property::Height, height)?;
        let object = self.object(id)?;
        let Shape::Box { height: from, .. } = object.shape else {
            return Err(mismatch(object, Property::Height));
        };
        Ok(self.commit(id, Property::Height, from, height, write_height))
    }

    pub fn set_length(
        &mut self,
        id: ObjectId,
        length: f32,
    ) -> Result<SceneOperation<f32>, SceneError> {
        check_size(Property::Length, length)?;
        let object = self.object(id)?;
        let Shape::Box { length: from, .. } = object.shape else {
            return Err(mismatch(object, Property::Length));
        };
        Ok(self.commit(id, Property::Length, from, length, write_length))
    }

    pub fn set_scale(&mut self, id: ObjectId, scale: f32) -> Result<SceneOperation<f32>, SceneError> {
        check_size(Property::Scale, scale)?;
        let object = self.object(id)?;
        let Shape::Mesh { scale: from, .. } = object.shape else {
            return Err(mismatch(object, Property::Scale));
        };
        Ok(self.commit(id, Property::Scale, from, scale, write_scale))
    }

    /// Path of a mesh object, if `id` is one.
    pub fn mesh_path(&self, id: ObjectId) -> Option<&Path> {
        match &self.get(id)?.shape {
            Shape::Mesh { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }
}

fn mismatch(object: &SceneObject, property: Property) -> SceneError {
    SceneError::ShapeMismatch {
        shape: object.shape.kind(),
        property,
    }
}

fn check_size(property: Property, value: f32) -> Result<(), SceneError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SceneError::invalid(
            property,
            format!("{value} is not a positive size"),
        ));
    }
    Ok(())
}

fn check_finite(property: Property, value: Vec3) -> Result<(), SceneError> {
    if !value.is_finite() {
        return Err(SceneError::invalid(property, "components must be finite"));
    }
    Ok(())
}

// --- Write functions stored in history operations ---

#[allow(clippy::ptr_arg)]
fn write_name(scene: &mut Scene, id: ObjectId, value: &String) {
    if let Some(object) = scene.target_mut(id) {
        object.name.clone_from(value);
    }
}

fn write_color(scene: &mut Scene, id: ObjectId, value: &Color) {
    if let Some(object) = scene.target_mut(id) {
        object.color = *value;
    }
}

fn write_position(scene: &mut Scene, id: ObjectId, value: &Vec3) {
    if let Some(object) = scene.target_mut(id) {
        object.position = *value;
    }
}

fn write_rotation(scene: &mut Scene, id: ObjectId, value: &Vec3) {
    if let Some(object) = scene.target_mut(id) {
        object.rotation = *value;
    }
}

fn write_parent(scene: &mut Scene, id: ObjectId, value: &Option<ObjectId>) {
    // A recorded parent may have been deleted since; fall back to the root.
    let parent = value.filter(|p| {
        let exists = scene.contains(*p);
        if !exists {
            tracing::warn!(object = %id, "Recorded parent no longer exists, using scene root");
        }
        exists
    });
    if let Some(object) = scene.target_mut(id) {
        object.parent = parent;
    }
}

fn write_radius(scene: &mut Scene, id: ObjectId, value: &f32) {
    if let Some(SceneObject {
        shape: Shape::Sphere { radius },
        ..
    }) = scene.target_mut(id)
    {
        *radius = *value;
    }
}

fn write_width(scene: &mut Scene, id: ObjectId, value: &f32) {
    if let Some(SceneObject {
        shape: Shape::Box { width, .. },
        ..
    }) = scene.target_mut(id)
    {
        *width = *value;
    }
}

fn write_height(scene: &mut Scene, id: ObjectId, value: &f32) {
    if let Some(SceneObject {
        shape: Shape::Box { height, .. },
        ..
    }) = scene.target_mut(id)
    {
        *height = *value;
    }
}

fn write_length(scene: &mut Scene, id: ObjectId, value: &f32) {
    if let Some(SceneObject {
        shape: Shape::Box { length, .. },
        ..
    }) = scene.target_mut(id)
    {
        *length = *value;
    }
}

fn write_scale(scene: &mut Scene, id: ObjectId, value: &f32) {
    if let Some(SceneObject {
        shape: Shape::Mesh { scale, .. },
        ..
    }) = scene.target_mut(id)
    {
        *scale = *value;
    }
}
