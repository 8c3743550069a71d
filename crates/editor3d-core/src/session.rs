/// Editing session: a scene plus its undo/redo history.
///
/// All edits go through the session so that every applied change is
/// recorded, and deletions prune the history before objects disappear.
use editor3d_config::{Color, EditorConfig};
use editor3d_history::{Operation, Pipeline};

use crate::error::SceneError;
use crate::object::{ObjectId, Shape};
use crate::property::{parse_color, parse_number, parse_vec3, Property};
use crate::scene::Scene;

/// One open document: its scene, history, and change tracking.
pub struct EditSession {
    scene: Scene,
    history: Pipeline<Scene>,
    default_color: Color,
    /// Whether the scene has changed since the session started.
    modified: bool,
    /// Incremented on every change to the scene.
    version: u64,
    /// Objects whose presentation must be re-read after undo/redo.
    pending_refresh: Vec<ObjectId>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("objects", &self.scene.len())
            .field("history", &self.history)
            .field("modified", &self.modified)
            .field("version", &self.version)
            .finish()
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            history: Pipeline::new(config.history()),
            default_color: config.default_color,
            modified: false,
            version: 0,
            pending_refresh: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &Pipeline<Scene> {
        &self.history
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Monotonic counter, bumped on every change to the scene.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.modified = true;
        self.version = self.version.wrapping_add(1);
    }

    /// Adds an object to the scene root. Creation is not recorded in history.
    pub fn create(&mut self, shape: Shape, name: Option<&str>) -> ObjectId {
        let kind = shape.kind();
        let id = self.scene.add(shape, name, self.default_color);
        tracing::info!(object = %id.short(), kind, "Created object");
        self.touch();
        id
    }

    /// Looks up an object by name.
    pub fn resolve(&self, name: &str) -> Result<ObjectId, SceneError> {
        self.scene
            .find_by_name(name)
            .map(|o| o.id)
            .ok_or_else(|| SceneError::UnknownName(name.to_string()))
    }

    /// Runs a scene setter and records the resulting operation.
    ///
    /// A rejected edit changes neither the scene nor the history.
    pub fn edit<V, F>(&mut self, f: F) -> Result<(), SceneError>
    where
        V: 'static,
        F: FnOnce(&mut Scene) -> Result<Operation<Scene, V>, SceneError>,
    {
        let op = f(&mut self.scene)?;
        self.history.add_operation(op);
        self.touch();
        Ok(())
    }

    /// Sets a property from its text form, as typed by the user.
    ///
    /// Parent values name another object; `none` or `-` attaches to the
    /// scene root.
    pub fn set_property(
        &mut self,
        id: ObjectId,
        property: Property,
        raw: &str,
    ) -> Result<(), SceneError> {
        match property {
            Property::Name => self.edit(|s| s.set_name(id, raw)),
            Property::Color => {
                let color = parse_color(raw)?;
                self.edit(|s| s.set_color(id, color))
            }
            Property::Position => {
                let position = parse_vec3(property, raw)?;
                self.edit(|s| s.set_position(id, position))
            }
            Property::Rotation => {
                let rotation = parse_vec3(property, raw)?;
                self.edit(|s| s.set_rotation(id, rotation))
            }
            Property::Parent => {
                let parent = match raw.trim() {
                    "" | "none" | "-" => None,
                    name => Some(self.resolve(name)?),
                };
                self.edit(|s| s.set_parent(id, parent))
            }
            Property::Radius => {
                let value = parse_number(property, raw)?;
                self.edit(|s| s.set_radius(id, value))
            }
            Property::Width => {
                let value = parse_number(property, raw)?;
                self.edit(|s| s.set_width(id, value))
            }
            Property::Height => {
                let value = parse_number(property, raw)?;
                self.edit(|s| s.set_height(id, value))
            }
            Property::Length => {
                let value = parse_number(property, raw)?;
                self.edit(|s| s.set_length(id, value))
            }
            Property::Scale => {
                let value = parse_number(property, raw)?;
                self.edit(|s| s.set_scale(id, value))
            }
        }
    }

    /// Reverts the last edit. Returns the object that changed, if any.
    pub fn undo(&mut self) -> Option<ObjectId> {
        let target = self.history.undo(&mut self.scene)?;
        self.after_replay(target);
        Some(target)
    }

    /// Re-applies the last undone edit. Returns the object that changed, if any.
    pub fn redo(&mut self) -> Option<ObjectId> {
        let target = self.history.redo(&mut self.scene)?;
        self.after_replay(target);
        Some(target)
    }

    fn after_replay(&mut self, target: ObjectId) {
        if !self.pending_refresh.contains(&target) {
            self.pending_refresh.push(target);
        }
        self.touch();
    }

    /// Deletes an object together with everything parented under it.
    ///
    /// History entries of every deleted object are pruned before the
    /// objects leave the scene. Returns the deleted ids, children first.
    pub fn delete(&mut self, id: ObjectId) -> Result<Vec<ObjectId>, SceneError> {
        if !self.scene.contains(id) {
            return Err(SceneError::UnknownObject(id));
        }
        let doomed = self.scene.descendants_of(id);
        let pruned: usize = doomed.iter().map(|&d| self.history.prune(d)).sum();
        for &d in &doomed {
            self.scene.remove(d);
        }
        self.pending_refresh.retain(|r| !doomed.contains(r));

        tracing::info!(
            object = %id.short(),
            removed = doomed.len(),
            pruned,
            "Deleted object"
        );
        self.touch();
        Ok(doomed)
    }

    /// Drains the objects changed by undo/redo since the last call,
    /// in the order they changed.
    pub fn take_refresh(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.pending_refresh)
    }
}
