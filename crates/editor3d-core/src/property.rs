/// Editable object properties and parsing of their text values.
use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use editor3d_config::Color;

use crate::error::SceneError;

/// A single editable field of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Name,
    Color,
    Position,
    Rotation,
    Parent,
    /// Spheres only.
    Radius,
    /// Boxes only.
    Width,
    /// Boxes only.
    Height,
    /// Boxes only.
    Length,
    /// Meshes only.
    Scale,
}

impl Property {
    pub const ALL: [Property; 10] = [
        Property::Name,
        Property::Color,
        Property::Position,
        Property::Rotation,
        Property::Parent,
        Property::Radius,
        Property::Width,
        Property::Height,
        Property::Length,
        Property::Scale,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Property::Name => "name",
            Property::Color => "color",
            Property::Position => "position",
            Property::Rotation => "rotation",
            Property::Parent => "parent",
            Property::Radius => "radius",
            Property::Width => "width",
            Property::Height => "height",
            Property::Length => "length",
            Property::Scale => "scale",
        }
    }

    /// History label of an edit to this property.
    pub fn label(self) -> &'static str {
        match self {
            Property::Name => "Rename",
            Property::Color => "Set color",
            Property::Position => "Move",
            Property::Rotation => "Rotate",
            Property::Parent => "Reparent",
            Property::Radius => "Set radius",
            Property::Width => "Set width",
            Property::Height => "Set height",
            Property::Length => "Set length",
            Property::Scale => "Set scale",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "pos" => return Ok(Property::Position),
            "rot" => return Ok(Property::Rotation),
            "colour" => return Ok(Property::Color),
            _ => {}
        }
        Property::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| SceneError::UnknownProperty(s.trim().to_string()))
    }
}

/// Parses a single finite number.
pub fn parse_number(property: Property, raw: &str) -> Result<f32, SceneError> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| SceneError::invalid(property, format!("'{}' is not a number", raw.trim())))?;
    if !value.is_finite() {
        return Err(SceneError::invalid(property, "value must be finite"));
    }
    Ok(value)
}

/// Parses three numbers separated by commas and/or whitespace.
pub fn parse_vec3(property: Property, raw: &str) -> Result<Vec3, SceneError> {
    let parts: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(SceneError::invalid(
            property,
            format!("expected three numbers, got '{}'", raw.trim()),
        ));
    };
    Ok(Vec3::new(
        parse_number(property, x)?,
        parse_number(property, y)?,
        parse_number(property, z)?,
    ))
}

pub fn parse_color(raw: &str) -> Result<Color, SceneError> {
    Color::from_hex(raw).ok_or_else(|| {
        SceneError::invalid(
            Property::Color,
            format!("'{}' is not a #rrggbb color", raw.trim()),
        )
    })
}
