/// Object color with serde support for `"#rrggbb"` / `"#rgb"` strings.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Light grey given to new objects unless configured otherwise.
    pub const DEFAULT_OBJECT: Color = Color::rgb(0xdd, 0xdd, 0xdd);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or the short `#rgb` form. Case-insensitive.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self { r, g, b })
            }
            3 => {
                // Each nibble is doubled: #abc == #aabbcc
                let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|n| n * 17);
                Some(Self {
                    r: nibble(0).ok()?,
                    g: nibble(1).ok()?,
                    b: nibble(2).ok()?,
                })
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_OBJECT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        assert_eq!(Color::from_hex("#FF8800"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(Color::from_hex("#ff8800"), Some(Color::rgb(255, 136, 0)));
    }

    #[test]
    fn test_parse_short_form() {
        assert_eq!(Color::from_hex("#ddd"), Some(Color::DEFAULT_OBJECT));
        assert_eq!(Color::from_hex("#f00"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_to_hex_is_lowercase() {
        assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_hex(), "#abcdef");
        assert_eq!(Color::DEFAULT_OBJECT.to_string(), "#dddddd");
    }

    #[test]
    fn test_invalid_input() {
        assert!(Color::from_hex("").is_none());
        assert!(Color::from_hex("#").is_none());
        assert!(Color::from_hex("#GG0000").is_none());
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("123456").is_none());
        assert!(Color::from_hex("#12345678").is_none());
        assert!(Color::from_hex("#ééé").is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let c = Color::rgb(212, 212, 212);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#d4d4d4\"");
        let parsed: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }
}
