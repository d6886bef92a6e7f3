//! Colors, materials and lights

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An sRGB color, written as `#rrggbb` in configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ConfigError::InvalidColor(hex.to_string()))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels in 0..=1, still sRGB encoded
    pub fn to_srgb(&self) -> Vec3 {
        Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Linear-light channels for shading
    pub fn to_linear(&self) -> Vec3 {
        let decode = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        let s = self.to_srgb();
        Vec3::new(decode(s.x), decode(s.y), decode(s.z))
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Surface appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    /// Flat, unlit color
    Basic { color: Color },
    /// Lit surface with an emissive term
    Physical {
        color: Color,
        emissive: Color,
        metalness: f32,
        roughness: f32,
        reflectivity: f32,
    },
    /// Invisible except where shadowed
    Shadow { opacity: f32 },
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Material::Shadow { .. })
    }
}

/// Uniform light applied to every lit surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::rgb(0x6e, 0x6e, 0x6e),
            intensity: 1.0,
        }
    }
}

/// Cone light aimed at `target`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Half-angle of the cone (radians)
    pub angle: f32,
    /// Fraction of the cone that fades out (0 = hard edge)
    pub penumbra: f32,
    pub cast_shadow: bool,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            position: [0.0, 30.0, 0.0],
            target: [0.0, 0.0, 0.0],
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            cast_shadow: true,
        }
    }
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (Vec3::from(self.target) - Vec3::from(self.position)).normalize_or(Vec3::NEG_Y)
    }
}
