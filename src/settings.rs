//! Scene configuration
//!
//! Read once at startup. On the web an optional
//! `<script type="application/json" id="scene-config">` block overrides the
//! defaults; missing fields keep their default values.

use serde::{Deserialize, Serialize};

use crate::consts::{SET_XS, SET_Z, SPHERE_RADIUS, SPHERE_SEGMENTS, TARGET_FPS};
use crate::error::ConfigError;
use crate::geometry::ExtrudeProfile;
use crate::scene::{AmbientLight, Color, Material, SpotLight};
use crate::sim::WaveParams;

/// Perspective camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 20.0,
            near: 1.0,
            far: 1000.0,
            position: [60.0, 60.0, -60.0],
        }
    }
}

/// Tile appearance and extrusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Top and bottom caps
    pub top: Material,
    /// Outer sides and hole walls
    pub inside: Material,
    pub profile: ExtrudeProfile,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            top: Material::Basic {
                color: Color::rgb(0xfa, 0x3f, 0xce),
            },
            inside: Material::Basic {
                color: Color::rgb(0x67, 0x1c, 0x87),
            },
            profile: ExtrudeProfile::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub radius: f32,
    pub segments: u32,
    pub material: Material,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            radius: SPHERE_RADIUS,
            segments: SPHERE_SEGMENTS,
            material: Material::Physical {
                color: Color::WHITE,
                emissive: Color::rgb(0xe0, 0x7c, 0xff),
                metalness: 0.2,
                roughness: 0.0,
                reflectivity: 1.0,
            },
        }
    }
}

/// Shadow-catching floor plane below the tiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub size: f32,
    pub y: f32,
    pub opacity: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            size: 50.0,
            y: -10.0,
            opacity: 0.08,
        }
    }
}

/// Full scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial wave parameters
    pub wave: WaveParams,
    /// Simulation steps per second
    pub target_fps: f64,
    /// Page background behind the transparent canvas
    pub background_color: Color,
    pub camera: CameraConfig,
    pub ambient: AmbientLight,
    pub spot: SpotLight,
    pub tile: TileConfig,
    pub sphere: SphereConfig,
    pub floor: FloorConfig,
    /// Tile + sphere placements as (x, z)
    pub placements: Vec<[f32; 2]>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            wave: WaveParams::default(),
            target_fps: TARGET_FPS,
            background_color: Color::rgb(0x6a, 0x2b, 0xff),
            camera: CameraConfig::default(),
            ambient: AmbientLight::default(),
            spot: SpotLight::default(),
            tile: TileConfig::default(),
            sphere: SphereConfig::default(),
            floor: FloorConfig::default(),
            placements: SET_XS.iter().map(|&x| [x, SET_Z]).collect(),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::MAX,
        });
    }
    Ok(())
}

fn finite(field: &'static str, values: &[f32]) -> Result<(), ConfigError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&v) => Err(ConfigError::NotFinite {
            field,
            value: v as f64,
        }),
        None => Ok(()),
    }
}

impl SceneConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ranges that deserialization can't
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wave.validate()?;
        positive("target_fps", self.target_fps)?;
        positive("camera.fov_degrees", self.camera.fov_degrees as f64)?;
        positive("camera.near", self.camera.near as f64)?;
        if !(self.camera.far > self.camera.near) {
            return Err(ConfigError::OutOfRange {
                field: "camera.far",
                value: self.camera.far as f64,
                min: self.camera.near as f64,
                max: f64::MAX,
            });
        }
        finite("camera.position", &self.camera.position)?;
        finite("spot.position", &self.spot.position)?;
        finite("spot.target", &self.spot.target)?;
        positive("sphere.radius", self.sphere.radius as f64)?;
        positive("floor.size", self.floor.size as f64)?;
        finite("floor.y", &[self.floor.y])?;
        if !(0.0..=1.0).contains(&self.floor.opacity) {
            return Err(ConfigError::OutOfRange {
                field: "floor.opacity",
                value: self.floor.opacity as f64,
                min: 0.0,
                max: 1.0,
            });
        }
        let coords: Vec<f32> = self.placements.iter().flatten().copied().collect();
        finite("placements", &coords)?;
        Ok(())
    }

    /// DOM element holding an optional JSON override
    const CONFIG_ELEMENT_ID: &'static str = "scene-config";

    /// Load configuration from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded scene config from #{}", Self::CONFIG_ELEMENT_ID);
                    return config;
                }
                Err(e) => log::warn!("Ignoring scene config: {}", e),
            }
        }

        log::info!("Using default scene config");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("No page to read #{} from, using defaults", Self::CONFIG_ELEMENT_ID);
        Self::default()
    }
}
