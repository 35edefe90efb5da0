/// Viewer configuration
///
/// Every section is `#[serde(default)]`, so a partial JSON document only
/// overrides the values it names. `ViewerConfig::default()` is the stock
/// landing-page setup.
use nalgebra::Point3;
use serde::Deserialize;

use crate::error::Result;
use crate::loading::TextureSlot;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub entrance: EntranceConfig,
    pub particles: ParticleConfig,
    pub chrome: ChromeConfig,
    pub messages: MessageConfig,
    /// Idle model spin per frame, in radians
    pub auto_rotate_speed: f32,
}

impl ViewerConfig {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            entrance: EntranceConfig::default(),
            particles: ParticleConfig::default(),
            chrome: ChromeConfig::default(),
            messages: MessageConfig::default(),
            auto_rotate_speed: 0.005,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextureSource {
    pub slot: TextureSlot,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub mesh_url: String,
    pub textures: Vec<TextureSource>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        let texture = |slot: TextureSlot| TextureSource {
            slot,
            url: format!("gdgc/texture_{}_00.png", slot.as_str()),
        };
        Self {
            mesh_url: "gdgc/base.obj".to_string(),
            textures: TextureSlot::ALL.into_iter().map(texture).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Dramatic pose the entrance animation starts from
    pub start_position: [f32; 3],
    /// Resting pose, also used by camera reset
    pub rest_position: [f32; 3],
    pub max_pixel_ratio: f64,
}

impl CameraConfig {
    pub fn start(&self) -> Point3<f32> {
        Point3::from(self.start_position)
    }

    pub fn rest(&self) -> Point3<f32> {
        Point3::from(self.rest_position)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            start_position: [4.0, 3.0, 4.0],
            rest_position: [1.5, 1.5, 3.0],
            max_pixel_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Fixed `[min, max]` camera distance. `None` locks the distance the
    /// camera has when control is first enabled.
    pub distance_limits: Option<[f32; 2]>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::PI / 1.5,
            distance_limits: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntranceConfig {
    /// Wait after the mesh arrives before the animation starts
    pub settle_delay_ms: f64,
    /// Wait after the animation starts before the loader overlay goes away
    pub loader_dismiss_delay_ms: f64,
    pub step_per_frame: f64,
    pub target_scale: f32,
    pub start_rotation_y: f32,
    /// Largest extent of the model after centring, before the entrance scale
    pub normalized_size: f32,
}

impl Default for EntranceConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500.0,
            loader_dismiss_delay_ms: 2000.0,
            step_per_frame: 0.01,
            target_scale: 0.04,
            start_rotation_y: std::f32::consts::TAU,
            normalized_size: 0.12,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Edge length of the cube the particles are scattered in
    pub spread: f32,
    pub size: f32,
    pub opacity: f32,
    /// Fixed seed for reproducible layouts; the host picks one otherwise
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            spread: 50.0,
            size: 0.08,
            opacity: 0.4,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Added to the scroll position before matching it against sections
    pub scroll_offset: f64,
    pub navbar_scrolled_threshold: f64,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    /// Delay after window `load` before reveal observers are installed
    pub reveal_setup_delay_ms: i32,
    pub card_stagger_seconds: f32,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            scroll_offset: 100.0,
            navbar_scrolled_threshold: 50.0,
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            reveal_setup_delay_ms: 500,
            card_stagger_seconds: 0.1,
        }
    }
}

/// User-visible text shown in the loader overlay when the mesh fails
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub mesh_error_title: String,
    pub mesh_error_hint: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            mesh_error_title: "خطأ في تحميل المجسم".to_string(),
            mesh_error_hint: "تأكد من وجود ملف base.obj في مجلد gdgc".to_string(),
        }
    }
}
