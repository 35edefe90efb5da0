/// Scene composition: lighting rig, particle backdrop and the model slot
use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::config::{EntranceConfig, ParticleConfig};
use crate::geometry::{bounds_of, Aabb};
use crate::material::Surface;
use crate::transform::ModelTransform;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: [f32; 3],
        intensity: f32,
    },
    /// Shines from `position` towards the origin
    Directional {
        color: [f32; 3],
        intensity: f32,
        position: Point3<f32>,
    },
    Point {
        color: [f32; 3],
        intensity: f32,
        range: f32,
        position: Point3<f32>,
    },
    Hemisphere {
        sky: [f32; 3],
        ground: [f32; 3],
        intensity: f32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LightRig {
    pub lights: Vec<Light>,
}

impl LightRig {
    /// Bright all-round studio lighting
    pub fn studio() -> Self {
        let directional = |intensity: f32, x: f32, y: f32, z: f32| Light::Directional {
            color: WHITE,
            intensity,
            position: Point3::new(x, y, z),
        };
        let point = |intensity: f32, x: f32, y: f32, z: f32| Light::Point {
            color: WHITE,
            intensity,
            range: 50.0,
            position: Point3::new(x, y, z),
        };

        Self {
            lights: vec![
                Light::Ambient {
                    color: WHITE,
                    intensity: 8.0,
                },
                // main, front, back, left, right, top, bottom
                directional(10.0, 5.0, 10.0, 5.0),
                directional(8.0, 0.0, 5.0, 10.0),
                directional(6.0, 0.0, 5.0, -10.0),
                directional(6.0, -10.0, 5.0, 0.0),
                directional(6.0, 10.0, 5.0, 0.0),
                directional(8.0, 0.0, 15.0, 0.0),
                directional(6.0, 0.0, -10.0, 0.0),
                point(10.0, 5.0, 3.0, 5.0),
                point(10.0, -5.0, 3.0, -5.0),
                point(8.0, 0.0, 5.0, 8.0),
                point(8.0, 0.0, -3.0, 5.0),
                Light::Hemisphere {
                    sky: WHITE,
                    ground: WHITE,
                    intensity: 6.0,
                },
            ],
        }
    }

    pub fn count_where(&self, predicate: impl Fn(&Light) -> bool) -> usize {
        self.lights.iter().filter(|light| predicate(light)).count()
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0],
            near: 15.0,
            far: 60.0,
        }
    }
}

/// Blue, red, yellow
pub const PARTICLE_PALETTE: [[f32; 3]; 3] = [
    [0.15, 0.39, 0.92],
    [0.86, 0.15, 0.15],
    [0.96, 0.62, 0.04],
];

/// Static cloud of colored points drawn with additive blending
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub size: f32,
    pub opacity: f32,
}

impl ParticleField {
    pub fn generate(config: &ParticleConfig, rng: &mut impl Rng) -> Self {
        let mut positions = Vec::with_capacity(config.count);
        let mut colors = Vec::with_capacity(config.count);

        for _ in 0..config.count {
            let mut coordinate = || (rng.gen::<f32>() - 0.5) * config.spread;
            positions.push([coordinate(), coordinate(), coordinate()]);

            let choice = rng.gen::<f32>();
            let color = if choice < 0.33 {
                PARTICLE_PALETTE[0]
            } else if choice < 0.66 {
                PARTICLE_PALETTE[1]
            } else {
                PARTICLE_PALETTE[2]
            };
            colors.push(color);
        }

        Self {
            positions,
            colors,
            size: config.size,
            opacity: config.opacity,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The loaded model: its surfaces plus placement
#[derive(Debug, Clone)]
pub struct Model {
    pub surfaces: Vec<Surface>,
    pub transform: ModelTransform,
    pub bounds: Option<Aabb>,
}

impl Model {
    /// Centre the model on the origin at floor height, then hide it
    /// (zero scale, a full turn of pending spin) for the entrance.
    pub fn prepare(surfaces: Vec<Surface>, entrance: &EntranceConfig) -> Self {
        let bounds = bounds_of(surfaces.iter().map(|s| &s.mesh));

        let mut position = Vector3::zeros();
        if let Some(bounds) = &bounds {
            let max_dim = bounds.max_dimension();
            let scale = if max_dim > 0.0 {
                entrance.normalized_size / max_dim
            } else {
                1.0
            };
            position = -bounds.center().coords * scale;
            position.y = 0.0;
        }

        Self {
            surfaces,
            transform: ModelTransform {
                position,
                rotation_y: entrance.start_rotation_y,
                scale: 0.0,
            },
            bounds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub lights: LightRig,
    pub fog: Fog,
    pub particles: ParticleField,
    pub model: Option<Model>,
}

impl Scene {
    /// Lights and particles are fixed from here on; the model slot starts empty
    pub fn compose(particles: &ParticleConfig, rng: &mut impl Rng) -> Self {
        Self {
            lights: LightRig::studio(),
            fog: Fog::default(),
            particles: ParticleField::generate(particles, rng),
            model: None,
        }
    }

    pub fn insert_model(&mut self, model: Model) {
        self.model = Some(model);
    }
}
