/// Viewer state and the per-frame update
///
/// `Viewer` owns everything the render loop touches: scene, camera, orbit
/// control, entrance sequencer, interaction flags and asset bookkeeping.
/// Hosts feed it asset completions and frame timestamps and hand it a
/// `RenderBackend` to draw with.
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ViewerConfig;
use crate::entrance::{EntranceEvent, EntrancePhase, EntrancePose, EntranceSequencer};
use crate::error::Result;
use crate::geometry::Mesh;
use crate::interaction::{InteractionFlags, SceneControls};
use crate::loading::{AssetId, AssetManifest, AssetTracker, LoadProgress, TextureHandle, TextureSet, TextureSlot};
use crate::material::{set_wireframe, MaterialAssembler};
use crate::orbit::OrbitControls;
use crate::projection::{Camera, CameraPose};
use crate::scene::{Model, Scene};

/// Something that can put a frame on screen
pub trait RenderBackend {
    fn draw(&mut self, scene: &Scene, camera: &Camera);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshOutcome {
    /// The model is in the scene and the entrance is scheduled
    Inserted { surfaces: usize, textured: bool },
    /// The scene stays empty; the host should show the error message
    Failed,
    /// A second completion for the mesh; nothing changed
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshLoadReport {
    pub outcome: MeshOutcome,
    pub progress: LoadProgress,
}

pub struct Viewer {
    config: ViewerConfig,
    manifest: AssetManifest,
    tracker: AssetTracker,
    textures: TextureSet,
    materials: MaterialAssembler,
    scene: Scene,
    camera: Camera,
    orbit: OrbitControls,
    entrance: EntranceSequencer,
    flags: InteractionFlags,
    frames: u64,
}

impl Viewer {
    /// `seed` places the particles unless the config pins one
    pub fn new(config: ViewerConfig, width: u32, height: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(config.particles.seed.unwrap_or(seed));
        let manifest = AssetManifest::from_config(&config.assets);
        let mut orbit = OrbitControls::new(&config.orbit);
        orbit.set_viewport_height(height as f32);

        Self {
            tracker: AssetTracker::new(&manifest),
            manifest,
            textures: TextureSet::new(),
            materials: MaterialAssembler::new(),
            scene: Scene::compose(&config.particles, &mut rng),
            camera: Camera::from_config(&config.camera, width, height),
            orbit,
            entrance: EntranceSequencer::new(
                config.entrance.clone(),
                config.camera.start(),
                config.camera.rest(),
            ),
            flags: InteractionFlags::default(),
            frames: 0,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn flags(&self) -> InteractionFlags {
        self.flags
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn progress(&self) -> LoadProgress {
        self.tracker.progress()
    }

    pub fn entrance_phase(&self) -> EntrancePhase {
        self.entrance.phase()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// A texture fetch finished. Failures only cost the texture.
    pub fn on_texture_loaded(&mut self, slot: TextureSlot, result: Result<TextureHandle>) -> LoadProgress {
        if !self.tracker.complete(AssetId::Texture(slot)) {
            return self.tracker.progress();
        }
        match result {
            Ok(handle) => {
                self.textures.insert(slot, handle);
                log::info!("Texture {slot} loaded");
            }
            Err(e) => log::warn!("Texture {slot} loading error: {e}"),
        }
        self.tracker.progress()
    }

    /// The mesh fetch finished. On success the model is materialised with
    /// whatever textures exist right now and the entrance is scheduled.
    pub fn on_mesh_loaded(&mut self, result: Result<Vec<Mesh>>, now_ms: f64) -> MeshLoadReport {
        if !self.tracker.complete(AssetId::Mesh) {
            return MeshLoadReport {
                outcome: MeshOutcome::Ignored,
                progress: self.tracker.progress(),
            };
        }

        let outcome = match result {
            Ok(meshes) => {
                let textured = self.textures.diffuse().is_some();
                let surfaces = self.materials.assemble(meshes, &self.textures, self.flags.wireframe);
                let count = surfaces.len();
                self.scene.insert_model(Model::prepare(surfaces, &self.config.entrance));
                self.entrance.model_loaded(now_ms);
                log::info!("Model loaded successfully ({count} surfaces, textured: {textured})");
                MeshOutcome::Inserted {
                    surfaces: count,
                    textured,
                }
            }
            Err(e) => {
                log::error!("Error loading model: {e}");
                MeshOutcome::Failed
            }
        };

        MeshLoadReport {
            outcome,
            progress: self.tracker.progress(),
        }
    }

    /// One tick of the render loop: entrance, idle spin, orbit damping, draw
    pub fn frame(&mut self, now_ms: f64, backend: &mut impl RenderBackend) -> Vec<EntranceEvent> {
        let mut events = Vec::new();

        if !self.entrance.controls_unlocked() {
            let (pose, tick_events) = self.entrance.tick(now_ms);
            if let Some(pose) = pose {
                self.apply_entrance_pose(&pose);
            }
            if tick_events.contains(&EntranceEvent::ControlsUnlocked) {
                self.orbit.enable(&self.camera.pose);
            }
            events = tick_events;
        }

        if self.entrance.is_done() && self.flags.auto_rotating {
            if let Some(model) = self.scene.model.as_mut() {
                model.transform.rotate_y(self.config.auto_rotate_speed);
            }
        }

        self.orbit.update(&mut self.camera.pose);
        backend.draw(&self.scene, &self.camera);
        self.frames += 1;
        events
    }

    fn apply_entrance_pose(&mut self, pose: &EntrancePose) {
        if let Some(model) = self.scene.model.as_mut() {
            model.transform.scale = pose.model_scale;
            model.transform.rotation_y = pose.model_rotation_y;
        }
        self.camera.pose.position = pose.camera_position;
        self.camera.pose.look_at(Point3::origin());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.orbit.set_viewport_height(height as f32);
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.orbit.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.orbit.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.orbit.pointer_up();
    }
}

impl SceneControls for Viewer {
    fn reset_camera(&mut self) {
        self.camera.pose = CameraPose::new(self.config.camera.rest(), Point3::origin());
        self.orbit.set_target(Point3::origin());
        self.orbit.update(&mut self.camera.pose);
    }

    fn toggle_animation(&mut self) -> bool {
        self.flags.auto_rotating = !self.flags.auto_rotating;
        self.flags.auto_rotating
    }

    fn toggle_wireframe(&mut self) -> Option<bool> {
        let model = self.scene.model.as_mut()?;
        self.flags.wireframe = !self.flags.wireframe;
        set_wireframe(&mut model.surfaces, self.flags.wireframe);
        Some(self.flags.wireframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingBackend {
        draws: usize,
    }

    impl RenderBackend for CountingBackend {
        fn draw(&mut self, _scene: &Scene, _camera: &Camera) {
            self.draws += 1;
        }
    }

    fn viewer() -> Viewer {
        Viewer::new(ViewerConfig::default(), 800, 600, 7)
    }

    #[test]
    fn test_every_frame_draws_once() {
        let mut viewer = viewer();
        let mut backend = CountingBackend::default();
        for i in 0..5 {
            viewer.frame(i as f64 * 16.0, &mut backend);
        }
        assert_eq!(backend.draws, 5);
        assert_eq!(viewer.frames_drawn(), 5);
    }

    #[test]
    fn test_actions_without_model() {
        let mut viewer = viewer();
        assert_eq!(viewer.toggle_wireframe(), None);
        assert!(!viewer.flags().wireframe);
        assert!(!viewer.toggle_animation());
        assert!(viewer.toggle_animation());

        viewer.reset_camera();
        assert_eq!(viewer.camera().pose.position, Point3::new(1.5, 1.5, 3.0));
        assert_eq!(viewer.camera().pose.target, Point3::origin());
    }

    #[test]
    fn test_duplicate_texture_completion_is_ignored() {
        let mut viewer = viewer();
        viewer.on_texture_loaded(TextureSlot::Diffuse, Ok(TextureHandle(1)));
        let progress = viewer.on_texture_loaded(TextureSlot::Diffuse, Ok(TextureHandle(2)));
        assert_eq!(progress.completed(), 1);
        assert_eq!(viewer.textures().diffuse(), Some(TextureHandle(1)));
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut viewer = viewer();
        viewer.resize(1200, 600);
        assert!((viewer.camera().aspect - 2.0).abs() < 1e-6);
    }
}
