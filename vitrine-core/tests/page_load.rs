//! Whole page-load flows driven through `Viewer` with a recording backend

use nalgebra::Point3;
use vitrine_core::config::ViewerConfig;
use vitrine_core::entrance::EntranceEvent;
use vitrine_core::geometry::Mesh;
use vitrine_core::loading::TextureSlot;
use vitrine_core::{
    parse_obj, Camera, EntrancePhase, MeshOutcome, RenderBackend, Scene, SceneControls,
    TextureHandle, Viewer, ViewerError,
};

const FRAME_MS: f64 = 16.0;

struct DrawnFrame {
    has_model: bool,
    lights: usize,
    particles: usize,
    camera: Point3<f32>,
}

#[derive(Default)]
struct RecordingBackend {
    frames: Vec<DrawnFrame>,
}

impl RenderBackend for RecordingBackend {
    fn draw(&mut self, scene: &Scene, camera: &Camera) {
        self.frames.push(DrawnFrame {
            has_model: scene.model.is_some(),
            lights: scene.lights.lights.len(),
            particles: scene.particles.len(),
            camera: camera.pose.position,
        });
    }
}

fn small_config() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    config.particles.count = 50;
    config
}

fn load_textures(viewer: &mut Viewer) {
    for (i, slot) in TextureSlot::ALL.iter().enumerate() {
        viewer.on_texture_loaded(*slot, Ok(TextureHandle(i as u32)));
    }
}

fn texture_error(slot: TextureSlot) -> ViewerError {
    ViewerError::asset_load(format!("gdgc/{slot}.png"), "404 Not Found")
}

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn all_assets_succeed_and_entrance_reaches_rest() {
    let mut viewer = Viewer::new(ViewerConfig::default(), 1280, 720, 3);
    let mut backend = RecordingBackend::default();

    load_textures(&mut viewer);
    let report = viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0), Mesh::cube(2.0)]), 100.0);
    assert_eq!(
        report.outcome,
        MeshOutcome::Inserted {
            surfaces: 2,
            textured: true
        }
    );
    assert!(report.progress.is_complete());
    assert_eq!(report.progress.percent(), 100.0);

    let mut now = 100.0;
    let mut started_at = None;
    let mut finished_at = None;
    let mut dismissed_at = None;
    let mut unlocked_at = None;
    for frame in 0..400 {
        for event in viewer.frame(now, &mut backend) {
            match event {
                EntranceEvent::Started => started_at = Some(frame),
                EntranceEvent::Finished => finished_at = Some(frame),
                EntranceEvent::LoaderDismissed => dismissed_at = Some(frame),
                EntranceEvent::ControlsUnlocked => unlocked_at = Some(frame),
            }
        }
        if started_at.is_none() {
            let camera = backend.frames[frame].camera;
            assert_eq!(camera, Point3::new(4.0, 3.0, 4.0), "camera moved before the settle delay");
        }
        now += FRAME_MS;
    }

    let started = started_at.unwrap();
    let finished = finished_at.unwrap();
    // First frame at least 500 ms after the model arrived
    assert_eq!(started, 32);
    assert_eq!(finished - started + 1, 100);
    assert!(dismissed_at.unwrap() > finished);
    assert_eq!(unlocked_at, dismissed_at);

    let rest_frame = &backend.frames[finished];
    assert_eq!(rest_frame.camera, Point3::new(1.5, 1.5, 3.0));
    assert!(viewer.orbit().is_enabled());
    assert_eq!(viewer.entrance_phase(), EntrancePhase::Done);

    let model = viewer.scene().model.as_ref().unwrap();
    assert!((model.transform.scale - 0.04).abs() < 1e-6);
    // Idle spin since the entrance finished
    let spun = (400 - finished) as f32 * 0.005;
    assert!((model.transform.rotation_y - spun).abs() < 1e-3);

    // Orbit control keeps the resting distance
    let final_camera = backend.frames.last().unwrap().camera;
    assert!((final_camera - Point3::new(1.5, 1.5, 3.0)).norm() < 1e-3);
}

#[test]
fn mesh_failure_keeps_backdrop_and_loop_running() {
    let mut viewer = Viewer::new(small_config(), 800, 600, 9);
    let mut backend = RecordingBackend::default();

    load_textures(&mut viewer);
    let report = viewer.on_mesh_loaded(parse_obj("this is not a mesh"), 40.0);
    assert_eq!(report.outcome, MeshOutcome::Failed);
    assert!(report.progress.is_complete());

    let mut now = 40.0;
    for _ in 0..300 {
        assert!(viewer.frame(now, &mut backend).is_empty());
        now += FRAME_MS;
    }

    assert_eq!(backend.frames.len(), 300);
    for frame in &backend.frames {
        assert!(!frame.has_model);
        assert_eq!(frame.lights, 13);
        assert_eq!(frame.particles, 50);
    }
    assert_eq!(viewer.entrance_phase(), EntrancePhase::Pending);
    assert!(!viewer.orbit().is_enabled());
    assert_eq!(viewer.toggle_wireframe(), None);
}

#[test]
fn fallback_material_iff_diffuse_missing_when_mesh_arrives() {
    let slots = TextureSlot::ALL;
    for order in permutations(&[0, 1, 2, 3]) {
        for success_mask in 0u32..16 {
            let mut viewer = Viewer::new(small_config(), 800, 600, 1);
            let mut completed = 0;
            for &index in &order {
                let slot = slots[index];
                let result = if success_mask & (1 << index) != 0 {
                    Ok(TextureHandle(index as u32))
                } else {
                    Err(texture_error(slot))
                };
                let progress = viewer.on_texture_loaded(slot, result);
                completed += 1;
                assert_eq!(progress.completed(), completed);
                assert!(progress.completed() <= progress.expected());
            }

            let diffuse_ok = viewer.textures().diffuse().is_some();
            let report = viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0), Mesh::cube(1.0), Mesh::cube(1.0)]), 0.0);
            assert_eq!(report.progress.completed(), 5);

            let model = viewer.scene().model.as_ref().unwrap();
            assert_eq!(model.surfaces.len(), 3);
            for surface in &model.surfaces {
                assert_eq!(surface.material.is_fallback(), !diffuse_ok, "order {order:?} mask {success_mask:04b}");
            }
        }
    }
}

#[test]
fn late_texture_does_not_rebuild_materials() {
    let mut viewer = Viewer::new(small_config(), 800, 600, 1);
    viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0)]), 0.0);
    viewer.on_texture_loaded(TextureSlot::Diffuse, Ok(TextureHandle(4)));

    let model = viewer.scene().model.as_ref().unwrap();
    assert!(model.surfaces[0].material.is_fallback());
    assert_eq!(viewer.progress().completed(), 2);
}

#[test]
fn repeated_completions_do_not_advance_progress() {
    let mut viewer = Viewer::new(small_config(), 800, 600, 1);
    viewer.on_texture_loaded(TextureSlot::Normal, Err(texture_error(TextureSlot::Normal)));
    let progress = viewer.on_texture_loaded(TextureSlot::Normal, Ok(TextureHandle(1)));
    assert_eq!(progress.completed(), 1);
    assert!(viewer.textures().get(TextureSlot::Normal).is_none());

    viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0)]), 0.0);
    let report = viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0)]), 10.0);
    assert_eq!(report.outcome, MeshOutcome::Ignored);
    assert_eq!(report.progress.completed(), 2);
}

#[test]
fn double_wireframe_toggle_keeps_materials() {
    let mut viewer = Viewer::new(small_config(), 800, 600, 1);
    load_textures(&mut viewer);
    viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0), Mesh::cube(0.5)]), 0.0);

    let before: Vec<_> = viewer.scene().model.as_ref().unwrap().surfaces.iter().map(|s| s.material.clone()).collect();

    assert_eq!(viewer.toggle_wireframe(), Some(true));
    assert!(viewer.scene().model.as_ref().unwrap().surfaces.iter().all(|s| s.material.wireframe));
    assert_eq!(viewer.toggle_wireframe(), Some(false));

    let after: Vec<_> = viewer.scene().model.as_ref().unwrap().surfaces.iter().map(|s| s.material.clone()).collect();
    assert_eq!(before, after);
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.id(), b.id());
    }
}

#[test]
fn paused_model_stops_spinning() {
    let mut viewer = Viewer::new(small_config(), 800, 600, 1);
    let mut backend = RecordingBackend::default();
    viewer.on_mesh_loaded(Ok(vec![Mesh::cube(1.0)]), 0.0);

    let mut now = 0.0;
    while viewer.entrance_phase() != EntrancePhase::Done {
        viewer.frame(now, &mut backend);
        now += FRAME_MS;
    }
    assert!(!viewer.toggle_animation());
    let rotation = viewer.scene().model.as_ref().unwrap().transform.rotation_y;
    for _ in 0..10 {
        viewer.frame(now, &mut backend);
        now += FRAME_MS;
    }
    assert_eq!(viewer.scene().model.as_ref().unwrap().transform.rotation_y, rotation);

    viewer.reset_camera();
    assert_eq!(viewer.camera().pose.position, Point3::new(1.5, 1.5, 3.0));
}
