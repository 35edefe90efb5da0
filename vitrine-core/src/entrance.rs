/// One-shot entrance animation
///
/// `Pending` until the model arrives, `Delayed` while the page settles,
/// `Animating` for a fixed number of ticks, then `Done` for good. Progress
/// advances by a fixed step per tick, so the animation length is measured in
/// frames, not milliseconds; only the two delays use wall-clock time.
use nalgebra::Point3;

use crate::config::{CameraConfig, EntranceConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntrancePhase {
    Pending,
    Delayed { since_ms: f64 },
    Animating { steps: u32, progress: f64 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceEvent {
    Started,
    Finished,
    /// The loader overlay should go away
    LoaderDismissed,
    /// Orbit control may take over the camera
    ControlsUnlocked,
}

/// Model and camera placement for one eased progress value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntrancePose {
    pub eased: f32,
    pub model_scale: f32,
    pub model_rotation_y: f32,
    pub camera_position: Point3<f32>,
}

pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone)]
pub struct EntranceSequencer {
    config: EntranceConfig,
    camera_start: Point3<f32>,
    camera_end: Point3<f32>,
    phase: EntrancePhase,
    started_ms: Option<f64>,
    loader_dismissed: bool,
    controls_unlocked: bool,
}

impl EntranceSequencer {
    pub fn new(config: EntranceConfig, camera_start: Point3<f32>, camera_end: Point3<f32>) -> Self {
        Self {
            config,
            camera_start,
            camera_end,
            phase: EntrancePhase::Pending,
            started_ms: None,
            loader_dismissed: false,
            controls_unlocked: false,
        }
    }

    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    /// True until the animation has finished
    pub fn is_active(&self) -> bool {
        self.phase != EntrancePhase::Done
    }

    pub fn is_done(&self) -> bool {
        self.phase == EntrancePhase::Done
    }

    pub fn controls_unlocked(&self) -> bool {
        self.controls_unlocked
    }

    /// Raw linear progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        match self.phase {
            EntrancePhase::Pending | EntrancePhase::Delayed { .. } => 0.0,
            EntrancePhase::Animating { progress, .. } => progress,
            EntrancePhase::Done => 1.0,
        }
    }

    /// The model is in the scene; start the settle delay
    pub fn model_loaded(&mut self, now_ms: f64) {
        if self.phase == EntrancePhase::Pending {
            self.phase = EntrancePhase::Delayed { since_ms: now_ms };
        }
    }

    /// Pose for an eased fraction, interpolating from the dramatic start to rest
    pub fn pose_at(&self, eased: f32) -> EntrancePose {
        EntrancePose {
            eased,
            model_scale: eased * self.config.target_scale,
            model_rotation_y: (1.0 - eased) * self.config.start_rotation_y,
            camera_position: self.camera_start + (self.camera_end - self.camera_start) * eased,
        }
    }

    /// Advance one frame. Returns the pose to apply, if any, plus whatever
    /// milestones were crossed on this frame.
    pub fn tick(&mut self, now_ms: f64) -> (Option<EntrancePose>, Vec<EntranceEvent>) {
        let mut events = Vec::new();

        if let EntrancePhase::Delayed { since_ms } = self.phase {
            if now_ms - since_ms >= self.config.settle_delay_ms {
                self.phase = EntrancePhase::Animating {
                    steps: 0,
                    progress: 0.0,
                };
                self.started_ms = Some(now_ms);
                log::info!("entrance animation started");
                events.push(EntranceEvent::Started);
            }
        }

        let pose = match self.phase {
            EntrancePhase::Animating { steps, .. } => Some(self.advance(steps + 1, &mut events)),
            _ => None,
        };

        if let Some(started) = self.started_ms {
            if !self.loader_dismissed && now_ms - started >= self.config.loader_dismiss_delay_ms {
                self.loader_dismissed = true;
                events.push(EntranceEvent::LoaderDismissed);
            }
        }
        if self.loader_dismissed && self.is_done() && !self.controls_unlocked {
            self.controls_unlocked = true;
            events.push(EntranceEvent::ControlsUnlocked);
        }

        (pose, events)
    }

    fn advance(&mut self, steps: u32, events: &mut Vec<EntranceEvent>) -> EntrancePose {
        let mut progress = (f64::from(steps) * self.config.step_per_frame).min(1.0);
        if progress > 1.0 - 1e-9 {
            progress = 1.0;
        }

        let pose = self.pose_at(ease_out_cubic(progress as f32));
        if progress >= 1.0 {
            self.phase = EntrancePhase::Done;
            log::info!("entrance animation finished after {steps} frames");
            events.push(EntranceEvent::Finished);
        } else {
            self.phase = EntrancePhase::Animating { steps, progress };
        }
        pose
    }
}

impl Default for EntranceSequencer {
    fn default() -> Self {
        let camera = CameraConfig::default();
        Self::new(EntranceConfig::default(), camera.start(), camera.rest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn started(now: f64) -> EntranceSequencer {
        let mut sequencer = EntranceSequencer::default();
        sequencer.model_loaded(now);
        sequencer
    }

    #[test]
    fn test_ease_out_cubic_endpoints_and_monotonic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let mut last = 0.0;
        for i in 1..=100 {
            let v = ease_out_cubic(i as f32 / 100.0);
            assert!(v > last);
            last = v;
        }
    }

    #[test]
    fn test_pending_without_model_never_moves() {
        let mut sequencer = EntranceSequencer::default();
        for frame in 0..300 {
            let (pose, events) = sequencer.tick(frame as f64 * 16.0);
            assert!(pose.is_none());
            assert!(events.is_empty());
        }
        assert_eq!(sequencer.phase(), EntrancePhase::Pending);
    }

    #[test]
    fn test_waits_for_settle_delay() {
        let mut sequencer = started(1000.0);
        let (pose, events) = sequencer.tick(1499.0);
        assert!(pose.is_none() && events.is_empty());

        let (pose, events) = sequencer.tick(1500.0);
        assert_eq!(events, vec![EntranceEvent::Started]);
        let pose = pose.unwrap();
        assert!(pose.eased > 0.0 && pose.eased < 0.05);
    }

    #[test]
    fn test_reaches_rest_in_one_hundred_frames() {
        let mut sequencer = started(0.0);
        let mut frames = 0;
        let mut last_progress = 0.0;
        let mut final_pose = None;
        let mut now = 500.0;
        while !sequencer.is_done() {
            let (pose, _) = sequencer.tick(now);
            assert!(sequencer.progress() >= last_progress);
            last_progress = sequencer.progress();
            final_pose = pose;
            frames += 1;
            now += 1.0;
        }
        assert_eq!(frames, 100);

        let pose = final_pose.unwrap();
        assert_eq!(pose.eased, 1.0);
        assert!((pose.model_scale - 0.04).abs() < 1e-7);
        assert!(pose.model_rotation_y.abs() < 1e-6);
        assert!((pose.camera_position - Point3::new(1.5, 1.5, 3.0)).norm() < 1e-6);
    }

    #[test]
    fn test_done_is_terminal() {
        let mut sequencer = started(0.0);
        let mut now = 500.0;
        while !sequencer.is_done() {
            sequencer.tick(now);
            now += 16.0;
        }
        for _ in 0..10 {
            now += 16.0;
            let (pose, events) = sequencer.tick(now);
            assert!(pose.is_none());
            assert!(!events.contains(&EntranceEvent::Started));
            assert!(!events.contains(&EntranceEvent::Finished));
        }
        sequencer.model_loaded(now);
        assert!(sequencer.is_done());
        assert_eq!(sequencer.progress(), 1.0);
    }

    #[test]
    fn test_pose_endpoints_and_interior() {
        let sequencer = EntranceSequencer::default();
        let start = sequencer.pose_at(0.0);
        assert_eq!(start.model_scale, 0.0);
        assert_eq!(start.camera_position, Point3::new(4.0, 3.0, 4.0));
        assert!((start.model_rotation_y - TAU).abs() < 1e-6);

        let middle = sequencer.pose_at(ease_out_cubic(0.3));
        assert!(middle.model_scale > 0.0 && middle.model_scale < 0.04);
        for axis in 0..3 {
            let (from, to) = (start.camera_position[axis], sequencer.pose_at(1.0).camera_position[axis]);
            let c = middle.camera_position[axis];
            assert!(c < from && c > to, "axis {axis}: {c}");
        }
    }

    #[test]
    fn test_loader_dismissal_and_unlock_order() {
        let mut sequencer = started(0.0);
        let mut now = 500.0;
        let mut seen = Vec::new();
        // 60 Hz: the animation ends before the dismissal delay
        while !sequencer.controls_unlocked() {
            let (_, events) = sequencer.tick(now);
            seen.extend(events);
            now += 1000.0 / 60.0;
        }
        assert_eq!(
            seen,
            vec![
                EntranceEvent::Started,
                EntranceEvent::Finished,
                EntranceEvent::LoaderDismissed,
                EntranceEvent::ControlsUnlocked,
            ]
        );
        assert!(now - 500.0 >= 2000.0);
    }

    #[test]
    fn test_slow_display_unlocks_only_after_finish() {
        let mut sequencer = started(0.0);
        let mut now = 500.0;
        let mut seen = Vec::new();
        // 20 Hz: the dismissal delay passes mid-animation
        while !sequencer.controls_unlocked() {
            let (_, events) = sequencer.tick(now);
            seen.extend(events);
            now += 50.0;
        }
        assert_eq!(
            seen,
            vec![
                EntranceEvent::Started,
                EntranceEvent::LoaderDismissed,
                EntranceEvent::Finished,
                EntranceEvent::ControlsUnlocked,
            ]
        );
    }
}
