/// User-facing viewer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionFlags {
    pub auto_rotating: bool,
    pub wireframe: bool,
}

impl Default for InteractionFlags {
    fn default() -> Self {
        Self {
            auto_rotating: true,
            wireframe: false,
        }
    }
}

/// The three buttons under the viewer. Implementations never fail.
pub trait SceneControls {
    /// Put the camera back at its resting pose, looking at the origin
    fn reset_camera(&mut self);

    /// Flip idle auto-rotation; returns the new state
    fn toggle_animation(&mut self) -> bool;

    /// Flip wireframe rendering; `None` when there is no model yet
    fn toggle_wireframe(&mut self) -> Option<bool>;
}

/// Icon shown on the play/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationIcon {
    Pause,
    Play,
}

impl AnimationIcon {
    pub fn for_state(auto_rotating: bool) -> Self {
        if auto_rotating {
            AnimationIcon::Pause
        } else {
            AnimationIcon::Play
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            AnimationIcon::Pause => "fas fa-pause",
            AnimationIcon::Play => "fas fa-play",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let flags = InteractionFlags::default();
        assert!(flags.auto_rotating);
        assert!(!flags.wireframe);
    }

    #[test]
    fn test_icon_follows_state() {
        assert_eq!(AnimationIcon::for_state(true).css_class(), "fas fa-pause");
        assert_eq!(AnimationIcon::for_state(false).css_class(), "fas fa-play");
    }
}
