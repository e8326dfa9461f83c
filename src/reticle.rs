//! Reticle: the on-screen marker for the current placement point.

use serde::{Deserialize, Serialize};

use crate::tracker::SurfaceState;
use crate::types::Pose;

/// Visibility and pose of the reticle. No smoothing is applied; the pose is
/// always the latest measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reticle {
    pub visible: bool,
    pub pose: Pose,
}

impl Reticle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame's surface state. The pose is left untouched while
    /// hidden.
    pub fn apply(&mut self, surface: &SurfaceState) {
        self.visible = surface.has_surface();
        if let Some(pose) = surface.pose() {
            self.pose = pose;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// The pose a placement would use right now.
    pub fn target(&self) -> Option<Pose> {
        self.visible.then_some(self.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn starts_hidden() {
        let r = Reticle::new();
        assert!(!r.visible);
        assert_eq!(r.target(), None);
    }

    #[test]
    fn follows_surface_exactly() {
        let mut r = Reticle::new();
        let p = Pose::from_translation_rotation(Vec3::new(0.1, -1.2, -0.7), Quat::from_rotation_y(1.1));
        r.apply(&SurfaceState::found(p));
        assert!(r.visible);
        assert_eq!(r.pose.matrix, p.matrix);
    }

    #[test]
    fn hides_when_surface_lost() {
        let mut r = Reticle::new();
        let p = Pose::from_translation_rotation(Vec3::X, Quat::IDENTITY);
        r.apply(&SurfaceState::found(p));
        r.apply(&SurfaceState::NONE);
        assert!(!r.visible);
        assert_eq!(r.target(), None);
        // last pose retained for display
        assert_eq!(r.pose, p);
    }

    #[test]
    fn hide_keeps_last_pose() {
        let mut r = Reticle::new();
        let p = Pose::from_translation_rotation(Vec3::new(0.0, -1.0, -2.0), Quat::IDENTITY);
        r.apply(&SurfaceState::found(p));
        r.hide();
        assert!(!r.visible);
        assert_eq!(r.target(), None);
        assert_eq!(r.pose, p);
    }
}
