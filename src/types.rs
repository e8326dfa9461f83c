//! Core types shared across all modules.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PlacementError;

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// A rigid transform reported by the host for a surface point.
///
/// The 16 floats are kept exactly as the host delivered them (column-major,
/// WebXR `XRRigidTransform.matrix` layout) so that the reticle can display
/// the latest measurement bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub matrix: [f32; 16],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_matrix(matrix: [f32; 16]) -> Self {
        Self { matrix }
    }

    /// Build a pose from its translation and rotation components.
    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            matrix: Mat4::from_rotation_translation(rotation, translation).to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&self.matrix)
    }

    /// Translation component (fourth column).
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.matrix[12], self.matrix[13], self.matrix[14])
    }

    /// Rotation component of the upper 3x3, normalised.
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.to_mat4().to_scale_rotation_translation();
        rotation.normalize()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.translation();
        write!(f, "({:.3}, {:.3}, {:.3})", t.x, t.y, t.z)
    }
}

// ---------------------------------------------------------------------------
// Animal kinds
// ---------------------------------------------------------------------------

/// The placeable animal kinds.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimalKind {
    #[default]
    Fox,
    Rabbit,
    Bird,
}

impl AnimalKind {
    pub const ALL: [AnimalKind; 3] = [AnimalKind::Fox, AnimalKind::Rabbit, AnimalKind::Bird];

    pub fn name(&self) -> &'static str {
        match self {
            AnimalKind::Fox => "fox",
            AnimalKind::Rabbit => "rabbit",
            AnimalKind::Bird => "bird",
        }
    }
}

impl FromStr for AnimalKind {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fox" => Ok(AnimalKind::Fox),
            "rabbit" => Ok(AnimalKind::Rabbit),
            "bird" => Ok(AnimalKind::Bird),
            other => Err(PlacementError::UnknownSelection(other.to_string())),
        }
    }
}

impl std::fmt::Display for AnimalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppStats {
    /// Frame callbacks handled, with or without a tracking frame.
    pub frames: u64,
    /// Frames on which a surface was detected.
    pub frames_with_surface: u64,
    /// Hit-test feed requests issued across all sessions.
    pub feed_requests: u64,
    /// Successful placements.
    pub placements: u64,
    /// Select events that did not place anything.
    pub rejected_placements: u64,
    /// Instances currently in the scene.
    pub live_instances: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Kind selected at startup.
    pub initial_kind: AnimalKind,
    /// Directory holding `<kind>.json` prototype assets. `None` builds
    /// every prototype procedurally.
    pub asset_dir: Option<std::path::PathBuf>,
    /// Upper bound on placed instances; the oldest is evicted past it.
    /// `None` keeps every placement for the session.
    pub max_instances: Option<usize>,
    /// Display refresh rate used when pacing replayed frames.
    pub refresh_hz: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_kind: AnimalKind::Fox,
            asset_dir: None,
            max_instances: None,
            refresh_hz: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_translation_reads_fourth_column() {
        let mut m = Pose::IDENTITY.matrix;
        m[12] = 1.5;
        m[13] = -0.25;
        m[14] = 3.0;
        let p = Pose::from_matrix(m);
        assert_eq!(p.translation(), Vec3::new(1.5, -0.25, 3.0));
    }

    #[test]
    fn pose_rotation_matches_source_quaternion() {
        let q = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let p = Pose::from_translation_rotation(Vec3::new(0.0, -1.0, -2.0), q);
        let r = p.rotation();
        // q and -q describe the same rotation
        assert!(r.dot(q).abs() > 0.9999, "got {:?}, want {:?}", r, q);
    }

    #[test]
    fn animal_kind_parses_known_names() {
        for kind in AnimalKind::ALL {
            assert_eq!(kind.name().parse::<AnimalKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn animal_kind_rejects_unknown_names() {
        assert!(matches!(
            "Fox".parse::<AnimalKind>(),
            Err(PlacementError::UnknownSelection(name)) if name == "Fox"
        ));
        assert!("unicorn".parse::<AnimalKind>().is_err());
    }
}
