//! Plain-data views handed to the JS renderer.
//!
//! Kept free of `web_sys` so it can be unit-tested natively.

use critter_ar::{PlacedInstance, Pose, Reticle, Scene};
use serde::Serialize;

/// Build a [`Pose`] from an `XRRigidTransform.matrix` value.
pub fn pose_from_slice(matrix: &[f32]) -> Option<Pose> {
    let matrix: [f32; 16] = matrix.try_into().ok()?;
    Some(Pose::from_matrix(matrix))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    pub id: u64,
    pub kind: &'static str,
    pub position: [f32; 3],
    /// Quaternion `[x, y, z, w]`, the order three.js `Quaternion.fromArray` expects.
    pub quaternion: [f32; 4],
}

impl From<&PlacedInstance> for InstanceView {
    fn from(i: &PlacedInstance) -> Self {
        Self {
            id: i.id.0,
            kind: i.kind.name(),
            position: i.position.to_array(),
            quaternion: i.orientation.to_array(),
        }
    }
}

/// Everything the JS side needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    pub reticle_visible: bool,
    /// Column-major, ready for `Matrix4.fromArray`.
    pub reticle_matrix: [f32; 16],
    pub instances: Vec<InstanceView>,
}

impl FrameView {
    pub fn capture(scene: &Scene, reticle: &Reticle) -> Self {
        Self {
            reticle_visible: reticle.visible,
            reticle_matrix: reticle.pose.matrix,
            instances: scene.instances().map(InstanceView::from).collect(),
        }
    }

    pub fn to_json(&self) -> String {
        // Only plain numbers, bools and strings: serialisation cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critter_ar::glam::{Quat, Vec3};
    use critter_ar::{AnimalKind, Prototype, SurfaceState};

    #[test]
    fn pose_from_slice_requires_sixteen_floats() {
        assert!(pose_from_slice(&[0.0; 15]).is_none());
        assert!(pose_from_slice(&[0.0; 17]).is_none());
        let mut m = [0.0f32; 16];
        m[0] = 1.0;
        m[14] = -2.0;
        assert_eq!(pose_from_slice(&m).map(|p| p.matrix), Some(m));
    }

    #[test]
    fn capture_hidden_reticle_and_empty_scene() {
        let view = FrameView::capture(&Scene::new(), &Reticle::new());
        assert!(!view.reticle_visible);
        assert!(view.instances.is_empty());
        let json: serde_json::Value = serde_json::from_str(&view.to_json()).unwrap();
        assert_eq!(json["reticleVisible"], false);
        assert_eq!(json["reticleMatrix"].as_array().map(|a| a.len()), Some(16));
    }

    #[test]
    fn capture_lists_instances_in_order() {
        let mut scene = Scene::new();
        let fox = Prototype::procedural(AnimalKind::Fox);
        let bird = Prototype::procedural(AnimalKind::Bird);
        scene.spawn(&fox, Vec3::new(0.0, 0.0, -1.0), Quat::IDENTITY);
        scene.spawn(&bird, Vec3::new(1.0, 0.0, -1.0), Quat::IDENTITY);

        let mut reticle = Reticle::new();
        reticle.apply(&SurfaceState::found(Pose::IDENTITY));

        let view = FrameView::capture(&scene, &reticle);
        assert!(view.reticle_visible);
        let kinds: Vec<_> = view.instances.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec!["fox", "bird"]);
        assert_eq!(view.instances[1].position, [1.0, 0.0, -1.0]);
        assert_eq!(view.instances[0].quaternion, [0.0, 0.0, 0.0, 1.0]);
    }
}
