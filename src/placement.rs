//! Placement controller: copies the selected prototype onto the surface
//! under the reticle.

use log::info;

use crate::error::{PlacementError, PlacementResult};
use crate::registry::ModelRegistry;
use crate::reticle::Reticle;
use crate::scene::{InstanceId, Scene};

/// Handle one discrete select event.
///
/// Both preconditions are checked at call time: the reticle must be visible
/// and the selected prototype must exist. On failure the scene is untouched.
pub fn place(reticle: &Reticle, registry: &ModelRegistry, scene: &mut Scene) -> PlacementResult<InstanceId> {
    let pose = reticle.target().ok_or(PlacementError::NoSurface)?;
    let prototype = registry.require_current()?;

    let position = pose.translation();
    let id = scene.spawn(prototype, position, pose.rotation());
    info!("Placed {} {} at {}", prototype.kind, id, pose);
    Ok(id)
}
