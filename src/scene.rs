//! Scene contents: the instances placed during a session.

use glam::{Quat, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::model::{Part, Prototype};
use crate::types::AnimalKind;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

/// An owned copy of a prototype with its own transform. Shares nothing with
/// the prototype or with other instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedInstance {
    pub id: InstanceId,
    pub kind: AnimalKind,
    pub position: Vec3,
    pub orientation: Quat,
    pub parts: Vec<Part>,
}

impl PlacedInstance {
    pub fn from_prototype(id: InstanceId, prototype: &Prototype, position: Vec3, orientation: Quat) -> Self {
        Self {
            id,
            kind: prototype.kind,
            position,
            orientation,
            parts: prototype.parts.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    instances: VecDeque<PlacedInstance>,
    next_id: u64,
    max_instances: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene that keeps at most `max` instances, evicting the oldest.
    pub fn with_cap(max: Option<usize>) -> Self {
        Self {
            max_instances: max,
            ..Self::default()
        }
    }

    /// Copy `prototype` into the scene at the given transform.
    pub fn spawn(&mut self, prototype: &Prototype, position: Vec3, orientation: Quat) -> InstanceId {
        self.next_id += 1;
        let id = InstanceId(self.next_id);

        if let Some(max) = self.max_instances {
            while self.instances.len() >= max.max(1) {
                if let Some(evicted) = self.instances.pop_front() {
                    debug!("Evicted {} ({} cap reached)", evicted.id, max);
                }
            }
        }

        self.instances
            .push_back(PlacedInstance::from_prototype(id, prototype, position, orientation));
        id
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<PlacedInstance> {
        let idx = self.instances.iter().position(|i| i.id == id)?;
        self.instances.remove(idx)
    }

    pub fn get(&self, id: InstanceId) -> Option<&PlacedInstance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut PlacedInstance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    /// Instances in placement order.
    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_increasing_ids() {
        let mut s = Scene::new();
        let p = Prototype::procedural(AnimalKind::Bird);
        let a = s.spawn(&p, Vec3::ZERO, Quat::IDENTITY);
        let b = s.spawn(&p, Vec3::ONE, Quat::IDENTITY);
        assert!(b > a);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn remove_returns_instance() {
        let mut s = Scene::new();
        let p = Prototype::procedural(AnimalKind::Rabbit);
        let id = s.spawn(&p, Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(s.remove(id).map(|i| i.kind), Some(AnimalKind::Rabbit));
        assert!(s.is_empty());
        assert!(s.remove(id).is_none());
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut s = Scene::with_cap(Some(2));
        let p = Prototype::procedural(AnimalKind::Fox);
        let first = s.spawn(&p, Vec3::ZERO, Quat::IDENTITY);
        let second = s.spawn(&p, Vec3::X, Quat::IDENTITY);
        let third = s.spawn(&p, Vec3::Y, Quat::IDENTITY);

        assert_eq!(s.len(), 2);
        assert!(s.get(first).is_none());
        let ids: Vec<_> = s.instances().map(|i| i.id).collect();
        assert_eq!(ids, vec![second, third]);
    }

    #[test]
    fn instance_owns_its_parts() {
        let mut s = Scene::new();
        let p = Prototype::procedural(AnimalKind::Bird);
        let id = s.spawn(&p, Vec3::ZERO, Quat::IDENTITY);
        s.get_mut(id).unwrap().parts[0].color = 0xff0000;
        assert_eq!(p.parts[0].color, 0x66ccff);
    }
}
