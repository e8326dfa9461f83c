//! Model registry: one prototype per animal kind plus the active selection.

use log::debug;
use std::collections::HashMap;

use crate::assets::{load_prototype, AssetSource};
use crate::error::PlacementError;
use crate::model::Prototype;
use crate::types::AnimalKind;

pub struct ModelRegistry {
    prototypes: HashMap<AnimalKind, Prototype>,
    selected: AnimalKind,
}

impl ModelRegistry {
    /// Empty registry with `selected` active. Prototypes arrive later
    /// through [`ModelRegistry::install`].
    pub fn new(selected: AnimalKind) -> Self {
        Self {
            prototypes: HashMap::new(),
            selected,
        }
    }

    /// Registry with every kind loaded from `source`.
    pub fn load_all(selected: AnimalKind, source: &AssetSource) -> Self {
        let mut registry = Self::new(selected);
        for kind in AnimalKind::ALL {
            registry.install(load_prototype(kind, source));
        }
        registry
    }

    /// Register a prototype under its own kind. A prototype already present
    /// for that kind is kept.
    pub fn install(&mut self, prototype: Prototype) -> bool {
        if self.prototypes.contains_key(&prototype.kind) {
            debug!("Prototype for {} already installed", prototype.kind);
            return false;
        }
        debug!("Installed {} prototype ({} parts)", prototype.kind, prototype.part_count());
        self.prototypes.insert(prototype.kind, prototype);
        true
    }

    pub fn get(&self, kind: AnimalKind) -> Option<&Prototype> {
        self.prototypes.get(&kind)
    }

    pub fn is_loaded(&self, kind: AnimalKind) -> bool {
        self.prototypes.contains_key(&kind)
    }

    /// Select a kind by name. Unknown names leave the selection unchanged.
    pub fn select_kind(&mut self, name: &str) {
        match name.parse::<AnimalKind>() {
            Ok(kind) => self.select(kind),
            Err(e) => debug!("Ignoring selection: {}", e),
        }
    }

    pub fn select(&mut self, kind: AnimalKind) {
        if kind != self.selected {
            debug!("Selected {}", kind);
        }
        self.selected = kind;
    }

    pub fn selected(&self) -> AnimalKind {
        self.selected
    }

    /// Prototype for the active selection, if it has been installed.
    pub fn current_prototype(&self) -> Option<&Prototype> {
        self.prototypes.get(&self.selected)
    }

    pub fn require_current(&self) -> Result<&Prototype, PlacementError> {
        self.current_prototype()
            .ok_or(PlacementError::ModelNotReady(self.selected))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::load_all(AnimalKind::default(), &AssetSource::Procedural)
    }
}
