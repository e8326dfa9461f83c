//! Prototype geometry: low-poly animal models assembled from primitives.
//!
//! A [`Prototype`] is pure data. Renderers turn each [`Part`] into a mesh;
//! the pipeline only copies prototypes around.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::types::AnimalKind;

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Cone {
        radius: f32,
        height: f32,
        radial_segments: u32,
    },
}

impl Primitive {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Primitive::Box {
            width,
            height,
            depth,
        }
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Primitive::Sphere {
            radius,
            width_segments,
            height_segments,
        }
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        }
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Primitive::Cone {
            radius,
            height,
            radial_segments,
        }
    }
}

/// One coloured primitive placed relative to the model origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub primitive: Primitive,
    /// 0xRRGGBB
    pub color: u32,
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    #[serde(default)]
    pub rotation: Vec3,
}

impl Part {
    pub fn new(primitive: Primitive, color: u32) -> Self {
        Self {
            primitive,
            color,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x, y, z);
        self
    }
}

// ---------------------------------------------------------------------------
// Prototype
// ---------------------------------------------------------------------------

/// Template for placed instances. Never mutated once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub kind: AnimalKind,
    pub parts: Vec<Part>,
}

impl Prototype {
    /// Build the procedural model for `kind`.
    pub fn procedural(kind: AnimalKind) -> Self {
        let parts = match kind {
            AnimalKind::Fox => fox_parts(),
            AnimalKind::Rabbit => rabbit_parts(),
            AnimalKind::Bird => bird_parts(),
        };
        Self { kind, parts }
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

// ---------------------------------------------------------------------------
// Procedural animals
// ---------------------------------------------------------------------------

const FOX_FUR: u32 = 0xcc5500;
const FOX_EAR: u32 = 0xdd4400;
const FOX_CREAM: u32 = 0xffddb3;
const FOX_INNER_EAR: u32 = 0xffccaa;
const FOX_LEG: u32 = 0x8b4513;
const FOX_HOOF: u32 = 0x444444;
const BLACK: u32 = 0x000000;
const WHITE: u32 = 0xffffff;

fn fox_parts() -> Vec<Part> {
    let mut parts = vec![
        // body, lying along Z
        Part::new(Primitive::cylinder(0.12, 0.15, 0.8, 16), FOX_FUR)
            .at(0.0, 0.1, 0.0)
            .rotated(FRAC_PI_2, 0.0, 0.0),
        Part::new(Primitive::cuboid(0.25, 0.25, 0.3), FOX_FUR).at(0.0, 0.21, 0.42),
        Part::new(Primitive::cuboid(0.12, 0.1, 0.2), FOX_CREAM).at(0.0, 0.19, 0.6),
        Part::new(Primitive::sphere(0.025, 8, 8), BLACK).at(0.0, 0.2, 0.72),
    ];

    for side in [-1.0f32, 1.0] {
        parts.push(
            Part::new(Primitive::cone(0.08, 0.2, 6), FOX_EAR)
                .at(0.1 * side, 0.35, 0.37)
                .rotated(-0.5, 0.0, 0.2 * side),
        );
    }
    for side in [-1.0f32, 1.0] {
        parts.push(
            Part::new(Primitive::cone(0.04, 0.12, 6), FOX_INNER_EAR)
                .at(0.1 * side, 0.32, 0.39)
                .rotated(-0.5, 0.0, 0.2 * side),
        );
    }

    parts.push(
        Part::new(Primitive::cone(0.12, 0.6, 8), FOX_EAR)
            .at(0.0, 0.2, -0.45)
            .rotated(FRAC_PI_4, 0.0, 0.0),
    );
    parts.push(Part::new(Primitive::sphere(0.05, 8, 8), WHITE).at(0.0, 0.48, -0.73));

    for (x, z) in [(-0.15, 0.3), (0.15, 0.3), (-0.15, -0.3), (0.15, -0.3)] {
        parts.push(Part::new(Primitive::cylinder(0.04, 0.04, 0.2, 32), FOX_LEG).at(x, -0.05, z));
        parts.push(Part::new(Primitive::sphere(0.05, 8, 8), FOX_HOOF).at(x, -0.15, z));
    }

    for x in [-0.07, 0.07] {
        parts.push(Part::new(Primitive::sphere(0.03, 8, 8), BLACK).at(x, 0.25, 0.55));
    }

    parts
}

fn rabbit_parts() -> Vec<Part> {
    vec![
        Part::new(Primitive::sphere(0.2, 16, 16), WHITE).at(0.0, 0.1, 0.0),
        Part::new(Primitive::cylinder(0.03, 0.03, 0.2, 8), 0xffcccc).at(-0.05, 0.3, 0.0),
        Part::new(Primitive::cylinder(0.03, 0.03, 0.2, 8), 0xffcccc).at(0.05, 0.3, 0.0),
    ]
}

fn bird_parts() -> Vec<Part> {
    vec![
        Part::new(Primitive::sphere(0.15, 16, 16), 0x66ccff).at(0.0, 0.1, 0.0),
        Part::new(Primitive::cone(0.03, 0.1, 8), 0xffaa00)
            .at(0.0, 0.1, 0.18)
            .rotated(FRAC_PI_2, 0.0, 0.0),
    ]
}
