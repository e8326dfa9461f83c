//! Critter AR
//!
//! Surface tracking and tap-to-place for low-poly animal models (fox,
//! rabbit, bird), independent of any particular AR runtime.
//!
//! ## Architecture
//!
//! ```text
//! ArApp  (app.rs)                      ← context object, frame loop
//!   ├── SurfaceTracker  (tracker.rs)   ← hit-test feed → SurfaceState
//!   ├── Reticle         (reticle.rs)   ← visibility + latest pose
//!   ├── ModelRegistry   (registry.rs)  ← prototypes + selection
//!   │     └── assets.rs / model.rs     ← asset file or procedural model
//!   └── Scene           (scene.rs)     ← placed instances
//!         ▲
//!         └── placement.rs             ← on select: copy prototype to reticle
//! ```
//!
//! Hosts plug in through [`host::ArSession`] and [`host::Renderer`].
//! `replay.rs` provides a scripted host for headless runs; the browser
//! host lives in `clients/wasm`.

pub mod app;
pub mod assets;
pub mod error;
pub mod host;
pub mod model;
pub mod placement;
pub mod registry;
pub mod replay;
pub mod reticle;
pub mod scene;
pub mod tracker;
pub mod types;

// Math types used throughout the public API.
pub use glam;

pub use app::ArApp;
pub use error::{PlacementError, PlacementResult};
pub use host::{ArSession, FeedPoll, FeedTicket, NullRenderer, Renderer};
pub use model::{Part, Primitive, Prototype};
pub use registry::ModelRegistry;
pub use reticle::Reticle;
pub use scene::{InstanceId, PlacedInstance, Scene};
pub use tracker::{FeedPhase, SurfaceState, SurfaceTracker};
pub use types::{AnimalKind, AppConfig, AppStats, Pose};
