//! `ArApp`: the context object owning every piece of pipeline state, and
//! the frame loop that drives it.
//!
//! Hosts call into it from four places:
//!
//! | Host event                 | Call                       |
//! |----------------------------|----------------------------|
//! | display refresh callback   | [`ArApp::on_frame`]        |
//! | input `select`             | [`ArApp::on_select`]       |
//! | session `end`              | [`ArApp::on_session_end`]  |
//! | UI selector                | [`ArApp::select_kind`]     |
//!
//! All calls happen on one thread; none of them block.

use log::debug;

use crate::assets::AssetSource;
use crate::host::{ArSession, Renderer};
use crate::model::Prototype;
use crate::placement;
use crate::registry::ModelRegistry;
use crate::reticle::Reticle;
use crate::scene::{InstanceId, Scene};
use crate::tracker::{FeedPhase, SurfaceTracker};
use crate::types::{AppConfig, AppStats};

pub struct ArApp<S: ArSession> {
    tracker: SurfaceTracker<S::Feed>,
    reticle: Reticle,
    registry: ModelRegistry,
    scene: Scene,
    stats: AppStats,
}

impl<S: ArSession> ArApp<S> {
    /// Build the app with every prototype loaded per `config`.
    pub fn new(config: &AppConfig) -> Self {
        let source = AssetSource::from_dir(config.asset_dir.clone());
        let registry = ModelRegistry::load_all(config.initial_kind, &source);
        Self::with_parts(registry, Scene::with_cap(config.max_instances))
    }

    pub fn with_parts(registry: ModelRegistry, scene: Scene) -> Self {
        Self {
            tracker: SurfaceTracker::new(),
            reticle: Reticle::new(),
            registry,
            scene,
            stats: AppStats::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    /// One display refresh. Tracking runs only when the host supplied a
    /// frame; rendering always happens.
    pub fn on_frame<R: Renderer>(&mut self, tracked: Option<(&mut S, &S::Frame)>, renderer: &mut R) {
        self.stats.frames += 1;

        if let Some((session, frame)) = tracked {
            let surface = self.tracker.update(session, frame);
            self.reticle.apply(&surface);
            if surface.has_surface() {
                self.stats.frames_with_surface += 1;
            }
        }

        renderer.render(&self.scene, &self.reticle);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Handle a discrete select event. Returns the new instance, or `None`
    /// when the preconditions were not met.
    pub fn on_select(&mut self) -> Option<InstanceId> {
        match placement::place(&self.reticle, &self.registry, &mut self.scene) {
            Ok(id) => {
                self.stats.placements += 1;
                Some(id)
            }
            Err(e) => {
                debug!("Select ignored: {}", e);
                self.stats.rejected_placements += 1;
                None
            }
        }
    }

    pub fn select_kind(&mut self, name: &str) {
        self.registry.select_kind(name);
    }

    /// Make a prototype available, e.g. once an async asset load finishes.
    pub fn install_prototype(&mut self, prototype: Prototype) -> bool {
        self.registry.install(prototype)
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    pub fn on_session_end(&mut self, session: &mut S) {
        debug!("Session ended");
        self.tracker.end_session(session);
        self.reticle.hide();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn reticle(&self) -> &Reticle {
        &self.reticle
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn feed_phase(&self) -> FeedPhase {
        self.tracker.phase()
    }

    pub fn stats(&self) -> AppStats {
        AppStats {
            feed_requests: self.tracker.requests_issued(),
            live_instances: self.scene.len(),
            ..self.stats.clone()
        }
    }
}
