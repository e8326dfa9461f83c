//! `CritterArClient`: the primary wasm-bindgen export.
//!
//! ## JavaScript usage
//!
//! ```js
//! import init, { CritterArClient } from './pkg/critter_ar_wasm.js';
//!
//! await init();
//!
//! const ar = new CritterArClient(true);   // build prototypes procedurally
//!
//! ar.onRender((json) => {
//!   const view = JSON.parse(json);
//!   reticle.visible = view.reticleVisible;
//!   reticle.matrix.fromArray(view.reticleMatrix);
//!   syncInstances(view.instances);
//!   renderer.render(scene, camera);
//! });
//!
//! renderer.xr.addEventListener('sessionstart', () => {
//!   const session = renderer.xr.getSession();
//!   ar.startSession(session, renderer.xr.getReferenceSpace());
//!   session.addEventListener('end', () => ar.endSession());
//! });
//! controller.addEventListener('select', () => ar.onSelect());
//! window.setAnimal = (name) => ar.selectKind(name);
//!
//! renderer.setAnimationLoop((time, frame) => ar.frame(frame));
//! ```

use wasm_bindgen::prelude::*;

use critter_ar::{
    AnimalKind, ArApp, ModelRegistry, PlacementError, Prototype, Renderer, Reticle, Scene,
};
use web_sys::{XrFrame, XrReferenceSpace, XrSession};

use crate::view::FrameView;
use crate::webxr::WebXrSession;

// ---------------------------------------------------------------------------
// JS renderer bridge
// ---------------------------------------------------------------------------

#[derive(Default)]
struct JsRenderer {
    on_render: Option<js_sys::Function>,
}

impl Renderer for JsRenderer {
    fn render(&mut self, scene: &Scene, reticle: &Reticle) {
        let Some(cb) = &self.on_render else {
            return;
        };
        let json = FrameView::capture(scene, reticle).to_json();
        if let Err(e) = cb.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log::error!("[client] render callback threw: {:?}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// CritterArClient
// ---------------------------------------------------------------------------

/// Primary Wasm API object.
///
/// Instantiate with `new CritterArClient(procedural)`. With `procedural =
/// false` the prototypes are expected through `installPrototype` (e.g. after
/// fetching model assets), with `assetFailed` as the fallback path.
#[wasm_bindgen]
pub struct CritterArClient {
    app: ArApp<WebXrSession>,
    session: Option<WebXrSession>,
    renderer: JsRenderer,
}

#[wasm_bindgen]
impl CritterArClient {
    #[wasm_bindgen(constructor)]
    pub fn new(procedural: bool) -> Self {
        let registry = if procedural {
            ModelRegistry::default()
        } else {
            ModelRegistry::new(AnimalKind::default())
        };
        Self {
            app: ArApp::with_parts(registry, Scene::new()),
            session: None,
            renderer: JsRenderer::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Callback registration
    // -----------------------------------------------------------------------

    /// `(json: string) => void`, called once per frame with a `FrameView`.
    #[wasm_bindgen(js_name = onRender)]
    pub fn on_render(&mut self, cb: js_sys::Function) {
        self.renderer.on_render = Some(cb);
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Attach to a freshly started XR session. Any previous session is ended
    /// first.
    #[wasm_bindgen(js_name = startSession)]
    pub fn start_session(&mut self, session: XrSession, render_space: XrReferenceSpace) {
        self.end_session();
        log::info!("[client] XR session started");
        self.session = Some(WebXrSession::new(session, render_space));
    }

    /// Call from the session's `end` event.
    #[wasm_bindgen(js_name = endSession)]
    pub fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.app.on_session_end(&mut session);
            session.close();
            log::info!("[client] XR session ended");
        }
    }

    /// Update the space hit poses are reported in.
    #[wasm_bindgen(js_name = setRenderSpace)]
    pub fn set_render_space(&mut self, space: XrReferenceSpace) {
        if let Some(session) = self.session.as_mut() {
            session.set_render_space(space);
        }
    }

    // -----------------------------------------------------------------------
    // Frame loop & input
    // -----------------------------------------------------------------------

    /// Animation-loop callback. `frame` is `undefined` outside a session.
    pub fn frame(&mut self, frame: Option<XrFrame>) {
        let tracked = match (self.session.as_mut(), frame.as_ref()) {
            (Some(session), Some(frame)) => Some((session, frame)),
            _ => None,
        };
        self.app.on_frame(tracked, &mut self.renderer);
    }

    /// Controller `select` event. Returns the new instance id, if any.
    #[wasm_bindgen(js_name = onSelect)]
    pub fn on_select(&mut self) -> Option<u64> {
        self.app.on_select().map(|id| id.0)
    }

    /// Switch the active animal. Unknown names are ignored.
    #[wasm_bindgen(js_name = selectKind)]
    pub fn select_kind(&mut self, name: &str) {
        self.app.select_kind(name);
    }

    #[wasm_bindgen(js_name = selectedKind)]
    pub fn selected_kind(&self) -> String {
        self.app.registry().selected().name().to_string()
    }

    // -----------------------------------------------------------------------
    // Prototypes
    // -----------------------------------------------------------------------

    /// Install a prototype from its JSON description.
    #[wasm_bindgen(js_name = installPrototype)]
    pub fn install_prototype(&mut self, json: &str) -> Result<bool, JsValue> {
        let prototype: Prototype =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.app.install_prototype(prototype))
    }

    /// Asset fetch for `kind` failed: install the procedural model instead.
    #[wasm_bindgen(js_name = assetFailed)]
    pub fn asset_failed(&mut self, kind: &str, reason: &str) -> Result<(), JsValue> {
        let kind: AnimalKind = kind
            .parse()
            .map_err(|e: PlacementError| JsValue::from_str(&e.to_string()))?;
        log::warn!(
            "[client] {}; using procedural model",
            PlacementError::AssetLoad {
                kind,
                reason: reason.to_string()
            }
        );
        self.app.install_prototype(Prototype::procedural(kind));
        Ok(())
    }

    /// JSON description of the prototype for `kind`, if installed.
    #[wasm_bindgen(js_name = prototypeJson)]
    pub fn prototype_json(&self, kind: &str) -> Option<String> {
        let kind: AnimalKind = kind.parse().ok()?;
        self.app
            .registry()
            .get(kind)
            .and_then(|p| serde_json::to_string(p).ok())
    }

    /// Number of placed instances.
    #[wasm_bindgen(js_name = instanceCount)]
    pub fn instance_count(&self) -> usize {
        self.app.scene().len()
    }

    /// `AppStats` as JSON.
    pub fn stats(&self) -> String {
        serde_json::to_string(&self.app.stats()).unwrap_or_default()
    }
}
