//! `WebXrSession`: [`ArSession`] over the browser's WebXR Device API.
//!
//! ## Threading model
//!
//! WASM is single-threaded. Feed acquisition runs as a cooperative future
//! via `wasm_bindgen_futures::spawn_local`; its result lands in a shared
//! `Rc<RefCell<…>>` slot that the tracker polls on later frames.
//!
//! ```text
//! request_hit_test_feed(ticket)
//!   slot.pending = ticket
//!   spawn_local:
//!     session.requestReferenceSpace('viewer')
//!     session.requestHitTestSource({ space })
//!     slot.resolved = (ticket, result)     if still pending
//!     source.cancel()                      otherwise (session ended)
//!
//! poll_hit_test_feed(ticket)
//!   takes slot.resolved when its ticket matches
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use critter_ar::{ArSession, FeedPoll, FeedTicket, Pose};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    XrFrame, XrHitTestOptionsInit, XrHitTestResult, XrHitTestSource, XrReferenceSpace,
    XrReferenceSpaceType, XrSession,
};

use crate::view::pose_from_slice;

// ---------------------------------------------------------------------------
// Shared feed slot (single-threaded, Rc/RefCell)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FeedSlot {
    /// Ticket of the request whose future is still running.
    pending: Option<FeedTicket>,
    /// Resolved request waiting to be polled.
    resolved: Option<(FeedTicket, Result<XrHitTestSource, String>)>,
    /// Set once the session has ended; late results are cancelled.
    closed: bool,
}

type SharedSlot = Rc<RefCell<FeedSlot>>;

// ---------------------------------------------------------------------------
// WebXrSession
// ---------------------------------------------------------------------------

pub struct WebXrSession {
    session: XrSession,
    /// Space hit poses are expressed in (the renderer's reference space).
    render_space: XrReferenceSpace,
    slot: SharedSlot,
}

impl WebXrSession {
    pub fn new(session: XrSession, render_space: XrReferenceSpace) -> Self {
        Self {
            session,
            render_space,
            slot: Rc::new(RefCell::new(FeedSlot::default())),
        }
    }

    /// The renderer may switch reference spaces mid-session.
    pub fn set_render_space(&mut self, space: XrReferenceSpace) {
        self.render_space = space;
    }

    /// Stop accepting feed results; anything already resolved is cancelled.
    pub fn close(&mut self) {
        let mut slot = self.slot.borrow_mut();
        slot.closed = true;
        slot.pending = None;
        if let Some((_, Ok(source))) = slot.resolved.take() {
            source.cancel();
        }
    }
}

impl Drop for WebXrSession {
    fn drop(&mut self) {
        self.close();
    }
}

async fn acquire_feed(session: &XrSession) -> Result<XrHitTestSource, JsValue> {
    let space: XrReferenceSpace =
        JsFuture::from(session.request_reference_space(XrReferenceSpaceType::Viewer))
            .await?
            .dyn_into()?;
    let options = XrHitTestOptionsInit::new(&space);
    let source: XrHitTestSource = JsFuture::from(session.request_hit_test_source(&options))
        .await?
        .dyn_into()?;
    Ok(source)
}

fn describe(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::Reflect::get(&err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| "hit-test source request rejected".to_string())
}

impl ArSession for WebXrSession {
    type Feed = XrHitTestSource;
    type Frame = XrFrame;

    fn request_hit_test_feed(&mut self, ticket: FeedTicket) {
        self.slot.borrow_mut().pending = Some(ticket);

        let session = self.session.clone();
        let slot = self.slot.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = acquire_feed(&session).await;
            let mut st = slot.borrow_mut();
            if !st.closed && st.pending == Some(ticket) {
                st.pending = None;
                st.resolved = Some((ticket, result.map_err(describe)));
            } else if let Ok(source) = result {
                log::debug!("[webxr] cancelling late hit-test source {}", ticket);
                source.cancel();
            }
        });
    }

    fn poll_hit_test_feed(&mut self, ticket: FeedTicket) -> FeedPoll<XrHitTestSource> {
        let mut st = self.slot.borrow_mut();
        match st.resolved.take() {
            Some((t, Ok(source))) if t == ticket => FeedPoll::Ready(source),
            Some((t, Err(reason))) if t == ticket => FeedPoll::Refused(reason),
            other => {
                st.resolved = other;
                FeedPoll::Pending
            }
        }
    }

    fn hit_test_poses(&self, frame: &XrFrame, feed: &XrHitTestSource) -> Vec<Pose> {
        frame
            .get_hit_test_results(feed)
            .iter()
            .filter_map(|v| v.dyn_into::<XrHitTestResult>().ok())
            .filter_map(|hit| hit.get_pose(&self.render_space))
            .filter_map(|pose| pose_from_slice(&pose.transform().matrix()))
            .collect()
    }

    fn release_hit_test_feed(&mut self, feed: XrHitTestSource) {
        feed.cancel();
    }
}
