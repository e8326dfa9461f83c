//! Host platform seams.
//!
//! The pipeline never talks to WebXR (or any other AR runtime) directly.
//! A host implements [`ArSession`] for its session object and [`Renderer`]
//! for whatever draws the scene.
//!
//! ## Feed acquisition
//!
//! Acquiring a hit-test feed is asynchronous on every real platform
//! (`requestReferenceSpace('viewer')` followed by `requestHitTestSource`).
//! The tracker issues exactly one request per session, tagged with a
//! [`FeedTicket`], and polls it on later frames:
//!
//! ```text
//! frame N    request_hit_test_feed(ticket)      -> host starts async work
//! frame N+1  poll_hit_test_feed(ticket)         -> Pending
//! frame N+k  poll_hit_test_feed(ticket)         -> Ready(feed) | Refused(reason)
//! ```
//!
//! A host must answer `Pending` for any ticket it does not recognise, and
//! release feeds that resolve for a ticket that was never polled to
//! completion (the session ended first).

use crate::reticle::Reticle;
use crate::scene::Scene;
use crate::types::Pose;

/// Identifies one feed request. Tickets increase monotonically for the
/// lifetime of a tracker, across sessions.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct FeedTicket(pub u64);

impl std::fmt::Display for FeedTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of polling an outstanding feed request.
#[derive(Debug)]
pub enum FeedPoll<F> {
    Pending,
    Ready(F),
    Refused(String),
}

/// The host AR session operations the pipeline depends on.
pub trait ArSession {
    /// Handle to a granted hit-test feed (`XRHitTestSource` on the web).
    type Feed;
    /// Per-frame tracking data (`XRFrame` on the web).
    type Frame;

    /// Start acquiring a hit-test feed keyed off the viewer reference space.
    /// Must return immediately.
    fn request_hit_test_feed(&mut self, ticket: FeedTicket);

    /// Non-blocking check on the request identified by `ticket`.
    fn poll_hit_test_feed(&mut self, ticket: FeedTicket) -> FeedPoll<Self::Feed>;

    /// Hit poses for `frame`, best first, expressed in the render
    /// reference space. Results without a pose are skipped by the host.
    fn hit_test_poses(&self, frame: &Self::Frame, feed: &Self::Feed) -> Vec<Pose>;

    /// Give a feed back to the platform.
    fn release_hit_test_feed(&mut self, feed: Self::Feed);
}

/// Draws the current scene. Called once per frame callback, unconditionally.
pub trait Renderer {
    fn render(&mut self, scene: &Scene, reticle: &Reticle);
}

/// Renderer that draws nothing; useful for headless hosts.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn render(&mut self, _scene: &Scene, _reticle: &Reticle) {
        self.frames += 1;
    }
}
