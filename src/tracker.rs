//! Surface tracker: turns the host's per-frame hit-test feed into a
//! [`SurfaceState`].

use log::{debug, info, warn};

use crate::error::PlacementError;
use crate::host::{ArSession, FeedPoll, FeedTicket};
use crate::types::Pose;

// ---------------------------------------------------------------------------
// Surface state
// ---------------------------------------------------------------------------

/// Result of one frame's surface query. A pose is present exactly when a
/// surface was found.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceState {
    pose: Option<Pose>,
}

impl SurfaceState {
    pub const NONE: SurfaceState = SurfaceState { pose: None };

    pub fn found(pose: Pose) -> Self {
        Self { pose: Some(pose) }
    }

    /// Take the best-ranked hit, if any.
    pub fn from_hits(hits: Vec<Pose>) -> Self {
        Self {
            pose: hits.into_iter().next(),
        }
    }

    pub fn has_surface(&self) -> bool {
        self.pose.is_some()
    }

    pub fn pose(&self) -> Option<Pose> {
        self.pose
    }
}

// ---------------------------------------------------------------------------
// Feed status
// ---------------------------------------------------------------------------

enum FeedStatus<F> {
    /// No request issued in this session yet.
    Idle,
    Requested(FeedTicket),
    Ready(F),
    /// The host refused the feed; nothing more happens until the session ends.
    Unavailable,
}

/// Observable phase of the feed, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Idle,
    Requested(FeedTicket),
    Ready,
    Unavailable,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

pub struct SurfaceTracker<F> {
    status: FeedStatus<F>,
    next_ticket: u64,
    requests_issued: u64,
}

impl<F> SurfaceTracker<F> {
    pub fn new() -> Self {
        Self {
            status: FeedStatus::Idle,
            next_ticket: 1,
            requests_issued: 0,
        }
    }

    pub fn phase(&self) -> FeedPhase {
        match &self.status {
            FeedStatus::Idle => FeedPhase::Idle,
            FeedStatus::Requested(t) => FeedPhase::Requested(*t),
            FeedStatus::Ready(_) => FeedPhase::Ready,
            FeedStatus::Unavailable => FeedPhase::Unavailable,
        }
    }

    /// Feed requests issued over the tracker's lifetime.
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    /// Run one frame of surface tracking.
    ///
    /// Issues the session's feed request on first use, promotes it once the
    /// host resolves it, and queries the feed when ready. Never blocks.
    pub fn update<S>(&mut self, session: &mut S, frame: &S::Frame) -> SurfaceState
    where
        S: ArSession<Feed = F>,
    {
        if let FeedStatus::Idle = self.status {
            let ticket = FeedTicket(self.next_ticket);
            self.next_ticket += 1;
            self.requests_issued += 1;
            debug!("Requesting hit-test feed {}", ticket);
            session.request_hit_test_feed(ticket);
            self.status = FeedStatus::Requested(ticket);
        }

        if let FeedStatus::Requested(ticket) = self.status {
            match session.poll_hit_test_feed(ticket) {
                FeedPoll::Pending => {}
                FeedPoll::Ready(feed) => {
                    info!("Hit-test feed {} ready", ticket);
                    self.status = FeedStatus::Ready(feed);
                }
                FeedPoll::Refused(reason) => {
                    warn!("{}", PlacementError::SurfaceTrackingUnavailable(reason));
                    self.status = FeedStatus::Unavailable;
                }
            }
        }

        match &self.status {
            FeedStatus::Ready(feed) => SurfaceState::from_hits(session.hit_test_poses(frame, feed)),
            _ => SurfaceState::NONE,
        }
    }

    /// Session teardown: release any granted feed and arm a fresh request
    /// for the next session.
    pub fn end_session<S>(&mut self, session: &mut S)
    where
        S: ArSession<Feed = F>,
    {
        match std::mem::replace(&mut self.status, FeedStatus::Idle) {
            FeedStatus::Ready(feed) => {
                debug!("Releasing hit-test feed");
                session.release_hit_test_feed(feed);
            }
            FeedStatus::Requested(ticket) => {
                debug!("Abandoning pending hit-test feed {}", ticket);
            }
            FeedStatus::Idle | FeedStatus::Unavailable => {}
        }
    }
}

impl<F> Default for SurfaceTracker<F> {
    fn default() -> Self {
        Self::new()
    }
}
