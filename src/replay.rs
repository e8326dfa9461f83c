//! Scripted host session.
//!
//! [`ScriptedSession`] implements [`ArSession`] from a recorded
//! [`SessionScript`] so the whole pipeline can run without a device: in the
//! `critter-ar-replay` binary and in tests.
//!
//! ## Script format (JSON)
//!
//! ```json
//! {
//!   "feed_latency_frames": 1,
//!   "refuse_feed": null,
//!   "frames": [
//!     { "hits": [] },
//!     { "hits": [{ "translation": [0.0, -1.2, -0.8] }], "events": ["select"] },
//!     { "tracked": false },
//!     { "events": [{ "select_kind": "rabbit" }, "end_session"] }
//!   ]
//! }
//! ```
//!
//! Hits are either `{ "matrix": [16 floats] }` or
//! `{ "translation": [x, y, z], "rotation": [x, y, z, w] }`, best first.
//! Events run after the frame they are attached to.

use glam::{Quat, Vec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashSet;

use crate::app::ArApp;
use crate::host::{ArSession, FeedPoll, FeedTicket, Renderer};
use crate::types::Pose;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptHit {
    Matrix {
        matrix: [f32; 16],
    },
    Transform {
        translation: Vec3,
        #[serde(default = "identity_rotation")]
        rotation: Quat,
    },
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

impl ScriptHit {
    pub fn pose(&self) -> Pose {
        match self {
            ScriptHit::Matrix { matrix } => Pose::from_matrix(*matrix),
            ScriptHit::Transform {
                translation,
                rotation,
            } => Pose::from_translation_rotation(*translation, *rotation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptEvent {
    Select,
    SelectKind(String),
    EndSession,
}

fn default_tracked() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptFrame {
    /// `false` models a refresh callback without a tracking frame.
    #[serde(default = "default_tracked")]
    pub tracked: bool,
    #[serde(default)]
    pub hits: Vec<ScriptHit>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl ScriptFrame {
    pub fn with_hits(hits: Vec<Pose>) -> Self {
        Self {
            tracked: true,
            hits: hits
                .into_iter()
                .map(|p| ScriptHit::Matrix { matrix: p.matrix })
                .collect(),
            events: Vec::new(),
        }
    }

    pub fn untracked() -> Self {
        Self {
            tracked: false,
            hits: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn then(mut self, event: ScriptEvent) -> Self {
        self.events.push(event);
        self
    }
}

fn default_latency() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    /// Polls answered `Pending` before the feed is granted.
    #[serde(default = "default_latency")]
    pub feed_latency_frames: u32,
    /// When set, every feed request is refused with this reason.
    #[serde(default)]
    pub refuse_feed: Option<String>,
    pub frames: Vec<ScriptFrame>,
}

impl SessionScript {
    pub fn new(frames: Vec<ScriptFrame>) -> Self {
        Self {
            feed_latency_frames: default_latency(),
            refuse_feed: None,
            frames,
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

// ---------------------------------------------------------------------------
// Scripted session
// ---------------------------------------------------------------------------

/// Feed handle granted by [`ScriptedSession`].
#[derive(Debug, PartialEq, Eq)]
pub struct ScriptedFeed {
    ticket: FeedTicket,
}

/// Hit results for one scripted frame.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrame {
    pub hits: Vec<Pose>,
}

struct Outstanding {
    ticket: FeedTicket,
    polls_left: u32,
}

pub struct ScriptedSession {
    latency: u32,
    refuse: Option<String>,
    outstanding: Option<Outstanding>,
    live_feeds: HashSet<FeedTicket>,
    requests: u64,
    releases: u64,
    overlapping_requests: u64,
    stale_queries: Cell<u64>,
    sessions: u64,
}

impl ScriptedSession {
    pub fn new(latency: u32, refuse: Option<String>) -> Self {
        Self {
            latency,
            refuse,
            outstanding: None,
            live_feeds: HashSet::new(),
            requests: 0,
            releases: 0,
            overlapping_requests: 0,
            stale_queries: Cell::new(0),
            sessions: 1,
        }
    }

    pub fn for_script(script: &SessionScript) -> Self {
        Self::new(script.feed_latency_frames, script.refuse_feed.clone())
    }

    /// Host side of session teardown: drop any unresolved request and start
    /// a fresh session on the same object.
    pub fn restart(&mut self) {
        if let Some(o) = self.outstanding.take() {
            debug!("Discarding unresolved feed request {}", o.ticket);
        }
        self.sessions += 1;
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Requests issued while an earlier one was still unresolved.
    pub fn overlapping_requests(&self) -> u64 {
        self.overlapping_requests
    }

    /// Queries made against a feed that had already been released.
    pub fn stale_queries(&self) -> u64 {
        self.stale_queries.get()
    }

    pub fn live_feeds(&self) -> usize {
        self.live_feeds.len()
    }

    pub fn sessions(&self) -> u64 {
        self.sessions
    }
}

impl ArSession for ScriptedSession {
    type Feed = ScriptedFeed;
    type Frame = ScriptedFrame;

    fn request_hit_test_feed(&mut self, ticket: FeedTicket) {
        self.requests += 1;
        if self.outstanding.is_some() {
            self.overlapping_requests += 1;
        }
        self.outstanding = Some(Outstanding {
            ticket,
            polls_left: self.latency,
        });
    }

    fn poll_hit_test_feed(&mut self, ticket: FeedTicket) -> FeedPoll<ScriptedFeed> {
        let Some(o) = self.outstanding.as_mut().filter(|o| o.ticket == ticket) else {
            return FeedPoll::Pending;
        };
        if o.polls_left > 0 {
            o.polls_left -= 1;
            return FeedPoll::Pending;
        }
        self.outstanding = None;
        match &self.refuse {
            Some(reason) => FeedPoll::Refused(reason.clone()),
            None => {
                self.live_feeds.insert(ticket);
                FeedPoll::Ready(ScriptedFeed { ticket })
            }
        }
    }

    fn hit_test_poses(&self, frame: &ScriptedFrame, feed: &ScriptedFeed) -> Vec<Pose> {
        if !self.live_feeds.contains(&feed.ticket) {
            warn!("Query against released feed {}", feed.ticket);
            self.stale_queries.set(self.stale_queries.get() + 1);
            return Vec::new();
        }
        frame.hits.clone()
    }

    fn release_hit_test_feed(&mut self, feed: ScriptedFeed) {
        if self.live_feeds.remove(&feed.ticket) {
            self.releases += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Run one script frame: the refresh callback, then the frame's events.
pub fn step<R: Renderer>(
    app: &mut ArApp<ScriptedSession>,
    session: &mut ScriptedSession,
    frame: &ScriptFrame,
    renderer: &mut R,
) {
    if frame.tracked {
        let tracked = ScriptedFrame {
            hits: frame.hits.iter().map(ScriptHit::pose).collect(),
        };
        app.on_frame(Some((&mut *session, &tracked)), renderer);
    } else {
        app.on_frame(None, renderer);
    }

    for event in &frame.events {
        match event {
            ScriptEvent::Select => {
                app.on_select();
            }
            ScriptEvent::SelectKind(name) => app.select_kind(name),
            ScriptEvent::EndSession => {
                app.on_session_end(session);
                session.restart();
            }
        }
    }
}

/// Run every frame of `script` back to back.
pub fn run_script<R: Renderer>(
    app: &mut ArApp<ScriptedSession>,
    session: &mut ScriptedSession,
    script: &SessionScript,
    renderer: &mut R,
) {
    for frame in &script.frames {
        step(app, session, frame, renderer);
    }
}

/// Shortest tick `run_paced` will use, whatever rate is asked for.
pub const MIN_FRAME_PERIOD: std::time::Duration = std::time::Duration::from_micros(100);

/// Tick period for `refresh_hz`. Rates below 1 Hz run at 1 Hz; rates too
/// high to represent (including infinity) run at [`MIN_FRAME_PERIOD`].
pub fn frame_period(refresh_hz: f32) -> std::time::Duration {
    std::time::Duration::from_secs_f32(1.0 / refresh_hz.max(1.0)).max(MIN_FRAME_PERIOD)
}

/// Run every frame of `script`, one per tick of a `refresh_hz` interval.
#[cfg(feature = "cli")]
pub async fn run_paced<R: Renderer>(
    app: &mut ArApp<ScriptedSession>,
    session: &mut ScriptedSession,
    script: &SessionScript,
    renderer: &mut R,
    refresh_hz: f32,
) {
    let mut interval = tokio::time::interval(frame_period(refresh_hz));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    for frame in &script.frames {
        interval.tick().await;
        step(app, session, frame, renderer);
    }
}
