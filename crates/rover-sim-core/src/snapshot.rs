//! Read-only views of a running episode: per-tick score reports for the
//! external optimizer and render snapshots for an external drawing surface.
//! Nothing here is required for stepping the world.

use crate::rock::Rock;
use serde::{Deserialize, Serialize};

/// One rover's score change for one tick.
///
/// Deltas are increments for the optimizer's own per-genome fitness
/// accumulator; the engine never reads or resets that accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub rover: usize,
    pub delta: f64,
}

/// Outcome of a single `World::step` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: usize,
    /// Score deltas for every rover that was active this tick, including
    /// those retired at its end.
    pub score_deltas: Vec<ScoreDelta>,
    /// IDs removed from the active set at the end of this tick.
    pub retired: Vec<usize>,
    pub active_remaining: usize,
}

/// How an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    /// Every rover reached a terminal state.
    Completed,
    /// The caller's tick budget ran out with rovers still active.
    TickBudget,
    /// The external abort signal fired (e.g. the render window closed).
    Aborted,
}

/// Final accounting for one rover.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoverScore {
    pub rover: usize,
    pub score: f64,
    pub ticks_survived: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub ticks: usize,
    pub status: EpisodeStatus,
    /// Cumulative scores for every rover the episode started with, sorted
    /// by rover ID.
    pub scores: Vec<RoverScore>,
}

/// One rover as seen by a renderer: position plus the rays cast from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoverSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub ray_endpoints: Vec<[f64; 2]>,
    /// Per-ray hit flags, in ray order, so a renderer can color hit rays
    /// differently.
    pub ray_hits: Vec<bool>,
}

/// A full drawable frame. Produced on demand; never consumed by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: usize,
    pub rocks: Vec<Rock>,
    pub rovers: Vec<RoverSnapshot>,
}
