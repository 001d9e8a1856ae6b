use crate::config::{SimConfig, SimConfigError};
use crate::controller::Controller;
use crate::perception::SensorFrame;
use crate::rock::{Rock, RockField, RockFieldError};
use crate::rover::Rover;
use crate::snapshot::{
    EpisodeStatus, EpisodeSummary, FrameSnapshot, RoverScore, RoverSnapshot, ScoreDelta,
    TickReport,
};
use std::collections::HashSet;
use std::{error::Error, fmt};

/// One episode: a fixed rock field, the active rover collection, and the
/// controllers paired with them. The active set only shrinks; the episode
/// is over when it is empty.
///
/// Each tick runs strictly phased: perceive-all, decide-all, move-all,
/// score-all, then retire the dead. No rover's decision in tick N can
/// observe another rover's tick-N motion.
pub struct World {
    rovers: Vec<Rover>,
    controllers: Vec<Box<dyn Controller>>,
    rocks: RockField,
    config: SimConfig,
    tick_index: usize,
    retired_scores: Vec<RoverScore>,

    // Per-tick scratch, parallel to `rovers`, rebuilt every tick.
    frames: Vec<SensorFrame>,
    actions_buffer: Vec<usize>,
    deltas_buffer: Vec<f64>,
}

#[derive(Debug)]
pub enum WorldInitError {
    Config(SimConfigError),
    Rocks(RockFieldError),
    NoRovers,
    ControllerCountMismatch { rovers: usize, controllers: usize },
    DuplicateRoverId { id: usize },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::Rocks(e) => write!(f, "{}", e),
            WorldInitError::NoRovers => write!(f, "an episode needs at least one rover"),
            WorldInitError::ControllerCountMismatch {
                rovers,
                controllers,
            } => write!(
                f,
                "controller count ({controllers}) must match rover count ({rovers})"
            ),
            WorldInitError::DuplicateRoverId { id } => {
                write!(f, "rover id {id} appears more than once")
            }
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl From<RockFieldError> for WorldInitError {
    fn from(err: RockFieldError) -> Self {
        WorldInitError::Rocks(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            WorldInitError::Rocks(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeError {
    InvalidMaxTicks,
    TooManyTicks { max: usize, actual: usize },
}

impl fmt::Display for EpisodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeError::InvalidMaxTicks => write!(f, "max_ticks must be positive"),
            EpisodeError::TooManyTicks { max, actual } => {
                write!(f, "max_ticks ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for EpisodeError {}

impl World {
    pub const MAX_EPISODE_TICKS: usize = 1_000_000;

    /// Build an episode with a rock field generated from `config.seed`.
    pub fn new(
        rovers: Vec<Rover>,
        controllers: Vec<Box<dyn Controller>>,
        config: SimConfig,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        let mut rng = crate::rng::create_rng(config.seed);
        let rocks = RockField::generate(&config, &mut rng);
        Self::assemble(rovers, controllers, rocks, config)
    }

    /// Build an episode over an explicit rock layout (validated against the
    /// arena before any tick runs).
    pub fn with_rocks(
        rovers: Vec<Rover>,
        controllers: Vec<Box<dyn Controller>>,
        rocks: Vec<Rock>,
        config: SimConfig,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        let rocks = RockField::from_rocks(rocks, &config)?;
        Self::assemble(rovers, controllers, rocks, config)
    }

    fn assemble(
        rovers: Vec<Rover>,
        controllers: Vec<Box<dyn Controller>>,
        rocks: RockField,
        config: SimConfig,
    ) -> Result<Self, WorldInitError> {
        if rovers.is_empty() {
            return Err(WorldInitError::NoRovers);
        }
        if rovers.len() != controllers.len() {
            return Err(WorldInitError::ControllerCountMismatch {
                rovers: rovers.len(),
                controllers: controllers.len(),
            });
        }
        let mut seen = HashSet::new();
        for rover in &rovers {
            if !seen.insert(rover.id) {
                return Err(WorldInitError::DuplicateRoverId { id: rover.id });
            }
        }

        let rover_count = rovers.len();
        Ok(Self {
            rovers,
            controllers,
            rocks,
            config,
            tick_index: 0,
            retired_scores: Vec::new(),
            frames: Vec::with_capacity(rover_count),
            actions_buffer: Vec::with_capacity(rover_count),
            deltas_buffer: Vec::with_capacity(rover_count),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn rocks(&self) -> &[Rock] {
        self.rocks.rocks()
    }

    pub fn rovers(&self) -> &[Rover] {
        &self.rovers
    }

    pub fn tick_index(&self) -> usize {
        self.tick_index
    }

    pub fn active_count(&self) -> usize {
        self.rovers.len()
    }

    pub fn is_finished(&self) -> bool {
        self.rovers.is_empty()
    }

    /// Advance one tick through the phase sequence and report score deltas.
    pub fn step(&mut self) -> TickReport {
        self.tick_index += 1;

        self.step_perceive_phase();
        self.step_decide_phase();
        self.step_motion_phase();
        self.step_score_phase();

        let score_deltas = self
            .rovers
            .iter()
            .zip(&self.deltas_buffer)
            .map(|(rover, &delta)| ScoreDelta {
                rover: rover.id,
                delta,
            })
            .collect();
        let retired = self.retire_dead();

        TickReport {
            tick: self.tick_index,
            score_deltas,
            retired,
            active_remaining: self.rovers.len(),
        }
    }

    /// Run until every rover is terminal, the tick budget runs out, or
    /// `abort` returns true. Abort is a cooperative early exit, not an
    /// error: the summary reports it as a status.
    pub fn run_episode(
        &mut self,
        max_ticks: usize,
        mut abort: impl FnMut() -> bool,
    ) -> Result<EpisodeSummary, EpisodeError> {
        if max_ticks == 0 {
            return Err(EpisodeError::InvalidMaxTicks);
        }
        if max_ticks > Self::MAX_EPISODE_TICKS {
            return Err(EpisodeError::TooManyTicks {
                max: Self::MAX_EPISODE_TICKS,
                actual: max_ticks,
            });
        }

        let mut status = EpisodeStatus::TickBudget;
        for _ in 0..max_ticks {
            if self.rovers.is_empty() {
                break;
            }
            if abort() {
                status = EpisodeStatus::Aborted;
                break;
            }
            self.step();
        }
        if self.rovers.is_empty() {
            status = EpisodeStatus::Completed;
        }

        Ok(self.summary(status))
    }

    fn summary(&self, status: EpisodeStatus) -> EpisodeSummary {
        let mut scores = self.retired_scores.clone();
        scores.extend(self.rovers.iter().map(|rover| RoverScore {
            rover: rover.id,
            score: rover.score,
            ticks_survived: rover.ticks,
        }));
        scores.sort_by_key(|s| s.rover);
        EpisodeSummary {
            ticks: self.tick_index,
            status,
            scores,
        }
    }

    /// Drawable view of the current state. Rays are recomputed from current
    /// positions so the renderer never sees a stale frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        let rovers = self
            .rovers
            .iter()
            .map(|rover| {
                let frame = SensorFrame::scan(rover.x, rover.y, &self.rocks, &self.config);
                RoverSnapshot {
                    id: rover.id,
                    x: rover.x,
                    y: rover.y,
                    ray_endpoints: frame.endpoints,
                    ray_hits: frame.hits.iter().map(Option::is_some).collect(),
                }
            })
            .collect();
        FrameSnapshot {
            tick: self.tick_index,
            rocks: self.rocks.rocks().to_vec(),
            rovers,
        }
    }

    /// Remove dead rovers and their controllers in lockstep, preserving the
    /// order of the survivors. Rebuild-from-filter rather than in-place
    /// removal while iterating, so no survivor is ever skipped.
    fn retire_dead(&mut self) -> Vec<usize> {
        if self.rovers.iter().all(|r| r.alive) {
            return Vec::new();
        }
        let old_rovers = std::mem::take(&mut self.rovers);
        let old_controllers = std::mem::take(&mut self.controllers);
        let mut retired = Vec::new();
        for (rover, controller) in old_rovers.into_iter().zip(old_controllers) {
            if rover.alive {
                self.rovers.push(rover);
                self.controllers.push(controller);
            } else {
                retired.push(rover.id);
                self.retired_scores.push(RoverScore {
                    rover: rover.id,
                    score: rover.score,
                    ticks_survived: rover.ticks,
                });
            }
        }
        retired
    }
}

mod phases;
#[cfg(test)]
mod tests;
