use serde::{Deserialize, Serialize};

/// How the motion phase treats moves that would leave the arena.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// A move is applied only if it keeps the rover inside
    /// `[0, arena_dim - agent_size]`; violating moves are skipped and the
    /// rover survives at the boundary.
    #[default]
    Clamped,
    /// Moves are always applied; leaving the wall margin is a terminal
    /// penalized condition evaluated by the score phase.
    UnclampedPenalty,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for rock placement and rover spawning.
    pub seed: u64,
    /// Arena width in screen units.
    pub arena_width: f64,
    /// Arena height in screen units.
    pub arena_height: f64,
    /// Side length of a rover's square bounding box.
    pub agent_size: f64,
    /// Distance a rover moves per applied action.
    pub agent_speed: f64,
    /// Number of evenly spaced rays cast per rover per tick.
    pub ray_count: usize,
    /// Length of each cast ray.
    pub ray_view_radius: f64,
    /// Number of rocks generated per episode.
    pub rock_count: usize,
    /// Smallest generated rock side length.
    pub rock_min_size: f64,
    /// Largest generated rock side length.
    pub rock_max_size: f64,
    /// Extra forbidden-zone depth along each wall, added to half the agent
    /// size when checking boundary violations.
    pub boundary_offset: f64,
    /// Whether moves are clamped at the arena edge or applied unconditionally.
    pub movement_policy: MovementPolicy,
    /// Length of the recent-action ring buffer used by the oscillation
    /// check. 0 disables the check; otherwise at least 2.
    pub oscillation_window: usize,
    /// Score subtracted when a rover enters the wall margin (terminal).
    pub boundary_penalty: f64,
    /// Score subtracted per ray whose tracked rock overlaps the rover
    /// (terminal). A rock seen on several rays penalizes once per ray.
    pub collision_penalty: f64,
    /// Score added per ray whose tracked rock does not overlap the rover.
    pub ray_survival_bonus: f64,
    /// Score added each tick a rover survives.
    pub tick_bonus: f64,
    /// Score added the first time a rover enters a novelty cell.
    pub novelty_bonus: f64,
    /// Side length of the discretization cells backing the novelty bonus.
    pub novelty_cell_size: f64,
    /// Score subtracted when the oscillation check fires (terminal).
    pub jitter_penalty: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            arena_width: 640.0,
            arena_height: 480.0,
            agent_size: 10.0,
            agent_speed: 3.0,
            ray_count: 16,
            ray_view_radius: 100.0,
            rock_count: 25,
            rock_min_size: 5.0,
            rock_max_size: 15.0,
            boundary_offset: 10.0,
            movement_policy: MovementPolicy::Clamped,
            oscillation_window: 10,
            boundary_penalty: 500.0,
            collision_penalty: 0.6,
            ray_survival_bonus: 0.1,
            tick_bonus: 0.1,
            novelty_bonus: 1.0,
            novelty_cell_size: 10.0,
            jitter_penalty: 100.0,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidArenaWidth => "arena_width must be positive and finite";
    InvalidArenaHeight => "arena_height must be positive and finite";
    ArenaTooLarge { max: f64, actual: f64 } => "arena dimension ({actual}) exceeds supported maximum ({max})";
    InvalidAgentSize => "agent_size must be positive, finite, and smaller than both arena dimensions";
    InvalidAgentSpeed => "agent_speed must be positive and finite";
    InvalidRayCount { max: usize, actual: usize } => "ray_count ({}) must be between 1 and {}", actual, max;
    InvalidRayViewRadius => "ray_view_radius must be positive and finite";
    TooManyRocks { max: usize, actual: usize } => "rock_count ({}) exceeds supported maximum ({})", actual, max;
    InvalidRockSizeRange => "rock_min_size/rock_max_size must be finite, positive, ordered, and fit inside the arena";
    InvalidBoundaryOffset => "boundary_offset must be finite and non-negative";
    InvalidOscillationWindow => "oscillation_window must be 0 (disabled) or at least 2";
    InvalidBoundaryPenalty => "boundary_penalty must be finite and non-negative";
    InvalidCollisionPenalty => "collision_penalty must be finite and non-negative";
    InvalidRaySurvivalBonus => "ray_survival_bonus must be finite and non-negative";
    InvalidTickBonus => "tick_bonus must be finite and non-negative";
    InvalidNoveltyBonus => "novelty_bonus must be finite and non-negative";
    InvalidNoveltyCellSize => "novelty_cell_size must be positive and finite";
    InvalidJitterPenalty => "jitter_penalty must be finite and non-negative";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_ARENA_DIM: f64 = crate::constants::MAX_ARENA_DIM;
    pub const MAX_RAYS: usize = crate::constants::MAX_RAYS;
    pub const MAX_ROCKS: usize = crate::constants::MAX_ROCKS;

    /// Distance reported for rays with no visible rock: the arena diagonal.
    pub fn sentinel_distance(&self) -> f64 {
        self.arena_width.hypot(self.arena_height)
    }

    /// Length of the flattened feature vector:
    /// position (2) + boundary features (4) + four readings per ray.
    pub fn feature_len(&self) -> usize {
        2 + 4 + 4 * self.ray_count
    }

    /// Depth of the forbidden zone along each wall, measured from the wall
    /// to the rover's center.
    pub fn wall_margin(&self) -> f64 {
        self.agent_size / 2.0 + self.boundary_offset
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_arena()?;
        self.validate_agent()?;
        self.validate_perception()?;
        self.validate_rocks()?;
        self.validate_scoring()?;
        Ok(())
    }

    fn validate_arena(&self) -> Result<(), SimConfigError> {
        if !(self.arena_width.is_finite() && self.arena_width > 0.0) {
            return Err(SimConfigError::InvalidArenaWidth);
        }
        if !(self.arena_height.is_finite() && self.arena_height > 0.0) {
            return Err(SimConfigError::InvalidArenaHeight);
        }
        let largest = self.arena_width.max(self.arena_height);
        if largest > Self::MAX_ARENA_DIM {
            return Err(SimConfigError::ArenaTooLarge {
                max: Self::MAX_ARENA_DIM,
                actual: largest,
            });
        }
        Ok(())
    }

    fn validate_agent(&self) -> Result<(), SimConfigError> {
        if !(self.agent_size.is_finite()
            && self.agent_size > 0.0
            && self.agent_size < self.arena_width
            && self.agent_size < self.arena_height)
        {
            return Err(SimConfigError::InvalidAgentSize);
        }
        if !(self.agent_speed.is_finite() && self.agent_speed > 0.0) {
            return Err(SimConfigError::InvalidAgentSpeed);
        }
        if !(self.boundary_offset.is_finite() && self.boundary_offset >= 0.0) {
            return Err(SimConfigError::InvalidBoundaryOffset);
        }
        if self.oscillation_window == 1 {
            return Err(SimConfigError::InvalidOscillationWindow);
        }
        Ok(())
    }

    fn validate_perception(&self) -> Result<(), SimConfigError> {
        if self.ray_count == 0 || self.ray_count > Self::MAX_RAYS {
            return Err(SimConfigError::InvalidRayCount {
                max: Self::MAX_RAYS,
                actual: self.ray_count,
            });
        }
        if !(self.ray_view_radius.is_finite() && self.ray_view_radius > 0.0) {
            return Err(SimConfigError::InvalidRayViewRadius);
        }
        Ok(())
    }

    fn validate_rocks(&self) -> Result<(), SimConfigError> {
        if self.rock_count > Self::MAX_ROCKS {
            return Err(SimConfigError::TooManyRocks {
                max: Self::MAX_ROCKS,
                actual: self.rock_count,
            });
        }
        if !(self.rock_min_size.is_finite()
            && self.rock_max_size.is_finite()
            && self.rock_min_size > 0.0
            && self.rock_min_size <= self.rock_max_size
            && self.rock_max_size < self.arena_width
            && self.rock_max_size < self.arena_height)
        {
            return Err(SimConfigError::InvalidRockSizeRange);
        }
        Ok(())
    }

    fn validate_scoring(&self) -> Result<(), SimConfigError> {
        if !(self.boundary_penalty.is_finite() && self.boundary_penalty >= 0.0) {
            return Err(SimConfigError::InvalidBoundaryPenalty);
        }
        if !(self.collision_penalty.is_finite() && self.collision_penalty >= 0.0) {
            return Err(SimConfigError::InvalidCollisionPenalty);
        }
        if !(self.ray_survival_bonus.is_finite() && self.ray_survival_bonus >= 0.0) {
            return Err(SimConfigError::InvalidRaySurvivalBonus);
        }
        if !(self.tick_bonus.is_finite() && self.tick_bonus >= 0.0) {
            return Err(SimConfigError::InvalidTickBonus);
        }
        if !(self.novelty_bonus.is_finite() && self.novelty_bonus >= 0.0) {
            return Err(SimConfigError::InvalidNoveltyBonus);
        }
        if !(self.novelty_cell_size.is_finite() && self.novelty_cell_size > 0.0) {
            return Err(SimConfigError::InvalidNoveltyCellSize);
        }
        if !(self.jitter_penalty.is_finite() && self.jitter_penalty >= 0.0) {
            return Err(SimConfigError::InvalidJitterPenalty);
        }
        Ok(())
    }
}
