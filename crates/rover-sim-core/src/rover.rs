use crate::config::SimConfig;
use crate::geometry::Point;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::collections::HashSet;

/// Fixed-capacity ring of recent action indices, sized by the configured
/// oscillation window. Capacity 0 disables recording entirely.
#[derive(Clone, Debug)]
pub struct ActionHistory {
    slots: Vec<usize>,
    head: usize,
    len: usize,
}

impl ActionHistory {
    pub fn new(window: usize) -> Self {
        Self {
            slots: vec![0; window],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, action: usize) {
        if self.slots.is_empty() {
            return;
        }
        self.slots[self.head] = action;
        self.head = (self.head + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    pub fn is_full(&self) -> bool {
        !self.slots.is_empty() && self.len == self.slots.len()
    }

    /// Recorded actions in chronological order, oldest first.
    pub fn ordered(&self) -> Vec<usize> {
        let cap = self.slots.len();
        (0..self.len)
            .map(|i| self.slots[(self.head + cap - self.len + i) % cap])
            .collect()
    }

    /// Detect a 2-cycle of alternating actions (e.g. up,down,up,down,...):
    /// the even-indexed and odd-indexed subsequences must each be internally
    /// constant while differing from each other. Only a full window counts.
    pub fn is_two_cycle(&self) -> bool {
        if !self.is_full() || self.slots.len() < 2 {
            return false;
        }
        let seq = self.ordered();
        let even = seq[0];
        let odd = seq[1];
        if even == odd {
            return false;
        }
        seq.iter()
            .enumerate()
            .all(|(i, &a)| if i % 2 == 0 { a == even } else { a == odd })
    }
}

/// One agent. Perception results live in a per-tick `SensorFrame` owned by
/// the world, not here; the rover itself carries only cross-tick state.
#[derive(Clone, Debug)]
pub struct Rover {
    /// Stable identifier, equal to the external optimizer's genome index.
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Distance moved per applied action.
    pub vel: f64,
    /// Ticks this rover has been alive.
    pub ticks: usize,
    pub alive: bool,
    /// Cumulative score. The engine only ever increments or decrements it.
    pub score: f64,
    pub history: ActionHistory,
    visited: HashSet<(i64, i64)>,
}

impl Rover {
    pub fn new(id: usize, x: f64, y: f64, config: &SimConfig) -> Self {
        Self {
            id,
            x,
            y,
            vel: config.agent_speed,
            ticks: 0,
            alive: true,
            score: 0.0,
            history: ActionHistory::new(config.oscillation_window),
            visited: HashSet::new(),
        }
    }

    /// Spawn at a uniform random arena position.
    pub fn spawn_random(id: usize, config: &SimConfig, rng: &mut ChaCha12Rng) -> Self {
        let x = rng.random_range(0.0..=config.arena_width);
        let y = rng.random_range(0.0..=config.arena_height);
        Self::new(id, x, y, config)
    }

    pub fn position(&self) -> Point {
        [self.x, self.y]
    }

    /// Record the current discretized cell in the visited set. Returns true
    /// the first time the cell is seen.
    pub fn visit_cell(&mut self, cell_size: f64) -> bool {
        let cell = (
            (self.x / cell_size).floor() as i64,
            (self.y / cell_size).floor() as i64,
        );
        self.visited.insert(cell)
    }
}
