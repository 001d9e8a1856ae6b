use super::super::World;
use crate::config::MovementPolicy;
use crate::controller::Action;

impl World {
    /// Apply the buffered action to each rover and record it in the
    /// oscillation history. Action indices outside the action set are a
    /// no-op but are still recorded.
    pub(in crate::world) fn step_motion_phase(&mut self) {
        let config = &self.config;
        for (rover, &action_index) in self.rovers.iter_mut().zip(&self.actions_buffer) {
            rover.ticks += 1;
            rover.history.push(action_index);

            let Some(action) = Action::from_index(action_index) else {
                continue;
            };
            let vel = rover.vel;
            let (dx, dy) = match action {
                Action::Up => (0.0, -vel),
                Action::Down => (0.0, vel),
                Action::Left => (-vel, 0.0),
                Action::Right => (vel, 0.0),
            };

            let applied = match config.movement_policy {
                // Only the moved axis is checked; a violating move is
                // skipped and the rover stays put.
                MovementPolicy::Clamped => match action {
                    Action::Up => rover.y + dy >= 0.0,
                    Action::Down => rover.y + dy <= config.arena_height - config.agent_size,
                    Action::Left => rover.x + dx >= 0.0,
                    Action::Right => rover.x + dx <= config.arena_width - config.agent_size,
                },
                MovementPolicy::UnclampedPenalty => true,
            };
            if applied {
                rover.x += dx;
                rover.y += dy;
            }
        }
    }
}
