use super::super::World;

impl World {
    /// Score this tick's transition for every rover and flag terminal
    /// states. Checks run in a fixed order per rover:
    ///
    /// 1. wall margin (terminal, skips the rest),
    /// 2. per-ray collision / survival against each ray's tracked rock,
    /// 3. survival tick bonus + first-visit novelty bonus,
    /// 4. oscillation (terminal).
    ///
    /// Rays were cast before motion, so the collision test pairs this
    /// tick's pre-move sightings with the post-move bounding box. A rock
    /// tracked by several rays scores once per ray, both ways.
    pub(in crate::world) fn step_score_phase(&mut self) {
        let config = &self.config;
        let rocks = self.rocks.rocks();
        let deltas = &mut self.deltas_buffer;
        let margin = config.wall_margin();

        deltas.clear();
        deltas.reserve(self.rovers.len());
        for (rover, frame) in self.rovers.iter_mut().zip(&self.frames) {
            let mut delta = 0.0;

            let in_margin = rover.x < margin
                || rover.x > config.arena_width - margin
                || rover.y < margin
                || rover.y > config.arena_height - margin;
            if in_margin {
                delta -= config.boundary_penalty;
                rover.alive = false;
                rover.score += delta;
                deltas.push(delta);
                continue;
            }

            for hit in &frame.hits {
                let Some(rock_idx) = hit else {
                    continue;
                };
                if rocks[*rock_idx].overlaps_square(rover.position(), config.agent_size) {
                    delta -= config.collision_penalty;
                    rover.alive = false;
                } else {
                    delta += config.ray_survival_bonus;
                }
            }

            if rover.alive {
                delta += config.tick_bonus;
                if rover.visit_cell(config.novelty_cell_size) {
                    delta += config.novelty_bonus;
                }
                if rover.history.is_two_cycle() {
                    delta -= config.jitter_penalty;
                    rover.alive = false;
                }
            }

            rover.score += delta;
            deltas.push(delta);
        }
    }
}
