use super::super::World;
use crate::controller::argmax;

impl World {
    /// Query every rover's controller with this tick's feature vector and
    /// buffer the chosen action indices. All decisions see pre-motion state.
    pub(in crate::world) fn step_decide_phase(&mut self) {
        let actions = &mut self.actions_buffer;
        let rovers = &self.rovers;
        let controllers = &self.controllers;
        let frames = &self.frames;
        let config = &self.config;

        actions.clear();
        actions.reserve(rovers.len());
        for ((rover, controller), frame) in rovers.iter().zip(controllers).zip(frames) {
            let features = frame.feature_vector(rover.x, rover.y, config);
            let outputs = controller.evaluate(&features);
            actions.push(argmax(&outputs));
        }
    }
}
