pub mod config;
pub mod constants;
pub mod controller;
pub mod geometry;
pub mod nn;
pub mod perception;
pub mod rng;
pub mod rock;
pub mod rover;
pub mod snapshot;
pub mod world;

pub use config::{MovementPolicy, SimConfig, SimConfigError};
pub use controller::{argmax, Action, Controller, ACTION_COUNT};
pub use nn::NeuralNet;
pub use perception::SensorFrame;
pub use rock::{Rock, RockField};
pub use rover::Rover;
pub use snapshot::{
    EpisodeStatus, EpisodeSummary, FrameSnapshot, RoverScore, RoverSnapshot, ScoreDelta,
    TickReport,
};
pub use world::{EpisodeError, World, WorldInitError};
