use super::*;
use crate::config::MovementPolicy;
use crate::controller::{Action, ConstantController, ScriptedController, ACTION_COUNT};
use crate::nn::NeuralNet;
use crate::rng::create_rng;
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Open arena with movement penalties as the only scoring signal.
fn open_config() -> SimConfig {
    SimConfig {
        rock_count: 0,
        movement_policy: MovementPolicy::UnclampedPenalty,
        tick_bonus: 0.0,
        novelty_bonus: 0.0,
        ray_survival_bonus: 0.0,
        ..SimConfig::default()
    }
}

fn single_rover_world(
    rover: Rover,
    controller: impl Controller + 'static,
    rocks: Vec<Rock>,
    config: SimConfig,
) -> World {
    World::with_rocks(vec![rover], vec![Box::new(controller)], rocks, config)
        .expect("test world should build")
}

/// Records the first feature (rover x) passed to each evaluate call and
/// always moves right.
struct SpyController {
    seen_x: Rc<RefCell<Vec<f64>>>,
}

impl Controller for SpyController {
    fn evaluate(&self, features: &[f64]) -> [f64; ACTION_COUNT] {
        self.seen_x.borrow_mut().push(features[0]);
        let mut outputs = [0.0; ACTION_COUNT];
        outputs[Action::Right as usize] = 1.0;
        outputs
    }
}

#[test]
fn new_rejects_controller_count_mismatch() {
    let config = SimConfig::default();
    let rovers = vec![Rover::new(0, 320.0, 240.0, &config)];
    let result = World::new(rovers, Vec::new(), config);
    assert!(matches!(
        result,
        Err(WorldInitError::ControllerCountMismatch {
            rovers: 1,
            controllers: 0,
        })
    ));
}

#[test]
fn new_rejects_empty_rover_list() {
    let result = World::new(Vec::new(), Vec::new(), SimConfig::default());
    assert!(matches!(result, Err(WorldInitError::NoRovers)));
}

#[test]
fn new_rejects_duplicate_rover_ids() {
    let config = SimConfig::default();
    let rovers = vec![
        Rover::new(7, 100.0, 100.0, &config),
        Rover::new(7, 200.0, 200.0, &config),
    ];
    let controllers: Vec<Box<dyn Controller>> = vec![
        Box::new(ConstantController::favoring(Action::Up)),
        Box::new(ConstantController::favoring(Action::Up)),
    ];
    let result = World::new(rovers, controllers, config);
    assert!(matches!(
        result,
        Err(WorldInitError::DuplicateRoverId { id: 7 })
    ));
}

#[test]
fn new_rejects_invalid_config_before_any_tick() {
    let config = SimConfig {
        ray_count: 0,
        ..SimConfig::default()
    };
    let rovers = vec![Rover::new(0, 320.0, 240.0, &config)];
    let controllers: Vec<Box<dyn Controller>> =
        vec![Box::new(ConstantController::favoring(Action::Up))];
    let result = World::new(rovers, controllers, config);
    assert!(matches!(
        result,
        Err(WorldInitError::Config(SimConfigError::InvalidRayCount { .. }))
    ));
}

#[test]
fn with_rocks_rejects_degenerate_rocks() {
    let config = SimConfig::default();
    let rovers = vec![Rover::new(0, 320.0, 240.0, &config)];
    let controllers: Vec<Box<dyn Controller>> =
        vec![Box::new(ConstantController::favoring(Action::Up))];
    let result = World::with_rocks(
        rovers,
        controllers,
        vec![Rock {
            x: 10.0,
            y: 10.0,
            width: -1.0,
            height: 5.0,
        }],
        config,
    );
    assert!(matches!(
        result,
        Err(WorldInitError::Rocks(RockFieldError::NonPositiveDimensions { index: 0 }))
    ));
}

#[test]
fn one_unit_inside_the_wall_margin_is_terminal() {
    let config = open_config();
    // margin = agent_size/2 + boundary_offset = 15.
    let rover = Rover::new(0, 14.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Up),
        Vec::new(),
        config.clone(),
    );
    let report = world.step();
    assert_eq!(report.retired, vec![0]);
    assert_eq!(report.active_remaining, 0);
    assert_eq!(report.score_deltas[0].delta, -config.boundary_penalty);
}

#[test]
fn exactly_on_the_wall_margin_survives() {
    let config = open_config();
    let rover = Rover::new(0, 15.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Up),
        Vec::new(),
        config.clone(),
    );
    let report = world.step();
    assert!(report.retired.is_empty());
    assert_eq!(report.active_remaining, 1);
    assert_eq!(report.score_deltas[0].delta, 0.0);
}

#[test]
fn constant_right_reaches_the_boundary_within_the_expected_ticks() {
    let config = open_config();
    let start_x = 320.0;
    let rover = Rover::new(0, start_x, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Right),
        Vec::new(),
        config.clone(),
    );
    let summary = world
        .run_episode(10_000, || false)
        .expect("tick budget is valid");

    // Death on the first tick with x > arena_width - margin.
    let margin = config.wall_margin();
    let expected_ticks =
        ((config.arena_width - margin - start_x) / config.agent_speed).floor() as usize + 1;
    assert_eq!(summary.status, EpisodeStatus::Completed);
    assert_eq!(summary.ticks, expected_ticks);
    assert_eq!(summary.scores.len(), 1);
    assert_eq!(summary.scores[0].score, -config.boundary_penalty);
    assert_eq!(summary.scores[0].ticks_survived, expected_ticks);
    // The whole-arena crossing bound from a wall start.
    let crossing_bound = ((config.arena_width - 2.0 * config.boundary_offset)
        / config.agent_speed)
        .ceil() as usize;
    assert!(summary.ticks <= crossing_bound + 1);
}

#[test]
fn clamped_policy_skips_boundary_violating_moves() {
    let config = SimConfig {
        movement_policy: MovementPolicy::Clamped,
        boundary_offset: 0.0,
        rock_count: 0,
        tick_bonus: 0.0,
        novelty_bonus: 0.0,
        ray_survival_bonus: 0.0,
        ..SimConfig::default()
    };
    // Clamp bound for x is arena_width - agent_size = 630; the kill margin
    // is only 5, so the rover parks against the bound and survives.
    let rover = Rover::new(0, 629.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Right),
        Vec::new(),
        config,
    );
    for _ in 0..5 {
        let report = world.step();
        assert!(report.retired.is_empty());
    }
    assert_eq!(world.rovers()[0].x, 629.0, "violating moves are skipped");
    assert!(world.rovers()[0].alive);
}

#[test]
fn alternating_actions_trigger_the_jitter_kill() {
    let config = open_config();
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ScriptedController::new(vec![Action::Up as usize, Action::Down as usize]),
        Vec::new(),
        config.clone(),
    );
    let summary = world.run_episode(100, || false).expect("budget is valid");
    assert_eq!(summary.status, EpisodeStatus::Completed);
    assert_eq!(
        summary.ticks, config.oscillation_window,
        "the kill fires the tick the window fills"
    );
    assert_eq!(summary.scores[0].score, -config.jitter_penalty);
}

#[test]
fn oscillation_window_zero_disables_the_jitter_kill() {
    let config = SimConfig {
        oscillation_window: 0,
        ..open_config()
    };
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ScriptedController::new(vec![Action::Up as usize, Action::Down as usize]),
        Vec::new(),
        config,
    );
    let summary = world.run_episode(50, || false).expect("budget is valid");
    assert_eq!(summary.status, EpisodeStatus::TickBudget);
    assert_eq!(summary.ticks, 50);
    assert_eq!(summary.scores[0].ticks_survived, 50);
}

#[test]
fn collision_penalizes_once_per_sighting_ray() {
    let config = open_config();
    let rock = Rock {
        x: 330.0,
        y: 190.0,
        width: 100.0,
        height: 100.0,
    };
    let rover = Rover::new(0, 335.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Right),
        vec![rock],
        config.clone(),
    );

    // Rays are cast before motion; count this tick's sightings up front.
    let sighting_rays = world.snapshot().rovers[0]
        .ray_hits
        .iter()
        .filter(|&&hit| hit)
        .count();
    assert!(sighting_rays > 1, "the rock should span several rays");

    let report = world.step();
    assert_eq!(report.retired, vec![0]);
    let expected = -(sighting_rays as f64) * config.collision_penalty;
    assert!((report.score_deltas[0].delta - expected).abs() < 1e-9);
}

#[test]
fn sighted_but_untouched_rock_pays_the_survival_bonus() {
    let config = SimConfig {
        ray_survival_bonus: 0.1,
        ..open_config()
    };
    let rock = Rock {
        x: 400.0,
        y: 235.0,
        width: 10.0,
        height: 10.0,
    };
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Up),
        vec![rock],
        config.clone(),
    );
    let sighting_rays = world.snapshot().rovers[0]
        .ray_hits
        .iter()
        .filter(|&&hit| hit)
        .count();
    assert!(sighting_rays >= 1);

    let report = world.step();
    assert!(report.retired.is_empty());
    let expected = sighting_rays as f64 * config.ray_survival_bonus;
    assert!((report.score_deltas[0].delta - expected).abs() < 1e-9);
}

#[test]
fn novelty_bonus_pays_only_on_first_cell_visit() {
    let config = SimConfig {
        novelty_bonus: 1.0,
        ..open_config()
    };
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Right),
        Vec::new(),
        config,
    );
    // vel 3, cell size 10: x after each tick is 323, 326, 329, 332.
    let deltas: Vec<f64> = (0..4)
        .map(|_| world.step().score_deltas[0].delta)
        .collect();
    assert_eq!(deltas, vec![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn dead_rovers_retire_the_same_tick_without_disturbing_survivors() {
    let config = open_config();
    let rovers = vec![
        Rover::new(0, 14.0, 240.0, &config),
        Rover::new(1, 320.0, 240.0, &config),
    ];
    let controllers: Vec<Box<dyn Controller>> = vec![
        Box::new(ConstantController::favoring(Action::Up)),
        Box::new(ConstantController::favoring(Action::Up)),
    ];
    let mut world =
        World::with_rocks(rovers, controllers, Vec::new(), config).expect("world should build");

    let report = world.step();
    assert_eq!(report.retired, vec![0]);
    assert_eq!(report.active_remaining, 1);
    assert_eq!(world.rovers()[0].id, 1);

    let report = world.step();
    assert!(report.retired.is_empty());
    assert_eq!(world.rovers()[0].id, 1);
}

#[test]
fn decisions_observe_pre_motion_positions() {
    let config = open_config();
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let spy = SpyController {
        seen_x: Rc::clone(&seen),
    };
    let mut world = single_rover_world(rover, spy, Vec::new(), config);
    world.step();
    world.step();
    world.step();
    // Each decision saw the position before that tick's motion.
    assert_eq!(*seen.borrow(), vec![320.0, 323.0, 326.0]);
    assert_eq!(world.rovers()[0].x, 329.0);
}

#[test]
fn abort_signal_ends_the_episode_cooperatively() {
    let config = open_config();
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Right),
        Vec::new(),
        config,
    );
    let mut polls = 0;
    let summary = world
        .run_episode(100, || {
            polls += 1;
            polls > 1
        })
        .expect("budget is valid");
    assert_eq!(summary.status, EpisodeStatus::Aborted);
    assert_eq!(summary.ticks, 1);
    assert_eq!(summary.scores.len(), 1, "active rover still reported");
}

#[test]
fn run_episode_validates_the_tick_budget() {
    let config = open_config();
    let rover = Rover::new(0, 320.0, 240.0, &config);
    let mut world = single_rover_world(
        rover,
        ConstantController::favoring(Action::Up),
        Vec::new(),
        config,
    );
    assert_eq!(
        world.run_episode(0, || false),
        Err(EpisodeError::InvalidMaxTicks)
    );
    assert_eq!(
        world.run_episode(World::MAX_EPISODE_TICKS + 1, || false),
        Err(EpisodeError::TooManyTicks {
            max: World::MAX_EPISODE_TICKS,
            actual: World::MAX_EPISODE_TICKS + 1,
        })
    );
}

#[test]
fn snapshot_exposes_rocks_rays_and_positions() {
    let config = SimConfig::default();
    let rovers = vec![Rover::new(0, 320.0, 240.0, &config)];
    let controllers: Vec<Box<dyn Controller>> =
        vec![Box::new(ConstantController::favoring(Action::Up))];
    let world = World::new(rovers, controllers, config.clone()).expect("world should build");

    let snapshot = world.snapshot();
    assert_eq!(snapshot.tick, 0);
    assert_eq!(snapshot.rocks.len(), config.rock_count);
    assert_eq!(snapshot.rovers.len(), 1);
    assert_eq!(snapshot.rovers[0].ray_endpoints.len(), config.ray_count);
    assert_eq!(snapshot.rovers[0].ray_hits.len(), config.ray_count);
}

#[test]
fn identical_seeds_produce_identical_episodes() {
    fn build_and_run() -> EpisodeSummary {
        let config = SimConfig::default();
        let mut spawn_rng = create_rng(config.seed.wrapping_add(1));
        let rovers: Vec<Rover> = (0..8)
            .map(|id| Rover::spawn_random(id, &config, &mut spawn_rng))
            .collect();
        let input_size = config.feature_len();
        let controllers: Vec<Box<dyn Controller>> = (0..8)
            .map(|id| {
                let mut weight_rng = crate::rng::derive_rover_rng(config.seed, id);
                let count = NeuralNet::weight_count(input_size, 8);
                let weights = (0..count).map(|_| weight_rng.random_range(-1.0..1.0));
                Box::new(NeuralNet::from_weights(input_size, 8, weights)) as Box<dyn Controller>
            })
            .collect();
        let mut world = World::new(rovers, controllers, config).expect("world should build");
        world.run_episode(2_000, || false).expect("budget is valid")
    }

    assert_eq!(build_and_run(), build_and_run());
}
