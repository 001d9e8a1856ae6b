use crate::config::SimConfig;
use crate::geometry::{segments_intersect, Point};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// An axis-aligned rectangular obstacle, immutable for the episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rock {
    /// The four boundary edges: left, right, top, bottom.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let (x, y, w, h) = (self.x, self.y, self.width, self.height);
        [
            ([x, y], [x, y + h]),
            ([x + w, y], [x + w, y + h]),
            ([x, y], [x + w, y]),
            ([x, y + h], [x + w, y + h]),
        ]
    }

    /// The `(x, y)` corner. Perception measures distance to this corner,
    /// not to the ray's true intersection point.
    pub fn anchor(&self) -> Point {
        [self.x, self.y]
    }

    /// Whether the segment from `a` to `b` crosses any boundary edge.
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        self.edges()
            .iter()
            .any(|&(p3, p4)| segments_intersect(a, b, p3, p4))
    }

    /// Strict AABB overlap against a square of side `size` centered at
    /// `center`. Touching edges do not overlap.
    pub fn overlaps_square(&self, center: Point, size: f64) -> bool {
        let half = size / 2.0;
        self.x < center[0] + half
            && self.x + self.width > center[0] - half
            && self.y < center[1] + half
            && self.y + self.height > center[1] - half
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RockFieldError {
    NonPositiveDimensions { index: usize },
    OutOfBounds { index: usize },
    TooManyRocks { max: usize, actual: usize },
}

impl fmt::Display for RockFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RockFieldError::NonPositiveDimensions { index } => {
                write!(f, "rock {index} has non-positive width or height")
            }
            RockFieldError::OutOfBounds { index } => {
                write!(f, "rock {index} does not fit inside the arena")
            }
            RockFieldError::TooManyRocks { max, actual } => {
                write!(f, "rock count ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for RockFieldError {}

/// The static per-episode obstacle collection. Shared read-only across all
/// rovers; rovers never mutate it.
#[derive(Clone, Debug)]
pub struct RockField {
    rocks: Vec<Rock>,
}

impl RockField {
    /// Generate `config.rock_count` rocks with uniform random size in
    /// `[rock_min_size, rock_max_size]` and position inside the arena.
    ///
    /// Assumes a validated config; size and position draws cannot fail.
    pub fn generate(config: &SimConfig, rng: &mut ChaCha12Rng) -> Self {
        let rocks = (0..config.rock_count)
            .map(|_| {
                let width = rng.random_range(config.rock_min_size..=config.rock_max_size);
                let height = rng.random_range(config.rock_min_size..=config.rock_max_size);
                let x = rng.random_range(0.0..=(config.arena_width - width));
                let y = rng.random_range(0.0..=(config.arena_height - height));
                Rock {
                    x,
                    y,
                    width,
                    height,
                }
            })
            .collect();
        Self { rocks }
    }

    /// Build a field from explicit rocks, rejecting degenerate or
    /// out-of-bounds rectangles before any tick runs.
    pub fn from_rocks(rocks: Vec<Rock>, config: &SimConfig) -> Result<Self, RockFieldError> {
        if rocks.len() > SimConfig::MAX_ROCKS {
            return Err(RockFieldError::TooManyRocks {
                max: SimConfig::MAX_ROCKS,
                actual: rocks.len(),
            });
        }
        for (index, rock) in rocks.iter().enumerate() {
            if !(rock.width.is_finite() && rock.width > 0.0)
                || !(rock.height.is_finite() && rock.height > 0.0)
            {
                return Err(RockFieldError::NonPositiveDimensions { index });
            }
            if !(rock.x.is_finite() && rock.y.is_finite())
                || rock.x < 0.0
                || rock.y < 0.0
                || rock.x + rock.width > config.arena_width
                || rock.y + rock.height > config.arena_height
            {
                return Err(RockFieldError::OutOfBounds { index });
            }
        }
        Ok(Self { rocks })
    }

    /// An empty field (open arena).
    pub fn empty() -> Self {
        Self { rocks: Vec::new() }
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.rocks
    }

    pub fn len(&self) -> usize {
        self.rocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn edges_trace_the_rectangle_boundary() {
        let rock = Rock {
            x: 10.0,
            y: 20.0,
            width: 5.0,
            height: 8.0,
        };
        let [left, right, top, bottom] = rock.edges();
        assert_eq!(left, ([10.0, 20.0], [10.0, 28.0]));
        assert_eq!(right, ([15.0, 20.0], [15.0, 28.0]));
        assert_eq!(top, ([10.0, 20.0], [15.0, 20.0]));
        assert_eq!(bottom, ([10.0, 28.0], [15.0, 28.0]));
    }

    #[test]
    fn segment_through_rock_intersects() {
        let rock = Rock {
            x: 10.0,
            y: 10.0,
            width: 10.0,
            height: 10.0,
        };
        // Horizontal segment crossing both vertical edges.
        assert!(rock.intersects_segment([0.0, 15.0], [30.0, 15.0]));
        // Segment far away.
        assert!(!rock.intersects_segment([0.0, 50.0], [30.0, 50.0]));
    }

    #[test]
    fn overlap_is_strict_at_touching_edges() {
        let rock = Rock {
            x: 20.0,
            y: 20.0,
            width: 10.0,
            height: 10.0,
        };
        // Square of side 10 centered at (15, 25): right edge exactly at x=20.
        assert!(!rock.overlaps_square([15.0, 25.0], 10.0));
        // Nudge right: overlap.
        assert!(rock.overlaps_square([15.1, 25.0], 10.0));
    }

    #[test]
    fn generate_places_rocks_inside_arena() {
        let config = SimConfig::default();
        let mut rng = create_rng(config.seed);
        let field = RockField::generate(&config, &mut rng);
        assert_eq!(field.len(), config.rock_count);
        for rock in field.rocks() {
            assert!(rock.width >= config.rock_min_size && rock.width <= config.rock_max_size);
            assert!(rock.height >= config.rock_min_size && rock.height <= config.rock_max_size);
            assert!(rock.x >= 0.0 && rock.x + rock.width <= config.arena_width);
            assert!(rock.y >= 0.0 && rock.y + rock.height <= config.arena_height);
        }
    }

    #[test]
    fn generate_is_deterministic_per_seed() {
        let config = SimConfig::default();
        let a = RockField::generate(&config, &mut create_rng(7));
        let b = RockField::generate(&config, &mut create_rng(7));
        assert_eq!(a.rocks(), b.rocks());
    }

    #[test]
    fn from_rocks_rejects_degenerate_rectangles() {
        let config = SimConfig::default();
        let result = RockField::from_rocks(
            vec![Rock {
                x: 10.0,
                y: 10.0,
                width: 0.0,
                height: 5.0,
            }],
            &config,
        );
        assert_eq!(
            result.err(),
            Some(RockFieldError::NonPositiveDimensions { index: 0 })
        );
    }

    #[test]
    fn from_rocks_rejects_out_of_bounds_placement() {
        let config = SimConfig::default();
        let result = RockField::from_rocks(
            vec![Rock {
                x: 635.0,
                y: 10.0,
                width: 10.0,
                height: 5.0,
            }],
            &config,
        );
        assert_eq!(result.err(), Some(RockFieldError::OutOfBounds { index: 0 }));
    }
}
