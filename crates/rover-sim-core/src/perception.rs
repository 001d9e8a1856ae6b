//! Ray-cast perception: per-ray nearest-rock readings and the flattened
//! feature vector handed to a rover's controller.

use crate::config::SimConfig;
use crate::geometry::Point;
use crate::rock::RockField;

/// Angle reported for rays with no visible rock.
pub const THETA_SENTINEL: f64 = -1.0;

/// Per-ray sensor readings for one rover at one tick. Rebuilt from scratch
/// every tick; carries no cross-tick memory.
///
/// Invariant: `distances[i]` equals the arena-diagonal sentinel iff no rock
/// is visible along ray `i`, in which case `thetas[i]` is
/// [`THETA_SENTINEL`], `widths[i]` and `heights[i]` are 0, and `hits[i]` is
/// `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorFrame {
    pub distances: Vec<f64>,
    pub thetas: Vec<f64>,
    pub widths: Vec<f64>,
    pub heights: Vec<f64>,
    /// Index into the rock field of the tracked nearest rock per ray.
    pub hits: Vec<Option<usize>>,
    /// Ray segment endpoints, in ray order. Exposed for render snapshots.
    pub endpoints: Vec<Point>,
}

impl SensorFrame {
    /// Cast `config.ray_count` rays from `(x, y)` and record the nearest
    /// rock per ray.
    ///
    /// Rays are spaced `360/N` degrees apart; ray 0 points due east on
    /// screen and ray indices advance counter-clockwise on screen because
    /// the vertical axis is inverted. A ray hits a rock when it crosses any
    /// of the rock's four boundary edges; among hit rocks the strictly
    /// nearest by distance to the rock's `(x, y)` anchor corner wins — the
    /// anchor corner, not the true intersection point, is the measured
    /// target. Every rock is tested against every ray; with the configured
    /// caps (≤360 rays, ≤100 rocks) brute force beats maintaining an index.
    pub fn scan(x: f64, y: f64, rocks: &RockField, config: &SimConfig) -> Self {
        let n = config.ray_count;
        let sentinel = config.sentinel_distance();
        let mut frame = Self {
            distances: vec![sentinel; n],
            thetas: vec![THETA_SENTINEL; n],
            widths: vec![0.0; n],
            heights: vec![0.0; n],
            hits: vec![None; n],
            endpoints: Vec::with_capacity(n),
        };

        let angle_step = 360.0 / n as f64;
        for ray in 0..n {
            let rad = (ray as f64 * angle_step).to_radians();
            let end = [
                x + config.ray_view_radius * rad.cos(),
                y - config.ray_view_radius * rad.sin(),
            ];
            frame.endpoints.push(end);

            for (rock_idx, rock) in rocks.rocks().iter().enumerate() {
                if !rock.intersects_segment([x, y], end) {
                    continue;
                }
                let [ax, ay] = rock.anchor();
                let distance = (ax - x).hypot(ay - y);
                if distance < frame.distances[ray] {
                    frame.distances[ray] = distance;
                    frame.thetas[ray] = if distance != 0.0 {
                        ((y - ay) / distance).asin()
                    } else {
                        0.0
                    };
                    frame.widths[ray] = rock.width;
                    frame.heights[ray] = rock.height;
                    frame.hits[ray] = Some(rock_idx);
                }
            }
        }

        frame
    }

    /// Flatten into the controller input vector. The concatenation order is
    /// the controllers' input contract and must not change:
    /// `(x, y, boundaries[4], distances[N], thetas[N], widths[N], heights[N])`
    /// where the boundary block is
    /// `[distance to right wall, x, distance to bottom wall, y]`.
    pub fn feature_vector(&self, x: f64, y: f64, config: &SimConfig) -> Vec<f64> {
        let mut features = Vec::with_capacity(config.feature_len());
        features.push(x);
        features.push(y);
        features.push((x - config.arena_width).abs());
        features.push(x);
        features.push((y - config.arena_height).abs());
        features.push(y);
        features.extend_from_slice(&self.distances);
        features.extend_from_slice(&self.thetas);
        features.extend_from_slice(&self.widths);
        features.extend_from_slice(&self.heights);
        features
    }
}
