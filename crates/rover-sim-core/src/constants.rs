/// Largest valid arena dimension (screen units). Keeps the no-hit sentinel
/// (arena diagonal) and boundary features finite and well-scaled.
pub const MAX_ARENA_DIM: f64 = 4096.0;

/// Upper bound on rays per rover. Perception is O(rays * rocks) per rover
/// per tick with no spatial index, so both factors stay small.
pub const MAX_RAYS: usize = 360;

/// Upper bound on rocks per episode.
pub const MAX_ROCKS: usize = 100;

/// Prime multiplier used to derive per-rover RNG streams from a base seed.
/// Chosen so streams for consecutive rover IDs have minimal overlap.
pub const RNG_DERIVATION_PRIME: u64 = 7919;
