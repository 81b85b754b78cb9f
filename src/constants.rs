//! Constants for board dimensions, search parameters, and feature encoding.
//!
//! This module contains all the default configuration values for the engine.
//! Unlike a compile-time board, the board size is chosen per game at runtime
//! and must lie within [`MIN_BOARD_SIZE`]..=[`MAX_BOARD_SIZE`].

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest supported board side.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest supported board side (the full 19x19 board).
pub const MAX_BOARD_SIZE: usize = 19;

/// Standard board sizes offered by the driver.
pub const STANDARD_SIZES: [usize; 3] = [9, 13, 19];

/// Board size used when none is given.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Komi (compensation points for White).
pub const DEFAULT_KOMI: f32 = 7.5;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Exploration constant of the PUCT formula.
pub const C_PUCT: f64 = 5.0;

/// Default number of playouts per move for evaluator-driven search.
pub const N_PLAYOUT: usize = 400;

/// Default number of playouts per move for rollout-driven search.
pub const N_PLAYOUT_ROLLOUT: usize = 20;

/// Prior given to a freshly created root.
pub const ROOT_PRIOR: f64 = 1.0;

/// Temperature used when picking a move to actually play.
pub const TEMPERATURE: f64 = 1e-3;

/// Concentration of the Dirichlet noise mixed into self-play move choice.
pub const DIRICHLET_ALPHA: f64 = 0.3;

/// Share of the self-play move distribution taken by the noise.
pub const NOISE_WEIGHT: f64 = 0.25;

/// Added to visit counts before taking the log in the softmax.
pub const VISIT_EPSILON: f64 = 1e-10;

// =============================================================================
// Rollouts
// =============================================================================

/// Rollouts longer than this many plies are scored as a draw.
pub const ROLLOUT_LIMIT: usize = 1000;

// =============================================================================
// Feature Planes
// =============================================================================

/// Number of planes in the raw state tensor
/// (black, white, turn, invalid, previous pass, done).
pub const NUM_STATE_PLANES: usize = 6;

/// Number of past positions stacked into history features.
pub const HISTORY_STEPS: usize = 4;
