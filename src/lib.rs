//! Weiqi-Rust: Go rules, area scoring and a PUCT tree search.
//!
//! This crate provides the core of a Go engine that is driven by an
//! external evaluator (a policy/value model or a rollout heuristic).
//!
//! ## Modules
//!
//! - [`constants`] - Board size limits and engine parameters
//! - [`board`] - Geometry, groups and liberties, GTP vertices
//! - [`position`] - Board state and the move transition (captures, ko, suicide)
//! - [`scoring`] - Area scoring and the winner
//! - [`symmetry`] - The eight board symmetries for tensors and policies
//! - [`features`] - Tensor encodings of positions
//! - [`simulation`] - The game interface searched by [`mcts`]
//! - [`evaluator`] - The evaluator contract
//! - [`playout`] - Random rollouts and a rollout evaluator
//! - [`mcts`] - Arena search tree and PUCT search
//! - [`game`] - Game record with undo and replay
//! - [`player`] - Human, random, search and evaluator-driven players
//! - [`worker`] - Searching on a background thread
//! - [`selfplay`] - Self-play example generation and augmentation
//!
//! ## Example
//!
//! ```
//! use weiqi_rust::game::Game;
//! use weiqi_rust::mcts::{Mcts, MctsConfig, SearchOutcome};
//! use weiqi_rust::playout::RolloutEvaluator;
//!
//! let mut game = Game::new(5, 0.5).unwrap();
//! game.play_vertex("C3").unwrap();
//!
//! let config = MctsConfig { n_playout: 50, ..MctsConfig::default() };
//! let mut mcts = Mcts::new(RolloutEvaluator::with_seed(1), config);
//! if let SearchOutcome::Completed(action) = mcts.get_move(&game.simulator()).unwrap() {
//!     game.play(action).unwrap();
//! }
//! println!("{}", game.position());
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod game;
pub mod mcts;
pub mod player;
pub mod playout;
pub mod position;
pub mod scoring;
pub mod selfplay;
pub mod simulation;
pub mod symmetry;
pub mod worker;

pub use error::{Error, Result};
