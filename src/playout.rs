//! Random playouts (rollouts) for evaluating positions.
//!
//! A rollout plays random legal moves that do not fill the mover's own
//! eyes until the game ends or a ply limit is reached, then reports the
//! result from the point of view of the player to move at the start.

use crate::board::Action;
use crate::constants::ROLLOUT_LIMIT;
use crate::error::Result;
use crate::evaluator::{Evaluation, Evaluator, uniform_priors};
use crate::position::Position;
use crate::simulation::{Simulatable, Simulation};

/// Choose a random legal move that is not a true eye of the mover.
///
/// Passes only when no such move exists.
pub fn random_action(pos: &Position, rng: &mut fastrand::Rng) -> Action {
    let pass = pos.pass_action();
    let candidates: Vec<Action> = pos
        .advanced_legal_actions()
        .into_iter()
        .filter(|&a| a != pass)
        .collect();

    if candidates.is_empty() {
        pass
    } else {
        candidates[rng.usize(..candidates.len())]
    }
}

/// Play random moves from `sim` for at most `limit` plies.
///
/// Returns `1.0` if the player to move in `sim` wins, `-1.0` if they lose,
/// and `0.0` for a tie or when the limit is reached first.
pub fn evaluate_rollout(sim: &Simulation, limit: usize, rng: &mut fastrand::Rng) -> Result<f64> {
    let player = sim.turn();
    let mut game = sim.clone();

    for _ in 0..limit {
        if let Some(outcome) = game.outcome() {
            return Ok(outcome.value_for(player));
        }
        let action = random_action(&game.position, rng);
        game.step(action)?;
    }

    Ok(game.outcome().map_or(0.0, |o| o.value_for(player)))
}

/// Evaluator that spreads priors evenly and values a state by one rollout.
#[derive(Debug, Clone)]
pub struct RolloutEvaluator {
    rng: fastrand::Rng,
    limit: usize,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl RolloutEvaluator {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new(), ROLLOUT_LIMIT)
    }

    pub fn with_rng(rng: fastrand::Rng, limit: usize) -> Self {
        RolloutEvaluator { rng, limit }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed), ROLLOUT_LIMIT)
    }
}

impl Evaluator<Simulation> for RolloutEvaluator {
    fn evaluate(&mut self, state: &Simulation) -> Result<Evaluation> {
        let value = evaluate_rollout(state, self.limit, &mut self.rng)?;
        Ok(Evaluation {
            priors: uniform_priors(&state.legal_actions()),
            value,
        })
    }
}
