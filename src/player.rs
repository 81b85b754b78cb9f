//! The closed set of move sources a driver can seat at the board.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma};

use crate::board::Action;
use crate::constants::{
    DIRICHLET_ALPHA, N_PLAYOUT_ROLLOUT, NOISE_WEIGHT, ROLLOUT_LIMIT, TEMPERATURE,
};
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::game::Game;
use crate::mcts::{Mcts, MctsConfig, SearchControl, SearchOutcome};
use crate::playout::{RolloutEvaluator, random_action};
use crate::simulation::Simulation;

/// What a player decided for the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Play(Action),
    /// The move has to come from outside (a human).
    AwaitInput,
    /// The search was cancelled.
    Aborted { completed: usize, total: usize },
}

impl From<SearchOutcome<Action>> for Decision {
    fn from(outcome: SearchOutcome<Action>) -> Self {
        match outcome {
            SearchOutcome::Completed(action) => Decision::Play(action),
            SearchOutcome::Aborted { completed, total } => Decision::Aborted { completed, total },
        }
    }
}

/// Plays uniformly among legal moves that do not fill its own eyes.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: fastrand::Rng,
}

impl RandomPlayer {
    pub fn new(rng: fastrand::Rng) -> Self {
        RandomPlayer { rng }
    }

    pub fn get_action(&mut self, game: &Game) -> Action {
        random_action(game.position(), &mut self.rng)
    }
}

/// Pure tree search with rollout evaluation.
///
/// The tree is discarded after every move.
pub struct MctsPlayer {
    mcts: Mcts<Simulation, RolloutEvaluator>,
}

impl MctsPlayer {
    pub fn new(evaluator: RolloutEvaluator, config: MctsConfig) -> Self {
        MctsPlayer {
            mcts: Mcts::new(evaluator, config),
        }
    }

    /// Rollout search with the default exploration weight and `n_playout`
    /// playouts per move.
    pub fn with_playouts(n_playout: usize, rng: fastrand::Rng) -> Self {
        let config = MctsConfig {
            n_playout,
            ..MctsConfig::default()
        };
        Self::new(RolloutEvaluator::with_rng(rng, ROLLOUT_LIMIT), config)
    }

    pub fn get_action(&mut self, game: &Game) -> Result<SearchOutcome<Action>> {
        let outcome = self.mcts.get_move(&game.simulator());
        self.mcts.reset();
        outcome
    }

    pub fn control(&self) -> SearchControl {
        self.mcts.control()
    }

    pub fn reset(&mut self) {
        self.mcts.reset();
    }
}

impl Default for MctsPlayer {
    fn default() -> Self {
        Self::with_playouts(N_PLAYOUT_ROLLOUT, fastrand::Rng::new())
    }
}

/// A boxed evaluator that can move to a search thread.
pub type BoxedEvaluator = Box<dyn Evaluator<Simulation> + Send>;

/// Tree search guided by an external evaluator, sampling its move from the
/// visit distribution.
///
/// In self-play mode the tree follows the game and is reused for the next
/// move, and the move is drawn from the visit distribution mixed with
/// Dirichlet noise. Otherwise the tree is discarded after every move.
pub struct EvaluatorPlayer {
    mcts: Mcts<Simulation, BoxedEvaluator>,
    self_play: bool,
    temperature: f64,
    dirichlet_alpha: f64,
    noise_weight: f64,
    rng: fastrand::Rng,
    noise_rng: StdRng,
}

impl EvaluatorPlayer {
    pub fn new(evaluator: BoxedEvaluator, config: MctsConfig, mut rng: fastrand::Rng) -> Self {
        let noise_rng = StdRng::seed_from_u64(rng.u64(..));
        EvaluatorPlayer {
            mcts: Mcts::new(evaluator, config),
            self_play: false,
            temperature: TEMPERATURE,
            dirichlet_alpha: DIRICHLET_ALPHA,
            noise_weight: NOISE_WEIGHT,
            rng,
            noise_rng,
        }
    }

    pub fn self_play(mut self, enabled: bool) -> Self {
        self.self_play = enabled;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Noise used in self-play: concentration `alpha`, mixed in with `weight`.
    pub fn dirichlet_noise(mut self, alpha: f64, weight: f64) -> Self {
        self.dirichlet_alpha = alpha;
        self.noise_weight = weight;
        self
    }

    /// Pick a move and return it with the full action-space policy
    /// (`size * size + 1` entries, zero for actions not searched).
    ///
    /// The returned policy is the plain visit distribution; noise only
    /// affects which move is drawn.
    pub fn get_action_with_probs(
        &mut self,
        game: &Game,
    ) -> Result<SearchOutcome<(Action, Vec<f64>)>> {
        let probs = match self.mcts.get_move_probs(&game.simulator(), self.temperature)? {
            SearchOutcome::Completed(probs) => probs,
            SearchOutcome::Aborted { completed, total } => {
                return Ok(SearchOutcome::Aborted { completed, total });
            }
        };

        let mut policy = vec![0.0; game.position().action_size()];
        for &(action, p) in &probs {
            policy[action] = p;
        }

        let action = if self.self_play {
            let noisy = mix_dirichlet_noise(
                &probs,
                self.dirichlet_alpha,
                self.noise_weight,
                &mut self.noise_rng,
            )?;
            sample(&noisy, &mut self.rng)
        } else {
            sample(&probs, &mut self.rng)
        };

        if self.self_play {
            self.mcts.update_with_move(action);
        } else {
            self.mcts.reset();
        }
        Ok(SearchOutcome::Completed((action, policy)))
    }

    pub fn get_action(&mut self, game: &Game) -> Result<SearchOutcome<Action>> {
        Ok(self.get_action_with_probs(game)?.map(|(action, _)| action))
    }

    pub fn control(&self) -> SearchControl {
        self.mcts.control()
    }

    pub fn reset(&mut self) {
        self.mcts.reset();
    }
}

/// Draw an action from a discrete distribution.
///
/// Falls back to the most likely action if rounding leaves the draw
/// unassigned.
pub fn sample(probs: &[(Action, f64)], rng: &mut fastrand::Rng) -> Action {
    let mut r = rng.f64() * probs.iter().map(|&(_, p)| p).sum::<f64>();
    for &(action, p) in probs {
        if r < p {
            return action;
        }
        r -= p;
    }
    probs
        .iter()
        .copied()
        .fold(None, |best: Option<(Action, f64)>, (a, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((a, p)),
        })
        .map_or(0, |(a, _)| a)
}

/// Blend `(1 - weight) * p + weight * Dir(alpha)` over the same actions.
///
/// The Dirichlet draw is a normalised vector of `Gamma(alpha, 1)` samples.
pub fn mix_dirichlet_noise(
    probs: &[(Action, f64)],
    alpha: f64,
    weight: f64,
    rng: &mut StdRng,
) -> Result<Vec<(Action, f64)>> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(Error::InvalidSetup(format!("noise weight {weight} outside [0, 1]")));
    }
    let gamma = Gamma::new(alpha, 1.0)
        .map_err(|err| Error::InvalidSetup(format!("dirichlet alpha {alpha}: {err}")))?;
    let noise: Vec<f64> = probs.iter().map(|_| gamma.sample(rng)).collect();
    let total: f64 = noise.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Ok(probs.to_vec());
    }
    Ok(probs
        .iter()
        .zip(&noise)
        .map(|(&(action, p), &n)| (action, (1.0 - weight) * p + weight * n / total))
        .collect())
}

/// A seat at the board.
pub enum Player {
    Human,
    UniformRandom(RandomPlayer),
    TreeSearch(MctsPlayer),
    Evaluator(EvaluatorPlayer),
}

impl Player {
    pub fn name(&self) -> &'static str {
        match self {
            Player::Human => "human",
            Player::UniformRandom(_) => "random",
            Player::TreeSearch(_) => "mcts",
            Player::Evaluator(_) => "evaluator",
        }
    }

    /// Decide a move for the current position of `game`.
    pub fn get_action(&mut self, game: &Game) -> Result<Decision> {
        match self {
            Player::Human => Ok(Decision::AwaitInput),
            Player::UniformRandom(p) => Ok(Decision::Play(p.get_action(game))),
            Player::TreeSearch(p) => Ok(p.get_action(game)?.into()),
            Player::Evaluator(p) => Ok(p.get_action(game)?.into()),
        }
    }

    /// Cancellation handle for searching players.
    pub fn control(&self) -> Option<SearchControl> {
        match self {
            Player::TreeSearch(p) => Some(p.control()),
            Player::Evaluator(p) => Some(p.control()),
            Player::Human | Player::UniformRandom(_) => None,
        }
    }

    /// Forget any search state, e.g. after an undo.
    pub fn reset(&mut self) {
        match self {
            Player::TreeSearch(p) => p.reset(),
            Player::Evaluator(p) => p.reset(),
            Player::Human | Player::UniformRandom(_) => {}
        }
    }
}
