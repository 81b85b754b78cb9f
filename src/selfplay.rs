//! Self-play data generation.
//!
//! An [`EvaluatorPlayer`] in self-play mode plays both sides. Every move
//! yields a training example: the features of the position, the search
//! policy, and the final result seen by the player who moved.

use crate::board::{Action, Color};
use crate::error::Result;
use crate::features::FeatureConfig;
use crate::game::Game;
use crate::mcts::SearchOutcome;
use crate::player::EvaluatorPlayer;
use crate::scoring::Outcome;
use crate::symmetry::Symmetry;

/// One `(state, policy, z)` sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: Vec<f32>,
    /// Search policy over `size * size + 1` actions.
    pub probs: Vec<f64>,
    /// `1.0` if the player to move went on to win, `-1.0` if they lost,
    /// `0.0` for a draw.
    pub z: f64,
}

#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub size: usize,
    pub komi: f32,
    pub features: FeatureConfig,
    /// Games reaching this many moves are stopped and scored as a draw.
    pub max_moves: usize,
}

impl SelfPlayConfig {
    pub fn new(size: usize, komi: f32) -> Self {
        SelfPlayConfig {
            size,
            komi,
            features: FeatureConfig::default(),
            max_moves: 4 * size * size,
        }
    }
}

/// A finished self-play game.
#[derive(Debug, Clone)]
pub struct SelfPlayGame {
    pub moves: Vec<Action>,
    pub outcome: Outcome,
    pub examples: Vec<TrainingExample>,
}

/// Play one game against itself and collect its examples.
///
/// The player's tree is reset before and after the game.
pub fn self_play_game(
    player: &mut EvaluatorPlayer,
    config: &SelfPlayConfig,
) -> Result<SearchOutcome<SelfPlayGame>> {
    let mut game = Game::new(config.size, config.komi)?;
    let mut positions: Vec<(Vec<f32>, Vec<f64>, Color)> = Vec::new();
    player.reset();

    while !game.is_over() && positions.len() < config.max_moves {
        let features = game.features(&config.features);
        let (action, probs) = match player.get_action_with_probs(&game)? {
            SearchOutcome::Completed(choice) => choice,
            SearchOutcome::Aborted { completed, total } => {
                player.reset();
                return Ok(SearchOutcome::Aborted { completed, total });
            }
        };
        positions.push((features, probs, game.turn()));
        game.play(action)?;
    }
    player.reset();

    let outcome = game.outcome().unwrap_or(Outcome::Draw);
    let (black, white) = game.areas();
    log::info!(
        "self-play game: {} moves, black {black} white {white}, {outcome:?}",
        positions.len()
    );

    let examples = positions
        .into_iter()
        .map(|(features, probs, mover)| TrainingExample {
            features,
            probs,
            z: outcome.value_for(mover),
        })
        .collect();

    Ok(SearchOutcome::Completed(SelfPlayGame {
        moves: game.moves(),
        outcome,
        examples,
    }))
}

/// The eight symmetric variants of each example.
pub fn augment(examples: &[TrainingExample], size: usize) -> Vec<TrainingExample> {
    examples
        .iter()
        .flat_map(|example| {
            Symmetry::ALL.iter().map(move |s| TrainingExample {
                features: s.apply(&example.features, size),
                probs: s.apply_policy(&example.probs, size),
                z: example.z,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augment_keeps_pass_and_value() {
        let size = 3;
        let mut probs = vec![0.0; 10];
        probs[0] = 0.6;
        probs[9] = 0.4;
        let example = TrainingExample {
            features: (0..18).map(|v| v as f32).collect(),
            probs,
            z: -1.0,
        };

        let variants = augment(std::slice::from_ref(&example), size);
        assert_eq!(variants.len(), 8);
        assert_eq!(variants[0], example);
        for v in &variants {
            assert_eq!(v.z, -1.0);
            assert_eq!(v.probs[9], 0.4);
            assert_eq!(v.features.len(), 18);
            // The corner stays a corner.
            let corner = v.probs.iter().position(|&p| p == 0.6).unwrap();
            assert!([0, 2, 6, 8].contains(&corner));
        }
    }
}
