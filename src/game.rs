//! The authoritative record of one game.
//!
//! A [`Game`] keeps every position together with the action played from it,
//! so undo is a truncation and any prefix can be replayed or encoded.

use crate::board::{Action, Color, parse_vertex, vertex_string};
use crate::error::{Error, MoveError, Result};
use crate::features::{FeatureConfig, encode_history};
use crate::position::{Position, apply};
use crate::scoring::{Outcome, areas, outcome};
use crate::simulation::Simulation;

#[derive(Clone, Debug)]
pub struct Game {
    komi: f32,
    /// `(position, action played from it)`, oldest first
    history: Vec<(Position, Action)>,
    current: Position,
}

impl Game {
    pub fn new(size: usize, komi: f32) -> Result<Self> {
        Ok(Self::from_position(Position::new(size)?, komi))
    }

    /// Start a record from an arbitrary position.
    pub fn from_position(position: Position, komi: f32) -> Self {
        Game {
            komi,
            history: Vec::new(),
            current: position,
        }
    }

    /// Play `actions` from the empty board.
    pub fn replay(size: usize, komi: f32, actions: &[Action]) -> Result<Self> {
        let mut game = Game::new(size, komi)?;
        for &action in actions {
            game.play(action)?;
        }
        Ok(game)
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.current
    }

    #[inline]
    pub fn komi(&self) -> f32 {
        self.komi
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.current.size()
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.current.turn()
    }

    pub fn history(&self) -> &[(Position, Action)] {
        &self.history
    }

    /// Actions played so far.
    pub fn moves(&self) -> Vec<Action> {
        self.history.iter().map(|&(_, a)| a).collect()
    }

    pub fn last_action(&self) -> Option<Action> {
        self.history.last().map(|&(_, a)| a)
    }

    pub fn is_over(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn play(&mut self, action: Action) -> Result<&Position> {
        let next = apply(&self.current, action)?;
        let previous = std::mem::replace(&mut self.current, next);
        self.history.push((previous, action));
        Ok(&self.current)
    }

    /// Play a GTP vertex such as `"D4"` or `"pass"`.
    pub fn play_vertex(&mut self, vertex: &str) -> Result<&Position> {
        let action = parse_vertex(vertex, self.size()).ok_or(Error::IllegalMove {
            action: self.current.action_size(),
            reason: MoveError::OutOfRange,
        })?;
        self.play(action)
    }

    pub fn pass(&mut self) -> Result<&Position> {
        self.play(self.current.pass_action())
    }

    /// Take back the last `plies` moves.
    ///
    /// # Errors
    /// [`Error::IllegalCall`] if fewer moves were played.
    pub fn undo(&mut self, plies: usize) -> Result<()> {
        if plies > self.history.len() {
            return Err(Error::IllegalCall("undo past the start of the game"));
        }
        if plies == 0 {
            return Ok(());
        }
        let keep = self.history.len() - plies;
        let mut removed = self.history.drain(keep..);
        if let Some((position, _)) = removed.next() {
            self.current = position;
        }
        Ok(())
    }

    /// `(black, white)` area under area scoring.
    pub fn areas(&self) -> (usize, usize) {
        areas(&self.current)
    }

    /// `None` until the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        self.is_over().then(|| outcome(&self.current, self.komi))
    }

    /// Winner of a finished game; `None` while running or on a draw.
    pub fn winner(&self) -> Option<Color> {
        match self.outcome() {
            Some(Outcome::Winner(color)) => Some(color),
            _ => None,
        }
    }

    /// A private copy of the current state for search.
    pub fn simulator(&self) -> Simulation {
        Simulation::new(self.current.clone(), self.komi)
    }

    /// History features of the current position.
    pub fn features(&self, config: &FeatureConfig) -> Vec<f32> {
        encode_history(config, &self.history, &self.current)
    }

    /// Moves as GTP vertices.
    pub fn vertices(&self) -> Vec<String> {
        let size = self.size();
        self.history
            .iter()
            .map(|&(_, a)| vertex_string(a, size))
            .collect()
    }
}
