//! The game interface the search runs against.

use crate::board::{Action, Color};
use crate::error::Result;
use crate::position::{Position, apply};
use crate::scoring::{Outcome, outcome};

/// Anything the tree search can play moves on.
///
/// Search clones the root state once per playout and steps the clone, so
/// `Clone` must produce an independent copy.
pub trait Simulatable: Clone {
    /// Play an action on this copy.
    fn step(&mut self, action: Action) -> Result<()>;

    /// `None` while the game is running.
    fn outcome(&self) -> Option<Outcome>;

    /// Color to move.
    fn turn(&self) -> Color;

    fn legal_actions(&self) -> Vec<Action>;

    fn is_legal(&self, action: Action) -> bool;

    fn is_over(&self) -> bool {
        self.outcome().is_some()
    }
}

/// A position plus the komi needed to decide the game.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub position: Position,
    pub komi: f32,
}

impl Simulation {
    pub fn new(position: Position, komi: f32) -> Self {
        Simulation { position, komi }
    }
}

impl Simulatable for Simulation {
    fn step(&mut self, action: Action) -> Result<()> {
        self.position = apply(&self.position, action)?;
        Ok(())
    }

    fn outcome(&self) -> Option<Outcome> {
        self.position
            .is_terminal()
            .then(|| outcome(&self.position, self.komi))
    }

    fn turn(&self) -> Color {
        self.position.turn()
    }

    fn legal_actions(&self) -> Vec<Action> {
        self.position.legal_actions()
    }

    fn is_legal(&self, action: Action) -> bool {
        self.position.is_legal(action)
    }
}
