//! Error types shared by the rules engine and the search.
//!
//! Rule violations and evaluator contract violations are reported as
//! [`Error`] values and never corrected silently. A cancelled search is not
//! an error: see [`crate::mcts::SearchOutcome`].

use thiserror::Error;

use crate::board::Action;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("action out of range")]
    OutOfRange,
    #[error("point not empty")]
    Occupied,
    #[error("retakes ko")]
    Ko,
    /// No liberties and no capture
    #[error("suicide")]
    Suicide,
}

/// A response from an evaluator that breaks its contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("prior assigned to illegal action {0}")]
    IllegalPrior(Action),
    #[error("prior {prior} for action {action} is not a probability")]
    InvalidPrior { action: Action, prior: f64 },
    #[error("no priors for a position with legal moves")]
    NoPriors,
    /// A legal action is absent from the priors (a zero prior is fine).
    #[error("no prior for legal action {0}")]
    MissingPrior(Action),
    #[error("value {0} outside [-1, 1]")]
    ValueOutOfRange(f64),
}

/// Errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Operation invoked on a state that does not allow it (e.g. a finished game).
    #[error("illegal call: {0}")]
    IllegalCall(&'static str),

    /// Action rejected by the legality mask.
    #[error("illegal move {action}: {reason}")]
    IllegalMove { action: Action, reason: MoveError },

    /// Evaluator returned something the search cannot trust.
    #[error("evaluator contract violated: {0}")]
    EvaluatorContract(#[from] ContractViolation),

    /// Softmax temperature must be finite and positive.
    #[error("invalid temperature {0}")]
    InvalidTemperature(f64),

    #[error("unsupported board size {0}")]
    UnsupportedBoardSize(usize),

    /// Stone lists passed to a setup routine are inconsistent.
    #[error("invalid setup: {0}")]
    InvalidSetup(String),
}

pub type Result<T> = std::result::Result<T, Error>;
