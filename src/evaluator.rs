//! The evaluator contract consumed by the tree search.
//!
//! An evaluator looks at a state and returns a prior probability for legal
//! actions and a value in `[-1, 1]` from the point of view of the player to
//! move. The search checks every response with [`check_evaluation`] and
//! refuses to continue on a violation rather than renormalizing.

use crate::board::Action;
use crate::error::{ContractViolation, Result};
use crate::simulation::Simulatable;

/// Priors and value for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub priors: Vec<(Action, f64)>,
    pub value: f64,
}

pub trait Evaluator<S> {
    fn evaluate(&mut self, state: &S) -> Result<Evaluation>;
}

impl<S, E: Evaluator<S> + ?Sized> Evaluator<S> for Box<E> {
    fn evaluate(&mut self, state: &S) -> Result<Evaluation> {
        (**self).evaluate(state)
    }
}

/// Adapts a closure into an [`Evaluator`].
pub struct FnEvaluator<F>(pub F);

impl<S, F> Evaluator<S> for FnEvaluator<F>
where
    F: FnMut(&S) -> Result<Evaluation>,
{
    fn evaluate(&mut self, state: &S) -> Result<Evaluation> {
        (self.0)(state)
    }
}

/// Uniform priors over legal actions and a neutral value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl<S: Simulatable> Evaluator<S> for UniformEvaluator {
    fn evaluate(&mut self, state: &S) -> Result<Evaluation> {
        Ok(Evaluation {
            priors: uniform_priors(&state.legal_actions()),
            value: 0.0,
        })
    }
}

/// Equal prior for each action.
pub fn uniform_priors(actions: &[Action]) -> Vec<(Action, f64)> {
    let p = 1.0 / actions.len().max(1) as f64;
    actions.iter().map(|&a| (a, p)).collect()
}

/// Verify an evaluator response against the state it was made for.
///
/// Priors are only checked while the game is running; for a finished game
/// they are never used. Every legal action needs an entry, possibly zero.
pub fn check_evaluation<S: Simulatable>(state: &S, evaluation: &Evaluation) -> Result<()> {
    let value = evaluation.value;
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        return Err(ContractViolation::ValueOutOfRange(value).into());
    }
    if state.is_over() {
        return Ok(());
    }
    if evaluation.priors.is_empty() {
        return Err(ContractViolation::NoPriors.into());
    }
    for &(action, prior) in &evaluation.priors {
        if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
            return Err(ContractViolation::InvalidPrior { action, prior }.into());
        }
        if prior > 0.0 && !state.is_legal(action) {
            return Err(ContractViolation::IllegalPrior(action).into());
        }
    }
    if let Some(missing) = state
        .legal_actions()
        .into_iter()
        .find(|a| !evaluation.priors.iter().any(|&(b, _)| b == *a))
    {
        return Err(ContractViolation::MissingPrior(missing).into());
    }
    Ok(())
}
