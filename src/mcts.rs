//! Monte Carlo Tree Search (MCTS) with PUCT selection.
//!
//! This module implements MCTS with:
//! - PUCT for node selection (`Q + c_puct * P * sqrt(N_parent) / (1 + N)`)
//! - Expansion from the priors of an external [`Evaluator`]
//! - Ground-truth values at finished games
//! - Tree reuse between moves and cooperative cancellation
//!
//! Nodes live in an index arena ([`SearchTree`]): every node records the
//! index of its parent and owns its children through an action-to-index
//! map. Discarded subtrees go back to a free list.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::board::Action;
use crate::constants::{C_PUCT, N_PLAYOUT, ROOT_PRIOR, VISIT_EPSILON};
use crate::error::{ContractViolation, Error, Result};
use crate::evaluator::{Evaluator, check_evaluation};
use crate::simulation::Simulatable;

/// Index of a node in a [`SearchTree`].
pub type NodeId = usize;

/// A node in the search tree.
///
/// `q` is the mean value of the playouts through this node, seen by the
/// player who chose the action leading here.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    parent: Option<NodeId>,
    children: BTreeMap<Action, NodeId>,
    visits: u32,
    q: f64,
    prior: f64,
}

impl TreeNode {
    fn new(parent: Option<NodeId>, prior: f64) -> Self {
        TreeNode {
            parent,
            children: BTreeMap::new(),
            visits: 0,
            q: 0.0,
            prior,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &BTreeMap<Action, NodeId> {
        &self.children
    }

    #[inline]
    pub fn visits(&self) -> u32 {
        self.visits
    }

    #[inline]
    pub fn q(&self) -> f64 {
        self.q
    }

    #[inline]
    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// A node with no children has not been expanded yet.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Selection score `Q + U`.
    fn puct(&self, c_puct: f64, parent_visits: u32) -> f64 {
        let u = c_puct * self.prior * f64::from(parent_visits).sqrt() / (1.0 + f64::from(self.visits));
        self.q + u
    }

    fn update(&mut self, value: f64) {
        self.visits += 1;
        self.q += (value - self.q) / f64::from(self.visits);
    }
}

/// Arena of [`TreeNode`]s with a designated root.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// A tree holding only a fresh root with prior `1.0`.
    pub fn new() -> Self {
        SearchTree {
            nodes: vec![TreeNode::new(None, ROOT_PRIOR)],
            free: Vec::new(),
            root: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    /// Child of `id` reached by `action`.
    pub fn child(&self, id: NodeId, action: Action) -> Option<NodeId> {
        self.nodes[id].children.get(&action).copied()
    }

    /// `(action, visits)` for each child of the root, in action order.
    pub fn root_visits(&self) -> Vec<(Action, u32)> {
        self.root_node()
            .children
            .iter()
            .map(|(&a, &c)| (a, self.nodes[c].visits))
            .collect()
    }

    /// Nodes reachable from `id`, itself included.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            count += 1;
            stack.extend(self.nodes[n].children.values());
        }
        count
    }

    /// Child of `id` with the highest `Q + U`; the lowest action wins ties.
    pub fn select(&self, id: NodeId, c_puct: f64) -> Option<(Action, NodeId)> {
        let parent_visits = self.nodes[id].visits;
        let mut best: Option<(Action, NodeId, f64)> = None;
        for (&action, &child) in &self.nodes[id].children {
            let score = self.nodes[child].puct(c_puct, parent_visits);
            if best.is_none_or(|(_, _, s)| score > s) {
                best = Some((action, child, score));
            }
        }
        best.map(|(action, child, _)| (action, child))
    }

    /// Add a child for every action not already present.
    pub fn expand<I>(&mut self, id: NodeId, priors: I)
    where
        I: IntoIterator<Item = (Action, f64)>,
    {
        for (action, prior) in priors {
            if self.nodes[id].children.contains_key(&action) {
                continue;
            }
            let child = self.alloc(TreeNode::new(Some(id), prior));
            self.nodes[id].children.insert(action, child);
        }
    }

    /// Record `value` at `id` and its ancestors, negating it at each level.
    pub fn backup(&mut self, id: NodeId, mut value: f64) {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = &mut self.nodes[n];
            node.update(value);
            value = -value;
            current = node.parent;
        }
    }

    /// Make the child reached by `action` the new root.
    ///
    /// Siblings and the old root are released. When `action` is not a child
    /// the whole tree is replaced by a fresh root. Returns whether the
    /// subtree was kept.
    pub fn promote(&mut self, action: Action) -> bool {
        let old_root = self.root;
        match self.nodes[old_root].children.remove(&action) {
            Some(child) => {
                self.release(old_root);
                self.nodes[child].parent = None;
                self.root = child;
                true
            }
            None => {
                self.reset();
                false
            }
        }
    }

    /// Discard every node and start over with a fresh root.
    pub fn reset(&mut self) {
        *self = SearchTree::new();
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let node = std::mem::replace(&mut self.nodes[n], TreeNode::new(None, 0.0));
            stack.extend(node.children.into_values());
            self.free.push(n);
        }
    }
}

/// Result of a search that may be cancelled.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    Completed(T),
    /// Stopped before all playouts ran.
    Aborted { completed: usize, total: usize },
}

impl<T> SearchOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SearchOutcome<U> {
        match self {
            SearchOutcome::Completed(value) => SearchOutcome::Completed(f(value)),
            SearchOutcome::Aborted { completed, total } => SearchOutcome::Aborted { completed, total },
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, SearchOutcome::Aborted { .. })
    }

    pub fn completed(self) -> Option<T> {
        match self {
            SearchOutcome::Completed(value) => Some(value),
            SearchOutcome::Aborted { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct ControlState {
    cancelled: AtomicBool,
    completed: AtomicUsize,
    total: AtomicUsize,
}

/// Shared handle for cancelling a search and watching its progress.
///
/// Clones refer to the same search. A cancel request stops the search in
/// flight, or the next one to start, and is consumed by it.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    inner: Arc<ControlState>,
}

impl SearchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Withdraw a pending cancel request.
    pub fn clear(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
    }

    /// `(completed, total)` playouts of the current or last search.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.inner.completed.load(Ordering::Relaxed),
            self.inner.total.load(Ordering::Relaxed),
        )
    }

    fn take_cancel(&self) -> bool {
        self.inner.cancelled.swap(false, Ordering::SeqCst)
    }

    fn begin(&self, total: usize) {
        self.inner.completed.store(0, Ordering::Relaxed);
        self.inner.total.store(total, Ordering::Relaxed);
    }

    fn advance(&self, completed: usize) {
        self.inner.completed.store(completed, Ordering::Relaxed);
    }
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    /// Exploration weight of the prior term.
    pub c_puct: f64,
    /// Playouts per move.
    pub n_playout: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            c_puct: C_PUCT,
            n_playout: N_PLAYOUT,
        }
    }
}

/// Tree search over states `S` guided by an evaluator `E`.
pub struct Mcts<S, E> {
    tree: SearchTree,
    evaluator: E,
    config: MctsConfig,
    control: SearchControl,
    _state: PhantomData<fn(S)>,
}

impl<S, E> Mcts<S, E>
where
    S: Simulatable,
    E: Evaluator<S>,
{
    pub fn new(evaluator: E, config: MctsConfig) -> Self {
        Mcts {
            tree: SearchTree::new(),
            evaluator,
            config,
            control: SearchControl::new(),
            _state: PhantomData,
        }
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn set_n_playout(&mut self, n_playout: usize) {
        self.config.n_playout = n_playout;
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Handle for cancelling searches from another thread.
    pub fn control(&self) -> SearchControl {
        self.control.clone()
    }

    /// Run a single playout on `state`, a private copy of the root state.
    pub fn playout(&mut self, mut state: S) -> Result<()> {
        let mut node = self.tree.root();
        while let Some((action, child)) = self.tree.select(node, self.config.c_puct) {
            state.step(action)?;
            node = child;
        }
        let value = self.evaluate_leaf(node, &state)?;
        self.tree.backup(node, -value);
        Ok(())
    }

    /// Evaluate the state at an unexpanded node and expand it unless the
    /// game is over. Returns the value for the player to move there.
    fn evaluate_leaf(&mut self, node: NodeId, state: &S) -> Result<f64> {
        let evaluation = self.evaluator.evaluate(state)?;
        check_evaluation(state, &evaluation)?;

        if let Some(outcome) = state.outcome() {
            return Ok(outcome.value_for(state.turn()));
        }

        let priors: Vec<(Action, f64)> = evaluation
            .priors
            .into_iter()
            .filter(|&(action, _)| state.is_legal(action))
            .collect();
        if priors.is_empty() {
            return Err(ContractViolation::NoPriors.into());
        }
        self.tree.expand(node, priors);
        Ok(evaluation.value)
    }

    /// Run the configured number of playouts from `state`.
    ///
    /// The root is expanded first, so after a completed search the visits of
    /// the root's children sum to the playouts run on this tree.
    fn search(&mut self, state: &S) -> Result<SearchOutcome<()>> {
        if state.is_over() {
            return Err(Error::IllegalCall("search from a finished game"));
        }
        let total = self.config.n_playout;
        self.control.begin(total);

        let root = self.tree.root();
        if self.tree.node(root).is_leaf() {
            let value = self.evaluate_leaf(root, state)?;
            self.tree.backup(root, -value);
        }

        for completed in 0..total {
            if self.control.take_cancel() {
                log::debug!("search aborted after {completed}/{total} playouts");
                return Ok(SearchOutcome::Aborted { completed, total });
            }
            self.playout(state.clone())?;
            self.control.advance(completed + 1);
        }

        self.dump_children();
        Ok(SearchOutcome::Completed(()))
    }

    /// Search and return the visit distribution over root actions.
    ///
    /// Probabilities are `softmax(ln(visits + 1e-10) / temperature)`.
    pub fn get_move_probs(
        &mut self,
        state: &S,
        temperature: f64,
    ) -> Result<SearchOutcome<Vec<(Action, f64)>>> {
        check_temperature(temperature)?;
        match self.search(state)? {
            SearchOutcome::Completed(()) => Ok(SearchOutcome::Completed(visit_softmax(
                &self.tree.root_visits(),
                temperature,
            )?)),
            SearchOutcome::Aborted { completed, total } => {
                Ok(SearchOutcome::Aborted { completed, total })
            }
        }
    }

    /// Search and return the most visited root action.
    pub fn get_move(&mut self, state: &S) -> Result<SearchOutcome<Action>> {
        let outcome = self.search(state)?;
        match outcome {
            SearchOutcome::Completed(()) => best_action(&self.tree.root_visits())
                .map(SearchOutcome::Completed)
                .ok_or(Error::IllegalCall("root has no children")),
            SearchOutcome::Aborted { completed, total } => {
                Ok(SearchOutcome::Aborted { completed, total })
            }
        }
    }

    /// Advance the root past `action`, keeping its subtree when possible.
    pub fn update_with_move(&mut self, action: Action) {
        if !self.tree.promote(action) {
            log::debug!("action {action} not in tree, starting a fresh root");
        }
    }

    /// Throw the whole tree away.
    pub fn reset(&mut self) {
        self.tree.reset();
    }

    fn dump_children(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let root = self.tree.root_node();
        log::debug!("root visits={} children={}", root.visits, root.children.len());
        for (&action, &child) in &root.children {
            let node = self.tree.node(child);
            log::debug!(
                "move {action} v={} q={:.3} p={:.3}",
                node.visits,
                node.q,
                node.prior
            );
        }
    }
}

/// Most visited action; the lowest action wins ties.
pub fn best_action(visits: &[(Action, u32)]) -> Option<Action> {
    let mut best: Option<(Action, u32)> = None;
    for &(action, n) in visits {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((action, n));
        }
    }
    best.map(|(action, _)| action)
}

fn check_temperature(temperature: f64) -> Result<()> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTemperature(temperature))
    }
}

/// Temperature softmax of log visit counts.
///
/// The temperature must be finite and positive; small values approach a
/// one-hot on the most visited action.
pub fn visit_softmax(visits: &[(Action, u32)], temperature: f64) -> Result<Vec<(Action, f64)>> {
    check_temperature(temperature)?;
    let logits: Vec<f64> = visits
        .iter()
        .map(|&(_, n)| (f64::from(n) + VISIT_EPSILON).ln() / temperature)
        .collect();
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Ok(visits
        .iter()
        .zip(exps)
        .map(|(&(action, _), e)| (action, e / sum))
        .collect())
}
