//! Running a search on a dedicated thread.
//!
//! The driver sends requests over a channel and gets exactly one
//! [`SearchEvent`] back for every search it starts. It polls with
//! [`SearchWorker::try_recv`] or waits with a bound using
//! [`SearchWorker::recv_timeout`], and may cancel the search in flight.
//! Both report an error once the thread is gone, e.g. after an evaluator
//! panicked. The tree lives on the worker thread only.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::board::Action;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::mcts::{Mcts, MctsConfig, SearchControl, SearchOutcome};
use crate::simulation::Simulation;

const WORKER_STOPPED: Error = Error::IllegalCall("search worker has stopped");

/// Messages sent to the worker thread.
#[derive(Debug)]
pub enum SearchRequest {
    /// Search the given state and answer with one event.
    Search(Simulation),
    /// Move the tree root past an action that was played.
    AdvanceRoot(Action),
    /// Discard the tree.
    Reset,
    Stop,
}

/// Messages received from the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Move(Action),
    Aborted { completed: usize, total: usize },
    Failed(Error),
}

/// Handle to a search thread.
pub struct SearchWorker {
    handle: Option<JoinHandle<()>>,
    requests: Sender<SearchRequest>,
    events: Receiver<SearchEvent>,
    control: SearchControl,
}

impl SearchWorker {
    pub fn spawn<E>(evaluator: E, config: MctsConfig) -> Self
    where
        E: Evaluator<Simulation> + Send + 'static,
    {
        let (requests, request_rx) = mpsc::channel();
        let (event_tx, events) = mpsc::channel();
        let mut mcts = Mcts::new(evaluator, config);
        let control = mcts.control();

        let handle = thread::spawn(move || {
            log::info!("search worker started ({} playouts)", config.n_playout);
            for request in request_rx {
                match request {
                    SearchRequest::Search(state) => {
                        let event = match mcts.get_move(&state) {
                            Ok(SearchOutcome::Completed(action)) => SearchEvent::Move(action),
                            Ok(SearchOutcome::Aborted { completed, total }) => {
                                SearchEvent::Aborted { completed, total }
                            }
                            Err(err) => SearchEvent::Failed(err),
                        };
                        if event_tx.send(event).is_err() {
                            log::warn!("search result dropped, driver is gone");
                            break;
                        }
                    }
                    SearchRequest::AdvanceRoot(action) => mcts.update_with_move(action),
                    SearchRequest::Reset => mcts.reset(),
                    SearchRequest::Stop => break,
                }
            }
            log::info!("search worker stopped");
        });

        SearchWorker {
            handle: Some(handle),
            requests,
            events,
            control,
        }
    }

    fn send(&self, request: SearchRequest) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| WORKER_STOPPED)
    }

    /// Start searching `state`. A cancel issued before this call is
    /// withdrawn.
    pub fn start_search(&self, state: Simulation) -> Result<()> {
        self.control.clear();
        self.send(SearchRequest::Search(state))
    }

    pub fn advance_root(&self, action: Action) -> Result<()> {
        self.send(SearchRequest::AdvanceRoot(action))
    }

    pub fn reset(&self) -> Result<()> {
        self.send(SearchRequest::Reset)
    }

    /// Non-blocking poll for the result of a search.
    pub fn try_recv(&self) -> Result<Option<SearchEvent>> {
        match self.events.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WORKER_STOPPED),
        }
    }

    /// Wait at most `timeout` for the result of a search.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<SearchEvent>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WORKER_STOPPED),
        }
    }

    /// `(completed, total)` playouts of the running or last search.
    pub fn progress(&self) -> (usize, usize) {
        self.control.progress()
    }

    /// Ask the running search to stop; it answers with
    /// [`SearchEvent::Aborted`].
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Cancel any search and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.control.cancel();
        self.requests.send(SearchRequest::Stop).ok();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("search worker panicked");
            }
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluation, FnEvaluator, UniformEvaluator};
    use crate::position::Position;

    const WAIT: Duration = Duration::from_secs(30);

    #[test]
    fn test_search_returns_move() {
        let config = MctsConfig {
            n_playout: 50,
            ..MctsConfig::default()
        };
        let worker = SearchWorker::spawn(UniformEvaluator, config);
        let state = Simulation::new(Position::new(5).unwrap(), 0.5);
        worker.start_search(state.clone()).unwrap();

        match worker.recv_timeout(WAIT).unwrap() {
            Some(SearchEvent::Move(action)) => assert!(state.position.is_legal(action)),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(worker.progress(), (50, 50));
        assert_eq!(worker.try_recv(), Ok(None));
    }

    #[test]
    fn test_contract_violation_is_reported() {
        let evaluator = FnEvaluator(|_: &Simulation| {
            Ok(Evaluation {
                priors: vec![(0, 1.0)],
                value: 2.0,
            })
        });
        let worker = SearchWorker::spawn(evaluator, MctsConfig::default());
        worker
            .start_search(Simulation::new(Position::new(5).unwrap(), 0.5))
            .unwrap();
        assert!(matches!(
            worker.recv_timeout(WAIT),
            Ok(Some(SearchEvent::Failed(Error::EvaluatorContract(_))))
        ));
    }

    #[test]
    fn test_stop_then_send_fails() {
        let mut worker = SearchWorker::spawn(UniformEvaluator, MctsConfig::default());
        worker.stop();
        assert!(worker.reset().is_err());
        assert_eq!(worker.try_recv(), Err(WORKER_STOPPED));
    }

    #[test]
    fn test_panicking_evaluator_disconnects() {
        let evaluator = FnEvaluator(|_: &Simulation| -> Result<Evaluation> {
            panic!("evaluator crashed")
        });
        let config = MctsConfig {
            n_playout: 5,
            ..MctsConfig::default()
        };
        let worker = SearchWorker::spawn(evaluator, config);
        worker
            .start_search(Simulation::new(Position::new(5).unwrap(), 0.5))
            .unwrap();
        assert_eq!(worker.recv_timeout(WAIT), Err(WORKER_STOPPED));
        assert_eq!(worker.try_recv(), Err(WORKER_STOPPED));
    }
}
