//! A paused scrape chain that is assembled completely before it runs.
//!
//! The seed future is held unpolled while stages are attached. Only
//! `resume` hands out a future, so no stage can start before the last one is
//! in place, whether the seed resolves immediately or not.

use crate::error::SpiderError;
use crate::sequence::Sequence;
use futures_util::future::BoxFuture;
use std::fmt;
use tracing::trace;

/// The state threaded through the output/exception chain.
pub enum ScrapeState<I> {
    Success(Sequence<I>),
    Failure(SpiderError),
}

impl<I> ScrapeState<I> {
    pub fn into_result(self) -> Result<Sequence<I>, SpiderError> {
        match self {
            ScrapeState::Success(sequence) => Ok(sequence),
            ScrapeState::Failure(err) => Err(err),
        }
    }
}

impl<I> From<Result<Sequence<I>, SpiderError>> for ScrapeState<I> {
    fn from(result: Result<Sequence<I>, SpiderError>) -> Self {
        match result {
            Ok(sequence) => ScrapeState::Success(sequence),
            Err(err) => ScrapeState::Failure(err),
        }
    }
}

impl<I> fmt::Debug for ScrapeState<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeState::Success(seq) => write!(f, "Success({:?})", seq),
            ScrapeState::Failure(err) => write!(f, "Failure({:?})", err),
        }
    }
}

/// One step of the chain: consumes the current state, produces the next.
pub type Stage<I> = Box<dyn FnOnce(ScrapeState<I>) -> BoxFuture<'static, ScrapeState<I>> + Send>;

pub struct Continuation<I> {
    seed: BoxFuture<'static, ScrapeState<I>>,
    stages: Vec<Stage<I>>,
}

impl<I: Send + 'static> Continuation<I> {
    /// Holds `seed` without polling it.
    pub fn paused(seed: BoxFuture<'static, ScrapeState<I>>) -> Self {
        Continuation {
            seed,
            stages: Vec::new(),
        }
    }

    /// Appends a stage after those already attached.
    pub fn attach(&mut self, stage: Stage<I>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Releases the chain: the seed first, then every stage in attach order.
    pub async fn resume(self) -> ScrapeState<I> {
        let Continuation { seed, stages } = self;
        trace!("Resuming scrape chain with {} stages", stages.len());

        let mut state = seed.await;
        for stage in stages {
            state = stage(state).await;
        }
        state
    }
}
