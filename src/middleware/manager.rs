//! Spider Middleware Manager.
//!
//! This module provides the `SpiderMiddlewareManager`, which routes every
//! downloaded response through the spider middlewares around the spider
//! callback. The hook orderings are fixed when the manager is built; after
//! that the manager is only read, so one `Arc<SpiderMiddlewareManager>` can
//! serve any number of concurrent scrapes.

use super::continuation::{Continuation, ScrapeState};
use super::hooks::{SpiderMiddleware, StartRequestsHook};
use super::input_gate::process_spider_input;
use super::output_chain::descriptor_stage;
use super::registry::ChainRegistry;
use crate::error::SpiderError;
use crate::request::Request;
use crate::response::Response;
use crate::sequence::Sequence;
use crate::spider::{Callback, ScrapeInput, Spider};
use futures_util::FutureExt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Manages the spider middlewares of one crawler.
pub struct SpiderMiddlewareManager<S: Spider> {
    registry: ChainRegistry<S>,
}

impl<S: Spider> Default for SpiderMiddlewareManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spider> SpiderMiddlewareManager<S> {
    /// Creates a manager with no middlewares.
    pub fn new() -> Self {
        Self {
            registry: ChainRegistry::new(),
        }
    }

    /// Creates a manager from middlewares already in priority order.
    pub fn with_middlewares(middlewares: Vec<Arc<dyn SpiderMiddleware<S>>>) -> Self {
        let mut manager = Self::new();
        for middleware in middlewares {
            manager.register_arc(middleware);
        }
        manager
    }

    /// Registers a middleware after those already registered.
    pub fn register<M>(&mut self, middleware: M)
    where
        M: SpiderMiddleware<S>,
    {
        self.registry.register(middleware);
    }

    pub fn register_arc(&mut self, middleware: Arc<dyn SpiderMiddleware<S>>) {
        self.registry.register_arc(middleware);
    }

    /// Names of the registered middlewares, in registration order.
    pub fn middleware_names(&self) -> &[String] {
        self.registry.middleware_names()
    }

    /// Runs one response, or an upstream failure, through the middlewares and
    /// the spider callback.
    ///
    /// Returns the final sequence of items and requests, or the failure that
    /// no exception hook handled.
    pub async fn scrape(
        &self,
        callback: Callback<S>,
        input: Result<Response, SpiderError>,
        request: Request,
        spider: Arc<S>,
    ) -> Result<Sequence<S::Item>, SpiderError> {
        let (response, gated) = match input {
            Ok(response) => {
                let response = Arc::new(response);
                let gated =
                    process_spider_input(self.registry.input_hooks(), Arc::clone(&response), &spider)
                        .await;
                (Some(response), gated)
            }
            Err(failure) => {
                trace!("Scraping upstream failure for {}: {}", request.url, failure);
                (None, ScrapeInput::Failure(failure))
            }
        };

        let seed = {
            let spider = Arc::clone(&spider);
            async move {
                let outcome = callback(gated, request, spider).await;
                ScrapeState::from(outcome)
            }
            .boxed()
        };

        let mut continuation = Continuation::paused(seed);
        for descriptor in self.registry.output_chain() {
            continuation.attach(descriptor_stage(descriptor, response.clone(), Arc::clone(&spider)));
        }
        debug!("Scrape chain built with {} stages", continuation.len());

        continuation.resume().await.into_result()
    }

    /// Passes the spider's seed requests through every `start_requests` hook,
    /// last registered first.
    pub async fn process_start_requests(
        &self,
        seeds: Vec<Request>,
        spider: Arc<S>,
    ) -> Result<Vec<Request>, SpiderError> {
        process_chain(self.registry.start_requests_hooks(), seeds, spider).await
    }
}

/// Feeds `seeds` through `hooks` one after another.
pub async fn process_chain<'a, S, H>(
    hooks: H,
    seeds: Vec<Request>,
    spider: Arc<S>,
) -> Result<Vec<Request>, SpiderError>
where
    S: Spider,
    H: IntoIterator<Item = &'a (String, StartRequestsHook<S>)>,
{
    let mut requests = seeds;
    for (name, hook) in hooks {
        trace!("Running {} on {} requests", name, requests.len());
        requests = hook(requests, Arc::clone(&spider)).await?;
    }
    Ok(requests)
}
