//! Registration-time ordering of spider middleware hooks.
//!
//! Input hooks run in registration order; start-request hooks and the
//! output/exception chain run in reverse registration order. Each ordering is
//! kept in its own container, filled in as middlewares are registered, so no
//! list is ever reversed at read time.

use super::hooks::{ExceptionHook, HookSet, InputHook, OutputHook, SpiderMiddleware, StartRequestsHook};
use crate::spider::Spider;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// The `(output, exception)` pair of one middleware.
pub struct Descriptor<S: Spider> {
    pub name: String,
    pub output: Option<OutputHook<S>>,
    pub exception: Option<ExceptionHook<S>>,
}

impl<S: Spider> Clone for Descriptor<S> {
    fn clone(&self) -> Self {
        Descriptor {
            name: self.name.clone(),
            output: self.output.clone(),
            exception: self.exception.clone(),
        }
    }
}

/// Ordered hook containers for one manager.
pub struct ChainRegistry<S: Spider> {
    middleware_names: Vec<String>,
    input_hooks: Vec<(String, InputHook<S>)>,
    start_requests_hooks: VecDeque<(String, StartRequestsHook<S>)>,
    output_chain: VecDeque<Descriptor<S>>,
}

impl<S: Spider> Default for ChainRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spider> ChainRegistry<S> {
    pub fn new() -> Self {
        ChainRegistry {
            middleware_names: Vec::new(),
            input_hooks: Vec::new(),
            start_requests_hooks: VecDeque::new(),
            output_chain: VecDeque::new(),
        }
    }

    /// Registers a middleware, placing each of its hooks in its ordering.
    pub fn register<M>(&mut self, middleware: M)
    where
        M: SpiderMiddleware<S>,
    {
        self.register_arc(Arc::new(middleware));
    }

    pub fn register_arc(&mut self, middleware: Arc<dyn SpiderMiddleware<S>>) {
        self.add_hooks(middleware.hook_set());
    }

    fn add_hooks(&mut self, hooks: HookSet<S>) {
        debug!(
            "Registering spider middleware '{}' with hooks {:?}",
            hooks.name,
            hooks.enabled()
        );

        let HookSet {
            name,
            input,
            output,
            exception,
            start_requests,
        } = hooks;

        if let Some(hook) = input {
            self.input_hooks.push((format!("{}.input", name), hook));
        }
        if let Some(hook) = start_requests {
            self.start_requests_hooks
                .push_front((format!("{}.start_requests", name), hook));
        }
        if output.is_some() || exception.is_some() {
            self.output_chain.push_front(Descriptor {
                name: name.clone(),
                output,
                exception,
            });
        }
        self.middleware_names.push(name);
    }

    /// Names of the registered middlewares, in registration order.
    pub fn middleware_names(&self) -> &[String] {
        &self.middleware_names
    }

    pub fn input_hooks(&self) -> &[(String, InputHook<S>)] {
        &self.input_hooks
    }

    pub fn start_requests_hooks(&self) -> impl Iterator<Item = &(String, StartRequestsHook<S>)> {
        self.start_requests_hooks.iter()
    }

    pub fn output_chain(&self) -> impl Iterator<Item = &Descriptor<S>> {
        self.output_chain.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware_names.is_empty()
    }
}
