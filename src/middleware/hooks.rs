//! Hook types for spider middlewares.
//!
//! A spider middleware contributes up to four hooks, drawn from a closed set:
//!
//! - `input`: validates a response before the spider callback sees it;
//! - `output`: transforms the sequence the callback (or a later middleware) produced;
//! - `exception`: intercepts a failure raised further up the chain;
//! - `start_requests`: rewrites the spider's seed requests.
//!
//! Each hook is an optional field of [`HookSet`]. A missing hook is `None`,
//! and the manager never probes a middleware for anything outside these four.

use crate::error::SpiderError;
use crate::request::Request;
use crate::response::Response;
use crate::sequence::Sequence;
use crate::spider::Spider;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The value a hook hands back to the manager.
pub enum HookValue<I> {
    /// Nothing to report.
    Nothing,
    Sequence(Sequence<I>),
    /// Any other value. Never valid; reported as an invalid output.
    Other(Value),
}

impl<I> HookValue<I> {
    /// Short description of the value's type, used in invalid-output errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            HookValue::Nothing => "nothing",
            HookValue::Sequence(_) => "sequence",
            HookValue::Other(Value::Null) => "null",
            HookValue::Other(Value::Bool(_)) => "bool",
            HookValue::Other(Value::Number(_)) => "number",
            HookValue::Other(Value::String(_)) => "string",
            HookValue::Other(Value::Array(_)) => "array",
            HookValue::Other(Value::Object(_)) => "object",
        }
    }
}

impl<I> From<Sequence<I>> for HookValue<I> {
    fn from(sequence: Sequence<I>) -> Self {
        HookValue::Sequence(sequence)
    }
}

impl<I> fmt::Debug for HookValue<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookValue::Nothing => write!(f, "HookValue::Nothing"),
            HookValue::Sequence(seq) => write!(f, "HookValue::Sequence({:?})", seq),
            HookValue::Other(value) => write!(f, "HookValue::Other({})", value),
        }
    }
}

pub type HookResult<I> = Result<HookValue<I>, SpiderError>;

type Item<S> = <S as Spider>::Item;

pub type InputHook<S> =
    Arc<dyn Fn(Arc<Response>, Arc<S>) -> BoxFuture<'static, HookResult<Item<S>>> + Send + Sync>;

pub type OutputHook<S> = Arc<
    dyn Fn(Option<Arc<Response>>, Sequence<Item<S>>, Arc<S>) -> BoxFuture<'static, HookResult<Item<S>>>
        + Send
        + Sync,
>;

pub type ExceptionHook<S> = Arc<
    dyn Fn(Option<Arc<Response>>, SpiderError, Arc<S>) -> BoxFuture<'static, HookResult<Item<S>>>
        + Send
        + Sync,
>;

pub type StartRequestsHook<S> = Arc<
    dyn Fn(Vec<Request>, Arc<S>) -> BoxFuture<'static, Result<Vec<Request>, SpiderError>>
        + Send
        + Sync,
>;

/// The hooks one spider middleware provides.
pub struct HookSet<S: Spider> {
    pub name: String,
    pub input: Option<InputHook<S>>,
    pub output: Option<OutputHook<S>>,
    pub exception: Option<ExceptionHook<S>>,
    pub start_requests: Option<StartRequestsHook<S>>,
}

impl<S: Spider> HookSet<S> {
    /// Creates a hook set with no hooks.
    pub fn new(name: impl Into<String>) -> Self {
        HookSet {
            name: name.into(),
            input: None,
            output: None,
            exception: None,
            start_requests: None,
        }
    }

    pub fn on_input<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<Response>, Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<S::Item>> + Send + 'static,
    {
        self.input = Some(Arc::new(move |response: Arc<Response>, spider: Arc<S>| {
            hook(response, spider).boxed()
        }));
        self
    }

    pub fn on_output<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Arc<Response>>, Sequence<S::Item>, Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<S::Item>> + Send + 'static,
    {
        self.output = Some(Arc::new(
            move |response: Option<Arc<Response>>, result: Sequence<S::Item>, spider: Arc<S>| {
                hook(response, result, spider).boxed()
            },
        ));
        self
    }

    pub fn on_exception<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Arc<Response>>, SpiderError, Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<S::Item>> + Send + 'static,
    {
        self.exception = Some(Arc::new(
            move |response: Option<Arc<Response>>, exception: SpiderError, spider: Arc<S>| {
                hook(response, exception, spider).boxed()
            },
        ));
        self
    }

    pub fn on_start_requests<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<Request>, Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Request>, SpiderError>> + Send + 'static,
    {
        self.start_requests = Some(Arc::new(move |seeds: Vec<Request>, spider: Arc<S>| {
            hook(seeds, spider).boxed()
        }));
        self
    }

    /// Names of the hooks present, in declaration order.
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut hooks = Vec::new();
        if self.input.is_some() {
            hooks.push("input");
        }
        if self.output.is_some() {
            hooks.push("output");
        }
        if self.exception.is_some() {
            hooks.push("exception");
        }
        if self.start_requests.is_some() {
            hooks.push("start_requests");
        }
        hooks
    }
}

impl<S: Spider> Clone for HookSet<S> {
    fn clone(&self) -> Self {
        HookSet {
            name: self.name.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            exception: self.exception.clone(),
            start_requests: self.start_requests.clone(),
        }
    }
}

impl<S: Spider> fmt::Debug for HookSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("name", &self.name)
            .field("hooks", &self.enabled())
            .finish()
    }
}

/// A spider middleware.
///
/// Implementors describe themselves as a [`HookSet`]; the hooks usually
/// capture a clone of `self` to reach the middleware's own state.
pub trait SpiderMiddleware<S: Spider>: Send + Sync + 'static {
    fn hook_set(self: Arc<Self>) -> HookSet<S>;
}

impl<S: Spider> SpiderMiddleware<S> for HookSet<S> {
    fn hook_set(self: Arc<Self>) -> HookSet<S> {
        Arc::unwrap_or_clone(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullSpider;

    #[async_trait]
    impl Spider for NullSpider {
        type Item = u32;

        fn name(&self) -> &str {
            "null"
        }

        async fn parse(&self, _response: Arc<Response>) -> Result<Sequence<u32>, SpiderError> {
            Ok(Sequence::empty())
        }
    }

    #[test]
    fn test_missing_hooks_are_none() {
        let hooks = HookSet::<NullSpider>::new("Empty")
            .on_exception(|_response, _exception, _spider| async { Ok(HookValue::Nothing) });
        assert!(hooks.input.is_none());
        assert!(hooks.output.is_none());
        assert!(hooks.exception.is_some());
        assert!(hooks.start_requests.is_none());
        assert_eq!(hooks.enabled(), vec!["exception"]);
    }

    #[test]
    fn test_hook_value_type_names() {
        assert_eq!(HookValue::<u32>::Nothing.type_name(), "nothing");
        assert_eq!(HookValue::<u32>::Other(Value::from(1.2)).type_name(), "number");
        assert_eq!(HookValue::<u32>::Other(Value::from("x")).type_name(), "string");
        assert_eq!(HookValue::<u32>::from(Sequence::empty()).type_name(), "sequence");
    }

    #[test]
    fn test_hook_set_is_its_own_middleware() {
        let hooks = HookSet::<NullSpider>::new("Passthrough")
            .on_output(|_response, result, _spider| async move { Ok(HookValue::Sequence(result)) });
        let resolved = Arc::new(hooks).hook_set();
        assert_eq!(resolved.name, "Passthrough");
        assert_eq!(resolved.enabled(), vec!["output"]);
    }
}
