//! Output and exception hook stages.
//!
//! Every descriptor of the chain becomes one [`Stage`]. A stage runs the
//! middleware's output hook on success and its exception hook on failure,
//! whichever of the two exist, and enforces both hooks' return contracts.
//! Invalid-output failures are never handed to an exception hook.

use super::continuation::{ScrapeState, Stage};
use super::hooks::{ExceptionHook, HookValue, OutputHook};
use super::registry::Descriptor;
use crate::error::SpiderError;
use crate::response::Response;
use crate::sequence::{Sequence, materialize};
use crate::spider::Spider;
use futures_util::FutureExt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Builds the stage for one descriptor, bound to a single scrape.
pub(crate) fn descriptor_stage<S: Spider>(
    descriptor: &Descriptor<S>,
    response: Option<Arc<Response>>,
    spider: Arc<S>,
) -> Stage<S::Item> {
    let name = descriptor.name.clone();
    let output = descriptor.output.clone();
    let exception = descriptor.exception.clone();

    Box::new(move |state: ScrapeState<S::Item>| {
        async move {
            match state {
                ScrapeState::Success(sequence) => match output {
                    Some(hook) => run_output(&name, &hook, response, sequence, spider).await,
                    None => ScrapeState::Success(sequence),
                },
                ScrapeState::Failure(err) if err.is_invalid_output() => {
                    trace!("Passing invalid output past {}: {}", name, err);
                    ScrapeState::Failure(err)
                }
                ScrapeState::Failure(err) => match exception {
                    Some(hook) => run_exception(&name, &hook, response, err, spider).await,
                    None => ScrapeState::Failure(err),
                },
            }
        }
        .boxed()
    })
}

async fn run_output<S: Spider>(
    name: &str,
    hook: &OutputHook<S>,
    response: Option<Arc<Response>>,
    sequence: Sequence<S::Item>,
    spider: Arc<S>,
) -> ScrapeState<S::Item> {
    trace!("Running output hook of {}", name);
    match hook(response, sequence, spider).await {
        Ok(HookValue::Sequence(result)) => materialize(result).into(),
        Ok(other) => {
            warn!("{}.output returned {} instead of a sequence", name, other.type_name());
            ScrapeState::Failure(SpiderError::invalid_output(
                format!("{}.output", name),
                "a sequence",
                other.type_name(),
            ))
        }
        Err(err) => ScrapeState::Failure(err),
    }
}

async fn run_exception<S: Spider>(
    name: &str,
    hook: &ExceptionHook<S>,
    response: Option<Arc<Response>>,
    failure: SpiderError,
    spider: Arc<S>,
) -> ScrapeState<S::Item> {
    trace!("Running exception hook of {} for {}", name, failure);
    match hook(response, failure.clone(), spider).await {
        Ok(HookValue::Nothing) => ScrapeState::Failure(failure),
        Ok(HookValue::Sequence(result)) => {
            trace!("{} recovered from {}", name, failure);
            materialize(result).into()
        }
        Ok(other) => {
            warn!(
                "{}.exception returned {} instead of nothing or a sequence",
                name,
                other.type_name()
            );
            ScrapeState::Failure(SpiderError::invalid_output(
                format!("{}.exception", name),
                "nothing or a sequence",
                other.type_name(),
            ))
        }
        Err(err) => ScrapeState::Failure(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SpiderOutput;
    use crate::middleware::hooks::HookSet;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn descriptor(hooks: HookSet<NullSpider>) -> Descriptor<NullSpider> {
        Descriptor {
            name: hooks.name,
            output: hooks.output,
            exception: hooks.exception,
        }
    }

    async fn run(d: &Descriptor<NullSpider>, state: ScrapeState<u32>) -> ScrapeState<u32> {
        descriptor_stage(d, None, Arc::new(NullSpider))(state).await
    }

    fn success(items: Vec<u32>) -> ScrapeState<u32> {
        ScrapeState::Success(items.into_iter().map(SpiderOutput::Item).collect::<Vec<_>>().into())
    }

    #[tokio::test]
    async fn test_output_only_ignores_failure() {
        let d = descriptor(HookSet::<NullSpider>::new("Out").on_output(|_r, _seq, _s| async {
            Ok(HookValue::Sequence(Sequence::empty()))
        }));
        let err = SpiderError::exception("ValueError", "v");
        let state = run(&d, ScrapeState::Failure(err.clone())).await;
        assert_eq!(state.into_result().unwrap_err(), err);
    }

    #[tokio::test]
    async fn test_exception_only_ignores_success() {
        let d = descriptor(HookSet::<NullSpider>::new("Exc").on_exception(|_r, _e, _s| async {
            Ok(HookValue::Sequence(Sequence::empty()))
        }));
        let state = run(&d, success(vec![1, 2])).await;
        assert_eq!(
            state.into_result().unwrap().into_vec().unwrap(),
            vec![SpiderOutput::Item(1), SpiderOutput::Item(2)]
        );
    }

    #[tokio::test]
    async fn test_output_must_return_sequence() {
        let d = descriptor(
            HookSet::<NullSpider>::new("Float").on_output(|_r, _seq, _s| async { Ok(HookValue::Other(json!(1.2))) }),
        );
        match run(&d, success(vec![1])).await {
            ScrapeState::Failure(SpiderError::InvalidOutput { middleware, expected, got }) => {
                assert_eq!(middleware, "Float.output");
                assert_eq!(expected, "a sequence");
                assert_eq!(got, "number");
            }
            other => panic!("expected invalid output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_output_returning_nothing_is_invalid() {
        let d = descriptor(HookSet::<NullSpider>::new("Quiet").on_output(|_r, _seq, _s| async { Ok(HookValue::Nothing) }));
        let state = run(&d, success(vec![1])).await;
        assert!(state.into_result().unwrap_err().is_invalid_output());
    }

    #[tokio::test]
    async fn test_exception_hook_not_called_for_invalid_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let d = descriptor(
            HookSet::<NullSpider>::new("Both")
                .on_output(|_r, seq, _s| async move { Ok(HookValue::Sequence(seq)) })
                .on_exception(move |_r, _e, _s| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(HookValue::Sequence(Sequence::empty())) }
                }),
        );
        let invalid = SpiderError::invalid_output("Other.output", "a sequence", "string");
        let state = run(&d, ScrapeState::Failure(invalid.clone())).await;
        assert_eq!(state.into_result().unwrap_err(), invalid);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exception_hook_nothing_keeps_failure() {
        let d = descriptor(HookSet::<NullSpider>::new("Log").on_exception(|_r, _e, _s| async { Ok(HookValue::Nothing) }));
        let err = SpiderError::exception("AttributeError", "a");
        let state = run(&d, ScrapeState::Failure(err.clone())).await;
        assert_eq!(state.into_result().unwrap_err(), err);
    }

    #[tokio::test]
    async fn test_exception_hook_invalid_return() {
        let d = descriptor(
            HookSet::<NullSpider>::new("Odd").on_exception(|_r, _e, _s| async { Ok(HookValue::Other(json!("oops"))) }),
        );
        let state = run(&d, ScrapeState::Failure(SpiderError::exception("E", "e"))).await;
        match state.into_result().unwrap_err() {
            SpiderError::InvalidOutput { middleware, got, .. } => {
                assert_eq!(middleware, "Odd.exception");
                assert_eq!(got, "string");
            }
            other => panic!("expected invalid output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_in_exception_hook_becomes_failure() {
        let d = descriptor(HookSet::<NullSpider>::new("Rethrow").on_exception(|_r, e, _s| async move {
            Err(SpiderError::exception("WrappedError", e.to_string()))
        }));
        let state = run(&d, ScrapeState::Failure(SpiderError::exception("E", "inner"))).await;
        assert_eq!(
            state.into_result().unwrap_err(),
            SpiderError::exception("WrappedError", "E: inner")
        );
    }
}
