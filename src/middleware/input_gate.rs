//! Pre-callback validation through the input hooks.

use super::hooks::{HookValue, InputHook};
use crate::error::SpiderError;
use crate::response::Response;
use crate::spider::{ScrapeInput, Spider};
use std::sync::Arc;
use tracing::{trace, warn};

/// Runs every input hook in registration order.
///
/// Returns the response untouched when all hooks pass. The first hook that
/// fails, or returns anything other than `HookValue::Nothing`, stops the scan
/// and its error replaces the response.
pub(crate) async fn process_spider_input<S: Spider>(
    hooks: &[(String, InputHook<S>)],
    response: Arc<Response>,
    spider: &Arc<S>,
) -> ScrapeInput {
    for (name, hook) in hooks {
        trace!("Running input hook {} for {}", name, response.url);
        match hook(Arc::clone(&response), Arc::clone(spider)).await {
            Ok(HookValue::Nothing) => {}
            Ok(other) => {
                warn!("{} returned {} instead of nothing", name, other.type_name());
                return ScrapeInput::Failure(SpiderError::invalid_output(
                    name.as_str(),
                    "nothing or raise an error",
                    other.type_name(),
                ));
            }
            Err(err) => {
                trace!("Input hook {} rejected {}: {}", name, response.url, err);
                return ScrapeInput::Failure(err);
            }
        }
    }
    ScrapeInput::Response(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::hooks::HookSet;
    use crate::request::Request;
    use crate::sequence::Sequence;
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

    fn response() -> Arc<Response> {
        let request = Request::get("https://example.com/").unwrap();
        Arc::new(Response::new(request, 200, "ok"))
    }

    fn counting_hook(calls: &Arc<AtomicUsize>) -> InputHook<NullSpider> {
        let calls = Arc::clone(calls);
        let hooks = HookSet::<NullSpider>::new("Counting").on_input(move |_response, _spider| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(HookValue::Nothing) }
        });
        hooks.input.unwrap()
    }

    #[tokio::test]
    async fn test_all_hooks_pass() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks = vec![
            ("A.input".to_string(), counting_hook(&calls)),
            ("B.input".to_string(), counting_hook(&calls)),
        ];

        let input = process_spider_input(&hooks, response(), &Arc::new(NullSpider)).await;
        assert!(matches!(input, ScrapeInput::Response(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_error_stops_scan() {
        let calls = Arc::new(AtomicUsize::new(0));
        let raising = HookSet::<NullSpider>::new("Raising")
            .on_input(|_response, _spider| async { Err(SpiderError::exception("KeyError", "k")) })
            .input
            .unwrap();
        let hooks = vec![
            ("Raising.input".to_string(), raising),
            ("Counting.input".to_string(), counting_hook(&calls)),
        ];

        let input = process_spider_input(&hooks, response(), &Arc::new(NullSpider)).await;
        match input {
            ScrapeInput::Failure(err) => assert_eq!(err, SpiderError::exception("KeyError", "k")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_nothing_return_is_invalid_output() {
        let hooks = vec![(
            "Bad.input".to_string(),
            HookSet::<NullSpider>::new("Bad")
                .on_input(|_response, _spider| async { Ok(HookValue::Other(json!(1234))) })
                .input
                .unwrap(),
        )];

        let input = process_spider_input(&hooks, response(), &Arc::new(NullSpider)).await;
        match input {
            ScrapeInput::Failure(SpiderError::InvalidOutput { middleware, got, .. }) => {
                assert_eq!(middleware, "Bad.input");
                assert_eq!(got, "number");
            }
            other => panic!("expected invalid output, got {:?}", other),
        }
    }
}
