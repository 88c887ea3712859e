//! # Spider Module
//!
//! Defines the `Spider` trait and the callback shape the middleware manager
//! drives.
//!
//! ## Overview
//!
//! A spider names itself, supplies its seed requests and parses responses into
//! a [`Sequence`] of items and follow-up requests. When an earlier step has
//! already failed (a download error, or a spider middleware rejecting the
//! response in its input hook) the spider receives the failure instead of a
//! response through `handle_failure`, which by default re-raises it so the
//! exception hooks of the middleware chain get to see it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::prelude::*;
//!
//! struct ArticleSpider;
//!
//! #[async_trait]
//! impl Spider for ArticleSpider {
//!     type Item = String;
//!
//!     fn name(&self) -> &str {
//!         "articles"
//!     }
//!
//!     fn start_urls(&self) -> Vec<&'static str> {
//!         vec!["https://example.com/articles"]
//!     }
//!
//!     async fn parse(&self, response: Arc<Response>) -> Result<Sequence<String>, SpiderError> {
//!         Ok(vec![SpiderOutput::Item(response.text())].into())
//!     }
//! }
//! ```

use crate::error::SpiderError;
use crate::item::ScrapedItem;
use crate::request::Request;
use crate::response::Response;
use crate::sequence::Sequence;
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use url::Url;

/// What a spider callback receives: the response, or the failure that
/// replaced it.
#[derive(Debug, Clone)]
pub enum ScrapeInput {
    Response(Arc<Response>),
    Failure(SpiderError),
}

/// A spider callback as seen by the middleware manager.
pub type Callback<S> = Arc<
    dyn Fn(
            ScrapeInput,
            Request,
            Arc<S>,
        ) -> BoxFuture<'static, Result<Sequence<<S as Spider>::Item>, SpiderError>>
        + Send
        + Sync,
>;

/// Defines the contract for a web spider.
#[async_trait]
pub trait Spider: Send + Sync + 'static {
    /// The type of item that the spider scrapes.
    type Item: ScrapedItem;

    fn name(&self) -> &str;

    /// Returns the initial URLs to start crawling from.
    fn start_urls(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Generates the initial requests to start crawling.
    fn start_requests(&self) -> Result<Vec<Request>, SpiderError> {
        let urls: Result<Vec<Url>, url::ParseError> =
            self.start_urls().into_iter().map(Url::parse).collect();
        Ok(urls?.into_iter().map(Request::new).collect())
    }

    /// Parses a response and extracts scraped items and new requests.
    async fn parse(&self, response: Arc<Response>) -> Result<Sequence<Self::Item>, SpiderError>;

    /// Called instead of `parse` when the response was replaced by a failure.
    async fn handle_failure(
        &self,
        failure: SpiderError,
        _request: &Request,
    ) -> Result<Sequence<Self::Item>, SpiderError> {
        Err(failure)
    }
}

/// Adapts a spider's `parse`/`handle_failure` pair into a scrape callback.
pub fn spider_callback<S: Spider>() -> Callback<S> {
    Arc::new(|input: ScrapeInput, request: Request, spider: Arc<S>| {
        async move {
            match input {
                ScrapeInput::Response(response) => spider.parse(response).await,
                ScrapeInput::Failure(failure) => spider.handle_failure(failure, &request).await,
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SpiderOutput;

    struct TitleSpider;

    #[async_trait]
    impl Spider for TitleSpider {
        type Item = String;

        fn name(&self) -> &str {
            "titles"
        }

        fn start_urls(&self) -> Vec<&'static str> {
            vec!["https://example.com/a", "https://example.com/b"]
        }

        async fn parse(&self, response: Arc<Response>) -> Result<Sequence<String>, SpiderError> {
            Ok(vec![SpiderOutput::Item(response.text())].into())
        }
    }

    #[test]
    fn test_start_requests_from_urls() {
        let requests = TitleSpider.start_requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.as_str(), "https://example.com/a");
        assert_eq!(requests[1].method, "GET");
    }

    #[tokio::test]
    async fn test_callback_dispatches_on_input() {
        let callback = spider_callback::<TitleSpider>();
        let spider = Arc::new(TitleSpider);
        let request = Request::get("https://example.com/a").unwrap();
        let response = Arc::new(Response::new(request.clone(), 200, "hello"));

        let out = callback(ScrapeInput::Response(response), request.clone(), Arc::clone(&spider))
            .await
            .unwrap();
        assert_eq!(out.into_vec().unwrap(), vec![SpiderOutput::Item("hello".to_string())]);

        let failure = SpiderError::exception("KeyError", "missing");
        let err = callback(ScrapeInput::Failure(failure.clone()), request, spider)
            .await
            .unwrap_err();
        assert_eq!(err, failure);
    }
}
