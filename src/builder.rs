//! # Builder Module
//!
//! Provides the `ManagerBuilder`, a fluent API for assembling a
//! `SpiderMiddlewareManager` from settings, named factories and directly
//! added middlewares, plus the scraper's concurrency configuration.
//!
//! ## Overview
//!
//! Middlewares enabled through settings are registered first, in priority
//! order. Middlewares added with `add_middleware` follow, in the order they
//! were added. Once built, the manager's hook orderings are frozen.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::builder::ManagerBuilder;
//!
//! let manager = ManagerBuilder::<MySpider>::new()
//!     .with_settings(settings)
//!     .add_factory("CatchException", || Ok(CatchExceptionMiddleware::default()))
//!     .add_middleware(HookSet::new("Debug").on_output(log_outputs))
//!     .build()?;
//! ```

use crate::config::{MiddlewareFactories, SpiderMiddlewareSettings, resolve_configured_order};
use crate::error::SpiderError;
use crate::middleware::{SpiderMiddleware, SpiderMiddlewareManager};
use crate::spider::Spider;
use kanal::{AsyncReceiver, AsyncSender};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Configuration for the scraper's concurrency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// The number of workers running scrapes concurrently.
    pub scrape_workers: usize,
    /// The capacity of the channels feeding and draining the scraper.
    pub channel_capacity: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            scrape_workers: num_cpus::get().clamp(4, 16),
            channel_capacity: 1000,
        }
    }
}

impl ScraperConfig {
    pub fn validate(&self) -> Result<(), SpiderError> {
        if self.scrape_workers == 0 {
            return Err(SpiderError::ConfigurationError(
                "scrape_workers must be greater than 0.".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(SpiderError::ConfigurationError(
                "channel_capacity must be greater than 0.".to_string(),
            ));
        }
        Ok(())
    }

    /// A channel sized for the scraper's input or output.
    pub fn bounded_channel<T>(&self) -> (AsyncSender<T>, AsyncReceiver<T>) {
        kanal::bounded_async(self.channel_capacity)
    }
}

pub struct ManagerBuilder<S: Spider> {
    settings: SpiderMiddlewareSettings,
    factories: MiddlewareFactories<S>,
    middlewares: Vec<Arc<dyn SpiderMiddleware<S>>>,
}

impl<S: Spider> Default for ManagerBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spider> ManagerBuilder<S> {
    pub fn new() -> Self {
        Self {
            settings: SpiderMiddlewareSettings::default(),
            factories: MiddlewareFactories::new(),
            middlewares: Vec::new(),
        }
    }

    /// Sets the settings that select and order factory-built middlewares.
    pub fn with_settings(mut self, settings: SpiderMiddlewareSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Makes a middleware constructor available to the settings under `name`.
    pub fn add_factory<F, M>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<M, SpiderError> + Send + Sync + 'static,
        M: SpiderMiddleware<S>,
    {
        self.factories.insert(name, factory);
        self
    }

    /// Adds a middleware after the settings-driven ones.
    pub fn add_middleware<M>(mut self, middleware: M) -> Self
    where
        M: SpiderMiddleware<S>,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Result<SpiderMiddlewareManager<S>, SpiderError> {
        let mut middlewares = resolve_configured_order(&self.settings, &self.factories)?;
        middlewares.extend(self.middlewares);
        debug!("Building spider middleware manager with {} middlewares", middlewares.len());
        Ok(SpiderMiddlewareManager::with_middlewares(middlewares))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::HookSet;
    use crate::response::Response;
    use crate::sequence::Sequence;
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
    fn test_settings_middlewares_come_first() {
        let settings = SpiderMiddlewareSettings::default()
            .set("Depth", Some(900))
            .set("HttpError", Some(50))
            .set("Offsite", None);

        let manager = ManagerBuilder::<NullSpider>::new()
            .with_settings(settings)
            .add_factory("Depth", || Ok(HookSet::<NullSpider>::new("Depth")))
            .add_factory("HttpError", || Ok(HookSet::<NullSpider>::new("HttpError")))
            .add_middleware(HookSet::<NullSpider>::new("Extra"))
            .build()
            .unwrap();

        assert_eq!(manager.middleware_names(), ["HttpError", "Depth", "Extra"]);
    }

    #[test]
    fn test_failing_factory_fails_build() {
        let settings = SpiderMiddlewareSettings::default().set("Broken", Some(1));
        let result = ManagerBuilder::<NullSpider>::new()
            .with_settings(settings)
            .add_factory("Broken", || -> Result<HookSet<NullSpider>, SpiderError> {
                Err(SpiderError::ConfigurationError("missing API key".to_string()))
            })
            .build();
        assert!(matches!(result, Err(SpiderError::ConfigurationError(_))));
    }

    #[test]
    fn test_scraper_config_validation() {
        assert!(ScraperConfig::default().validate().is_ok());
        let config = ScraperConfig {
            scrape_workers: 0,
            ..ScraperConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ScraperConfig {
            channel_capacity: 0,
            ..ScraperConfig::default()
        };
        assert!(matches!(config.validate(), Err(SpiderError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_bounded_channel_uses_capacity() {
        let config = ScraperConfig {
            scrape_workers: 1,
            channel_capacity: 2,
        };
        let (tx, rx) = config.bounded_channel::<u32>();
        assert!(tx.try_send(1).unwrap());
        assert!(tx.try_send(2).unwrap());
        assert!(!tx.try_send(3).unwrap());
        assert_eq!(rx.recv().await.unwrap(), 1);
    }
}
