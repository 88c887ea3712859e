//! # Config Module
//!
//! Settings-driven selection and ordering of spider middlewares.
//!
//! ## Overview
//!
//! Middlewares are enabled by name with an integer priority. The framework's
//! defaults live in `base`, a project's overrides in `custom`; a `null`
//! priority disables a middleware. Lower priorities sit closer to the engine,
//! so they are registered first.
//!
//! ## Example
//!
//! ```rust,ignore
//! let settings = SpiderMiddlewareSettings::from_json_str(r#"{
//!     "base":   { "HttpError": 50, "Depth": 900 },
//!     "custom": { "Depth": null, "CatchException": 540 }
//! }"#)?;
//!
//! let middlewares = resolve_configured_order(&settings, &factories)?;
//! ```

use crate::error::SpiderError;
use crate::middleware::SpiderMiddleware;
use crate::spider::Spider;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Middleware name to priority; `None` disables the middleware.
pub type ComponentPriorities = BTreeMap<String, Option<i32>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiderMiddlewareSettings {
    #[serde(default)]
    pub base: ComponentPriorities,
    #[serde(default)]
    pub custom: ComponentPriorities,
}

impl SpiderMiddlewareSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SpiderError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets or overrides a project-level priority.
    pub fn set(mut self, name: impl Into<String>, priority: Option<i32>) -> Self {
        self.custom.insert(name.into(), priority);
        self
    }

    /// `base` overlaid with `custom`.
    pub fn merged(&self) -> ComponentPriorities {
        let mut merged = self.base.clone();
        for (name, priority) in &self.custom {
            merged.insert(name.clone(), *priority);
        }
        merged
    }
}

/// Enabled middleware names, lowest priority first, ties broken by name.
pub fn build_component_list(settings: &SpiderMiddlewareSettings) -> Vec<String> {
    let mut enabled: Vec<(i32, String)> = settings
        .merged()
        .into_iter()
        .filter_map(|(name, priority)| priority.map(|p| (p, name)))
        .collect();
    enabled.sort();
    enabled.into_iter().map(|(_, name)| name).collect()
}

type Factory<S> =
    Box<dyn Fn() -> Result<Arc<dyn SpiderMiddleware<S>>, SpiderError> + Send + Sync>;

/// Constructors for the middlewares that settings may refer to by name.
pub struct MiddlewareFactories<S: Spider> {
    factories: HashMap<String, Factory<S>>,
}

impl<S: Spider> Default for MiddlewareFactories<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spider> MiddlewareFactories<S> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a constructor under `name`, replacing any previous one.
    pub fn insert<F, M>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<M, SpiderError> + Send + Sync + 'static,
        M: SpiderMiddleware<S>,
    {
        self.factories.insert(
            name.into(),
            Box::new(move || -> Result<Arc<dyn SpiderMiddleware<S>>, SpiderError> {
                Ok(Arc::new(factory()?))
            }),
        );
    }

    fn build(&self, name: &str) -> Result<Arc<dyn SpiderMiddleware<S>>, SpiderError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SpiderError::UnknownMiddleware(name.to_string()))?;
        factory()
    }
}

/// Instantiates the enabled middlewares in priority order.
pub fn resolve_configured_order<S: Spider>(
    settings: &SpiderMiddlewareSettings,
    factories: &MiddlewareFactories<S>,
) -> Result<Vec<Arc<dyn SpiderMiddleware<S>>>, SpiderError> {
    let names = build_component_list(settings);
    debug!("Enabled spider middlewares: {:?}", names);
    names.iter().map(|name| factories.build(name)).collect()
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

    fn factories(names: &[&'static str]) -> MiddlewareFactories<NullSpider> {
        let mut factories = MiddlewareFactories::new();
        for &name in names {
            factories.insert(name, move || Ok(HookSet::<NullSpider>::new(name)));
        }
        factories
    }

    #[test]
    fn test_custom_overrides_and_disables_base() {
        let settings = SpiderMiddlewareSettings::from_json_str(
            r#"{
                "base": { "HttpError": 50, "Offsite": 500, "Depth": 900 },
                "custom": { "Depth": null, "Offsite": 10, "CatchException": 540 }
            }"#,
        )
        .unwrap();

        assert_eq!(
            build_component_list(&settings),
            vec!["Offsite", "HttpError", "CatchException"]
        );
    }

    #[test]
    fn test_equal_priorities_are_ordered_by_name() {
        let settings = SpiderMiddlewareSettings::default()
            .set("Zeta", Some(100))
            .set("Alpha", Some(100))
            .set("Mid", Some(50));
        assert_eq!(build_component_list(&settings), vec!["Mid", "Alpha", "Zeta"]);
        assert_eq!(build_component_list(&settings), build_component_list(&settings.clone()));
    }

    #[test]
    fn test_resolve_instantiates_in_order() {
        let settings = SpiderMiddlewareSettings::default()
            .set("Second", Some(20))
            .set("First", Some(10));
        let resolved = resolve_configured_order(&settings, &factories(&["First", "Second"])).unwrap();
        let names: Vec<_> = resolved.into_iter().map(|mw| mw.hook_set().name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_unknown_middleware_is_an_error() {
        let settings = SpiderMiddlewareSettings::default().set("Missing", Some(1));
        let err = resolve_configured_order(&settings, &factories(&["First"])).err().unwrap();
        assert_eq!(err, SpiderError::UnknownMiddleware("Missing".to_string()));
    }

    #[test]
    fn test_malformed_settings() {
        let err = SpiderMiddlewareSettings::from_json_str(r#"{"base": {"A": "high"}}"#).unwrap_err();
        assert_eq!(err.kind(), "Json");
    }
}
