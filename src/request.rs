//! The `Request` type produced by spiders and start-request hooks.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// A request to be scheduled by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub url: Url,
    pub method: String,
    /// Free-form metadata carried alongside the request (depth, priority, ...).
    #[serde(default)]
    pub meta: HashMap<String, Value>,
}

impl Request {
    /// Creates a `GET` request for the given URL.
    pub fn new(url: Url) -> Self {
        Request {
            url,
            method: "GET".to_string(),
            meta: HashMap::new(),
        }
    }

    /// Parses `url` and creates a `GET` request for it.
    pub fn get(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }
}
