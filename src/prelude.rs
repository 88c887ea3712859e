//! A "prelude" for users of the `spider-spidermw` crate.
//!
//! This prelude re-exports the most commonly used traits, structs, and macros
//! so that they can be easily imported.
//!
//! # Example
//!
//! ```
//! use spider_spidermw::prelude::*;
//! ```

pub use crate::{
    // Core structs
    ManagerBuilder,
    SpiderMiddlewareManager,
    // Core traits
    Spider,
    // Essential re-exports for trait implementation
    async_trait,
};

pub use crate::error::SpiderError;
pub use crate::item::SpiderOutput;
pub use crate::middleware::{HookSet, HookValue, ScrapeState, SpiderMiddleware};
pub use crate::request::Request;
pub use crate::response::Response;
pub use crate::sequence::Sequence;
pub use crate::spider::{Callback, ScrapeInput, spider_callback};
pub use std::sync::Arc;
