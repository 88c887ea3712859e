//! # Spider Middleware Module
//!
//! Runs spider middlewares around the spider callback.
//!
//! ## Overview
//!
//! A spider middleware sits between the engine and the spider. It can inspect
//! a response before the spider parses it, rewrite what the spider produced,
//! recover from a failure raised further up, and adjust the spider's seed
//! requests. Middlewares describe themselves with a [`HookSet`]; the
//! [`SpiderMiddlewareManager`] arranges the hooks of every registered
//! middleware and drives one scrape at a time through them.
//!
//! ## Ordering
//!
//! - input hooks run first-registered first;
//! - output and exception hooks run last-registered first;
//! - start-request hooks run last-registered first.
//!
//! ## Key Components
//!
//! - **HookSet / SpiderMiddleware**: what a middleware provides
//! - **ChainRegistry**: registration-time ordering of the hooks
//! - **Continuation**: the per-scrape chain, built completely before it runs
//! - **SpiderMiddlewareManager**: `scrape` and `process_start_requests`
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::prelude::*;
//!
//! let mut manager = SpiderMiddlewareManager::<MySpider>::new();
//! manager.register(HookSet::new("DropEmpty").on_output(|_response, result, _spider| async move {
//!     let kept: Vec<_> = result.into_vec()?.into_iter().filter(|o| !is_empty(o)).collect();
//!     Ok(HookValue::Sequence(kept.into()))
//! }));
//!
//! let outputs = manager
//!     .scrape(spider_callback(), Ok(response), request, spider)
//!     .await?;
//! ```

mod continuation;
mod hooks;
mod input_gate;
mod manager;
mod output_chain;
mod registry;

pub use continuation::{Continuation, ScrapeState, Stage};
pub use hooks::{
    ExceptionHook, HookResult, HookSet, HookValue, InputHook, OutputHook, SpiderMiddleware,
    StartRequestsHook,
};
pub use manager::{SpiderMiddlewareManager, process_chain};
pub use registry::{ChainRegistry, Descriptor};
