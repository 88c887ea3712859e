//! # spider-spidermw
//!
//! Spider-side middleware pipeline for the `spider-lib` web scraping framework.
//!
//! Sits between the engine and a spider's callbacks: every downloaded
//! response passes through the input hooks, the callback's output travels
//! back through the output and exception hooks, and start requests are
//! threaded through their own chain before reaching the scheduler.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::prelude::*;
//!
//! struct MySpider;
//!
//! #[async_trait]
//! impl Spider for MySpider {
//!     type Item = String;
//!     fn name(&self) -> &str { "my_spider" }
//!     async fn parse(&self, response: Arc<Response>) -> Result<Sequence<String>, SpiderError> {
//!         Ok(vec![SpiderOutput::Item(response.text())].into())
//!     }
//! }
//!
//! async fn scrape(response: Response) -> Result<(), SpiderError> {
//!     let manager = ManagerBuilder::<MySpider>::new()
//!         .add_middleware(HookSet::new("Depth").on_output(filter_depth))
//!         .build()?;
//!     let request = response.request.clone();
//!     let outputs = manager
//!         .scrape(spider_callback(), Ok(response), request, Arc::new(MySpider))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod item;
pub mod middleware;
pub mod prelude;
pub mod request;
pub mod response;
pub mod scraper;
pub mod sequence;
pub mod spider;
pub mod stats;

pub use builder::{ManagerBuilder, ScraperConfig};
pub use error::SpiderError;
pub use middleware::SpiderMiddlewareManager;
pub use scraper::spawn_scraper_task;
pub use spider::Spider;

pub use async_trait::async_trait;
pub use tokio;
