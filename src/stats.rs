//! # Statistics Module
//!
//! Counts what the scraper workers saw: responses scraped, what the spider
//! middleware chain produced, and the failures no exception hook handled.
//!
//! ## Overview
//!
//! Unhandled failures are tallied per error kind under the
//! `spider_exceptions/<kind>` key, so a crawl report shows at a glance which
//! errors escaped the middleware chain and how often.
//!
//! ## Example
//!
//! ```rust,ignore
//! use spider_spidermw::stats::ScrapeStats;
//!
//! let stats = ScrapeStats::new();
//! stats.record_spider_exception(&err);
//! println!("{}", stats.to_json_string_pretty()?);
//! ```

use crate::error::SpiderError;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

// A point-in-time copy used for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub responses_scraped: usize,
    pub items_scraped: usize,
    pub requests_scraped: usize,
    pub unhandled_failures: usize,
    pub spider_exceptions: BTreeMap<String, usize>,
}

/// Collects statistics about the scraper's operation.
#[derive(Debug)]
pub struct ScrapeStats {
    start_time: Instant,
    responses_scraped: AtomicUsize,
    items_scraped: AtomicUsize,
    requests_scraped: AtomicUsize,
    unhandled_failures: AtomicUsize,
    spider_exceptions: DashMap<String, usize>,
}

impl ScrapeStats {
    /// Creates a new `ScrapeStats` with all counters initialized to zero.
    pub fn new() -> Self {
        ScrapeStats {
            start_time: Instant::now(),
            responses_scraped: AtomicUsize::new(0),
            items_scraped: AtomicUsize::new(0),
            requests_scraped: AtomicUsize::new(0),
            unhandled_failures: AtomicUsize::new(0),
            spider_exceptions: DashMap::new(),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let spider_exceptions = self
            .spider_exceptions
            .iter()
            .map(|entry| (format!("spider_exceptions/{}", entry.key()), *entry.value()))
            .collect();

        StatsSnapshot {
            responses_scraped: self.responses_scraped.load(Ordering::SeqCst),
            items_scraped: self.items_scraped.load(Ordering::SeqCst),
            requests_scraped: self.requests_scraped.load(Ordering::SeqCst),
            unhandled_failures: self.unhandled_failures.load(Ordering::SeqCst),
            spider_exceptions,
        }
    }

    pub(crate) fn increment_responses_scraped(&self) {
        self.responses_scraped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_items_scraped(&self) {
        self.items_scraped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_requests_scraped(&self) {
        self.requests_scraped.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a failure that reached the end of the middleware chain.
    pub fn record_spider_exception(&self, err: &SpiderError) {
        self.unhandled_failures.fetch_add(1, Ordering::SeqCst);
        *self
            .spider_exceptions
            .entry(err.kind().to_string())
            .or_insert(0) += 1;
    }

    /// Number of unhandled failures of the given kind.
    pub fn spider_exception_count(&self, kind: &str) -> usize {
        self.spider_exceptions.get(kind).map(|v| *v).unwrap_or(0)
    }

    pub fn to_json_string(&self) -> Result<String, SpiderError> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, SpiderError> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl Default for ScrapeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScrapeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();

        writeln!(f, "\nScrape Statistics")?;
        writeln!(f, "-----------------")?;
        writeln!(f, "  duration   : {:?}", self.start_time.elapsed())?;
        writeln!(
            f,
            "  scraped    : responses: {}, items: {}, requests: {}",
            snapshot.responses_scraped, snapshot.items_scraped, snapshot.requests_scraped
        )?;

        let exceptions = if snapshot.spider_exceptions.is_empty() {
            "none".to_string()
        } else {
            snapshot
                .spider_exceptions
                .iter()
                .map(|(key, count)| format!("{}: {}", key, count))
                .collect::<Vec<String>>()
                .join(", ")
        };
        writeln!(
            f,
            "  unhandled  : {} ({})\n",
            snapshot.unhandled_failures, exceptions
        )
    }
}
