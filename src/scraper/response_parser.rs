//! # Response Parser Module
//!
//! Worker tasks that feed downloaded responses through the spider middleware
//! manager.
//!
//! ## Overview
//!
//! The engine hands over each download outcome together with its request. A
//! pool of workers pulls them off a channel, runs the full scrape (input
//! hooks, spider callback, output and exception hooks) and forwards every
//! resulting item or request. A failure that survives the whole chain goes to
//! the failure path: it is logged and counted under `spider_exceptions`.
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = ScraperConfig::default();
//! let (download_tx, download_rx) = config.bounded_channel();
//! let (output_tx, output_rx) = config.bounded_channel();
//!
//! let handle = spawn_scraper_task(manager, spider, download_rx, output_tx, &config, stats)?;
//! download_tx.send((request, Ok(response))).await?;
//! ```

use crate::builder::ScraperConfig;
use crate::error::SpiderError;
use crate::item::SpiderOutput;
use crate::middleware::SpiderMiddlewareManager;
use crate::request::Request;
use crate::response::Response;
use crate::sequence::Sequence;
use crate::spider::{Spider, spider_callback};
use crate::stats::ScrapeStats;
use kanal::{AsyncReceiver, AsyncSender};
use log::{debug, error, trace, warn};
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// A download outcome paired with the request that produced it.
pub type Downloaded = (Request, Result<Response, SpiderError>);

pub fn spawn_scraper_task<S>(
    manager: Arc<SpiderMiddlewareManager<S>>,
    spider: Arc<S>,
    res_rx: AsyncReceiver<Downloaded>,
    output_tx: AsyncSender<SpiderOutput<S::Item>>,
    config: &ScraperConfig,
    stats: Arc<ScrapeStats>,
) -> Result<tokio::task::JoinHandle<()>, SpiderError>
where
    S: Spider,
{
    config.validate()?;
    let mut workers = JoinSet::new();

    for worker_id in 0..config.scrape_workers {
        let res_rx = res_rx.clone();
        let output_tx = output_tx.clone();
        let manager = Arc::clone(&manager);
        let spider = Arc::clone(&spider);
        let stats = Arc::clone(&stats);

        workers.spawn(async move {
            trace!("Scraper worker {} started", worker_id);
            while let Ok((request, outcome)) = res_rx.recv().await {
                debug!("Scraping {}", request.url);
                stats.increment_responses_scraped();

                let url = request.url.clone();
                let result = manager
                    .scrape(spider_callback(), outcome, request, Arc::clone(&spider))
                    .await;

                match result {
                    Ok(sequence) => {
                        if let Err(e) = forward_outputs(sequence, &url, &output_tx, &stats).await {
                            warn!("Scraper worker {} stopping: {}", worker_id, e);
                            break;
                        }
                    }
                    Err(e) => handle_spider_error(&e, &url, &stats),
                }
            }
            trace!("Scraper worker {} finished", worker_id);
        });
    }

    Ok(tokio::spawn(async move {
        while let Some(res) = workers.join_next().await {
            if let Err(e) = res {
                error!("A scraper worker task failed: {:?}", e);
            }
        }
        trace!("Scraper finished");
    }))
}

/// Sends each output on as it is produced. An error raised partway through
/// goes to the failure path; what was produced before it is kept.
async fn forward_outputs<I>(
    sequence: Sequence<I>,
    url: &Url,
    output_tx: &AsyncSender<SpiderOutput<I>>,
    stats: &ScrapeStats,
) -> Result<(), SpiderError> {
    for output in sequence {
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                handle_spider_error(&e, url, stats);
                break;
            }
        };
        match &output {
            SpiderOutput::Item(_) => stats.increment_items_scraped(),
            SpiderOutput::Request(_) => stats.increment_requests_scraped(),
        }
        if output_tx.send(output).await.is_err() {
            return Err(SpiderError::ChannelClosed);
        }
    }
    Ok(())
}

fn handle_spider_error(err: &SpiderError, url: &Url, stats: &ScrapeStats) {
    error!("Spider error processing {}: {}", url, err);
    stats.record_spider_exception(err);
}
