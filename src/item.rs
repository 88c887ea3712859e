//! Spider output elements.

use crate::request::Request;
use std::fmt::Debug;

/// Marker trait for the items a spider scrapes.
pub trait ScrapedItem: Debug + Send + Sync + 'static {}

impl<T> ScrapedItem for T where T: Debug + Send + Sync + 'static {}

/// One element of a spider's output: a scraped item or a follow-up request.
#[derive(Debug, Clone, PartialEq)]
pub enum SpiderOutput<I> {
    Item(I),
    Request(Request),
}

impl<I> From<Request> for SpiderOutput<I> {
    fn from(request: Request) -> Self {
        SpiderOutput::Request(request)
    }
}
