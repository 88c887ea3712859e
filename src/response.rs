//! The `Response` handed to spider middlewares and callbacks.

use crate::request::Request;
use url::Url;

/// A downloaded response together with the request that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: u16,
    pub body: Vec<u8>,
    pub request: Request,
}

impl Response {
    pub fn new(request: Request, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Response {
            url: request.url.clone(),
            status,
            body: body.into(),
            request,
        }
    }

    /// Returns the body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
