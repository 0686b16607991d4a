//! HTTP access behind a small trait so runs can be driven without a network.

use crate::error::FetchError;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;

/// Status and streaming body of a completed GET.
pub struct FetchResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET.
pub trait HttpFetch {
    /// Issue a GET. A non-success status is not an error at this level.
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// [`HttpFetch`] backed by `reqwest`'s blocking client.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("gup/", env!("CARGO_PKG_VERSION")))
            // Archives are large; a run is only bounded by process exit
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetch for HttpClient {
    fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send()?;
        Ok(FetchResponse {
            status: response.status().as_u16(),
            body: Box::new(response),
        })
    }
}
