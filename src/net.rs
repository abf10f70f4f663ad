//! Network seam shared by the controller and the interception worker.

use crate::config::DATA_API_BASE;
use crate::CityKey;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use std::fmt;
use std::rc::Rc;

/// A fully buffered HTTP response. This is also the unit stored in caches,
/// so the body is kept byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// `200 OK` with a JSON body.
    pub fn json_ok(body: impl Into<Vec<u8>>) -> Self {
        HttpResponse::new(200, Some("application/json"), body)
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (offline, DNS, CORS, ...).
    Transport(String),
    /// A response arrived but with a status the caller does not accept.
    Status(u16),
    /// The body could not be decoded.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Network request failed: {}", msg),
            FetchError::Status(status) => write!(f, "Unexpected response status {}", status),
            FetchError::Decode(msg) => write!(f, "Failed to decode response body: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Something that can perform a GET and buffer the response.
///
/// Non-2xx statuses are returned as `Ok`; only transport failures are errors.
pub trait Network {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>>;
}

impl<T: Network + ?Sized> Network for &T {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>> {
        (**self).get(url)
    }
}

impl<T: Network + ?Sized> Network for Rc<T> {
    fn get<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<HttpResponse, FetchError>> {
        (**self).get(url)
    }
}

/// Request URL for one city's grouped job counts.
pub fn data_url(key: &CityKey) -> String {
    format!("{}?lanid={}&grupperat=1", DATA_API_BASE, key)
}
