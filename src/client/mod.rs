pub(crate) mod http;
pub(crate) mod jsonp;

pub use http::HttpTransport;
pub use jsonp::JsonpTransport;

use crate::models::SensorReading;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("loader response did not invoke callback {0}")]
    BadPadding(String),

    #[error("callback slot closed before delivering a payload")]
    CallbackDropped,
}

/// A way to obtain one sensor reading from an endpoint URL.
///
/// Production code uses `HttpTransport` (direct GET) with `JsonpTransport`
/// as the cross-origin fallback. Tests swap in fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<SensorReading, TransportError>;
}
