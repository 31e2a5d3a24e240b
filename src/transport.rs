//! Plain HTTP GETs for the catalog and template images.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::MemeError;

/// Fetches whole response bodies. Anything outside 2xx is an error.
pub trait Transport {
    /// GET `url`, optionally bounded by `timeout`, and return the body.
    fn get_bytes(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Vec<u8>, MemeError>>;
}

/// [`Transport`] backed by reqwest.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wraps an existing client so it can be shared with the model client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, MemeError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request.send().await?;
        let status = resp.status();
        debug!("GET {url} -> {status}");
        if !status.is_success() {
            return Err(MemeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
