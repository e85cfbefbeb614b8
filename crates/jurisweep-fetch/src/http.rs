//! reqwest transport for adapter requests.

use std::time::Duration;

use async_trait::async_trait;
use jurisweep_sites::FetchRequest;
use tracing::{debug, info};

use crate::retry::RetryPolicy;
use crate::{Fetch, FetchError};

const TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for court sites.
///
/// Several sites serve incomplete certificate chains, so requests that ask
/// for it go through a second client with verification off.
pub struct HttpFetcher {
    client: reqwest::Client,
    insecure: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(TIMEOUT).build()?,
            insecure: reqwest::Client::builder()
                .timeout(TIMEOUT)
                .danger_accept_invalid_certs(true)
                .build()?,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn client_for(&self, request: &FetchRequest) -> &reqwest::Client {
        if request.verify_tls {
            &self.client
        } else {
            &self.insecure
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, FetchError> {
        let client = self.client_for(request);
        let url = request.full_url();
        info!(url = %url, "fetching");

        let resp = self.retry.send(&url, || {
            let mut builder = client.get(&request.url).query(&request.query);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder.send()
        })
        .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        debug!(url = %url, bytes = body.len(), "fetched");
        Ok(body)
    }
}
