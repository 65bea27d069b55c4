use async_trait::async_trait;
use payloads::{APIClient, ClientError, RawPage};

use crate::mapper::QueryParams;

/// Loads one raw page for already mapped query parameters.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, params: QueryParams) -> Result<RawPage, ClientError>;
}

/// `GET <endpoint>?<params>` through the shared API client.
#[derive(Clone)]
pub struct EndpointFetcher {
    client: APIClient,
    endpoint: String,
}

impl EndpointFetcher {
    pub fn new(client: APIClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PageFetcher for EndpointFetcher {
    async fn fetch_page(&self, params: QueryParams) -> Result<RawPage, ClientError> {
        self.client.get_page(&self.endpoint, params.as_slice()).await
    }
}
