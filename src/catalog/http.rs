use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::{parse_catalog_body, CatalogFetcher, CatalogPage, FetchError, PageRequest};

pub const DEFAULT_USER_AGENT: &str = concat!("artpager/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_url: super::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            proxy: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid user agent: {value}")]
    InvalidUserAgent { value: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Catalog fetcher backed by the public artworks endpoint.
#[derive(Clone, Debug)]
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpCatalog {
    pub fn new(options: &HttpOptions) -> Result<Self, CatalogError> {
        let endpoint = artworks_endpoint(&options.base_url)?;
        let client = build_client(options)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    pub fn page_url(&self, request: &PageRequest) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.limit.to_string())
            .append_pair("fields", &request.fields.join(","));
        url
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalog {
    async fn fetch_page(&self, request: PageRequest) -> Result<CatalogPage, FetchError> {
        let url = self.page_url(&request);
        debug!(%url, "requesting catalog page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { source })?;
        parse_catalog_body(&body)
    }
}

fn artworks_endpoint(base_url: &str) -> Result<reqwest::Url, CatalogError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    reqwest::Url::parse(&format!("{trimmed}/artworks")).map_err(|_| CatalogError::InvalidBaseUrl {
        url: base_url.to_string(),
    })
}

fn build_client(options: &HttpOptions) -> Result<reqwest::Client, CatalogError> {
    let user_agent = options
        .user_agent
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_USER_AGENT);
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(user_agent).map_err(|_| {
            CatalogError::InvalidUserAgent {
                value: user_agent.to_string(),
            }
        })?,
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(options.timeout_seconds.max(1)));

    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| CatalogError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CatalogError::HttpClientBuild { source: e })
}
