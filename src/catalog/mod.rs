pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::{CatalogError, HttpCatalog, HttpOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";

/// Field projection requested for every artwork row.
pub const ARTWORK_FIELDS: &[&str] = &[
    "id",
    "title",
    "place_of_origin",
    "artist_display",
    "inscriptions",
    "date_start",
    "date_end",
];

pub const UNKNOWN: &str = "Unknown";
pub const NO_INSCRIPTIONS: &str = "None";

pub type ArtworkId = u64;

/// A catalog row after ingestion. Every descriptive field is populated, so
/// values never need normalizing twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    pub place_of_origin: String,
    pub artist_display: String,
    pub inscriptions: String,
    pub date_start: i32,
    pub date_end: i32,
}

/// Artwork row as the catalog sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawArtwork {
    pub id: ArtworkId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
    #[serde(default)]
    pub inscriptions: Option<String>,
    #[serde(default)]
    pub date_start: Option<i32>,
    #[serde(default)]
    pub date_end: Option<i32>,
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback.to_string(),
    }
}

impl From<RawArtwork> for Artwork {
    fn from(raw: RawArtwork) -> Self {
        Self {
            id: raw.id,
            title: text_or(raw.title, UNKNOWN),
            place_of_origin: text_or(raw.place_of_origin, UNKNOWN),
            artist_display: text_or(raw.artist_display, UNKNOWN),
            inscriptions: text_or(raw.inscriptions, NO_INSCRIPTIONS),
            date_start: raw.date_start.unwrap_or(0),
            date_end: raw.date_end.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<RawArtwork>,
    pagination: PaginationInfo,
}

#[derive(Debug, Deserialize)]
struct PaginationInfo {
    total: u64,
}

/// One page request. `limit` is not restricted to the interactive page sizes
/// because bulk selection asks for arbitrary counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub fields: &'static [&'static str],
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            fields: ARTWORK_FIELDS,
        }
    }
}

/// Records of one page plus the catalog-wide total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub records: Vec<Artwork>,
    pub total: u64,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog responded with status {status}")]
    Status { status: u16 },

    #[error("failed to decode catalog response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a catalog response body and normalize its rows.
pub fn parse_catalog_body(body: &[u8]) -> Result<CatalogPage, FetchError> {
    let response: CatalogResponse =
        serde_json::from_slice(body).map_err(|source| FetchError::Decode { source })?;
    Ok(CatalogPage {
        records: response.data.into_iter().map(Artwork::from).collect(),
        total: response.pagination.total,
    })
}

/// One request/response round trip against the catalog. Implementations do
/// not retry.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<CatalogPage, FetchError>;
}
