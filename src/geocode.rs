//! Client for a Nominatim-compatible geocoding service.
//!
//! The public Nominatim instance rejects requests without an identifying
//! `User-Agent`, so every request carries the configured one.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::GeocoderConfig;

pub const DEFAULT_LIMIT: u32 = 1;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Invalid upstream body: {0}")]
    Decode(#[source] reqwest::Error),
}

pub struct Geocoder {
    client: reqwest::Client,
    base_url: Url,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        // A trailing slash keeps any path prefix when joining endpoints.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self { client, base_url })
    }

    pub fn search_url(&self, query: &str, limit: u32) -> Url {
        let mut url = self.endpoint("search");
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        url
    }

    pub fn reverse_url(&self, lat: f64, lon: f64, address_details: u8) -> Url {
        let mut url = self.endpoint("reverse");
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string())
            .append_pair("addressdetails", &address_details.to_string());
        url
    }

    /// Place name to candidate coordinates.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Value, GeocodeError> {
        self.fetch_json(self.search_url(query, limit)).await
    }

    /// Coordinates to a human-readable address.
    pub async fn reverse(
        &self,
        lat: f64,
        lon: f64,
        address_details: u8,
    ) -> Result<Value, GeocodeError> {
        self.fetch_json(self.reverse_url(lat, lon, address_details))
            .await
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, GeocodeError> {
        tracing::debug!(%url, "Geocoder request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GeocodeError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Upstream { status, body });
        }

        response.json::<Value>().await.map_err(GeocodeError::Decode)
    }
}
