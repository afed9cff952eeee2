use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{city_label, GeocodePlace, GeocodeResult};

/// Client for the external geocoding provider.
///
/// Manages the HTTP client, base URL, and country restriction. Use
/// [`GeocodeClient::new`] with the configured provider URL in production or
/// point `base_url` at a mock server in tests.
pub struct GeocodeClient {
    client: Client,
    search_url: Url,
    country_codes: String,
}

impl GeocodeClient {
    /// Creates a new client for the provider rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        country_codes: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends the search path instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|u| u.join("search"))
            .map_err(|_| GeocodeError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            search_url,
            country_codes: country_codes.to_owned(),
        })
    }

    /// Runs a free-text search against the provider and returns the raw
    /// place list.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the response is not the expected
    ///   JSON array.
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodePlace>, GeocodeError> {
        let url = self.build_url(query);
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Resolves a query to coordinates using the first returned place, or
    /// `None` when the provider has no results.
    ///
    /// # Errors
    ///
    /// Propagates [`GeocodeError::Http`] / [`GeocodeError::Deserialize`] from
    /// [`GeocodeClient::search`], and returns [`GeocodeError::Coordinates`]
    /// if the first place carries an unparseable `lat`/`lon`.
    pub async fn lookup_first(&self, query: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let places = self.search(query).await?;

        let Some(first) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = parse_coordinate(&first.lat)?;
        let longitude = parse_coordinate(&first.lon)?;

        Ok(Some(GeocodeResult {
            latitude,
            longitude,
            city: city_label(&first.display_name),
        }))
    }

    /// Builds the search URL with percent-encoded query parameters.
    fn build_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("q", query);
            pairs.append_pair("countrycodes", &self.country_codes);
        }
        url
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocodeError::Coordinates {
            value: raw.to_string(),
        })
}
