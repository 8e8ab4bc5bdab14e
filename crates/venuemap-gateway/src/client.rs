//! HTTP client for the Places-style search API.
//!
//! Wraps `reqwest` with envelope-status checking, optional API key handling,
//! and typed response deserialization. Blank queries short-circuit to an
//! empty result without a request.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use venuemap_core::{normalize_query, AppConfig, PlaceCandidate};

use crate::error::RemoteError;
use crate::gateway::PlaceGateway;
use crate::normalize::{normalize_place, normalize_prediction};
use crate::types::{AutocompleteResponse, DetailsResponse, SearchResponse};

/// Client for the remote places API.
///
/// Use [`HttpGateway::from_app_config`] in the binary or
/// [`HttpGateway::new`] to point at a mock server in tests.
pub struct HttpGateway {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
}

impl HttpGateway {
    /// Creates a gateway against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RemoteError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends below the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| RemoteError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.map(str::to_owned),
            base_url: parsed,
        })
    }

    /// # Errors
    ///
    /// See [`HttpGateway::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, RemoteError> {
        Self::new(
            &config.places_base_url,
            config.places_api_key.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Builds `{base}/{endpoint}/json?...` with percent-encoded parameters
    /// and the API key appended when one is configured.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, RemoteError> {
        let mut url = self
            .base_url
            .join(&format!("{endpoint}/json"))
            .map_err(|e| RemoteError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and decodes the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, RemoteError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Maps the envelope `status` to "has data" / "empty" / error.
    fn check_status(status: &str, message: Option<&str>) -> Result<bool, RemoteError> {
        match status {
            "OK" => Ok(true),
            "ZERO_RESULTS" => Ok(false),
            other => Err(RemoteError::Api {
                status: other.to_owned(),
                message: message.unwrap_or("no error message").to_owned(),
            }),
        }
    }
}

impl PlaceGateway for HttpGateway {
    async fn search(&self, text: &str) -> Result<Vec<PlaceCandidate>, RemoteError> {
        let Some(query) = normalize_query(text) else {
            return Ok(Vec::new());
        };

        let url = self.build_url("textsearch", &[("query", &query)])?;
        let envelope: SearchResponse = self
            .request_json(url, &format!("textsearch(query={query})"))
            .await?;
        if !Self::check_status(&envelope.status, envelope.error_message.as_deref())? {
            return Ok(Vec::new());
        }

        let candidates = envelope
            .results
            .into_iter()
            .map(normalize_place)
            .filter(|c| {
                if c.has_coordinates() {
                    true
                } else {
                    tracing::warn!(place_id = %c.id, "search: skipping result without geometry");
                    false
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(query, count = candidates.len(), "search results received");
        Ok(candidates)
    }

    async fn autocomplete(&self, text: &str) -> Result<Vec<PlaceCandidate>, RemoteError> {
        let Some(input) = normalize_query(text) else {
            return Ok(Vec::new());
        };

        let url = self.build_url("autocomplete", &[("input", &input)])?;
        let envelope: AutocompleteResponse = self
            .request_json(url, &format!("autocomplete(input={input})"))
            .await?;
        if !Self::check_status(&envelope.status, envelope.error_message.as_deref())? {
            return Ok(Vec::new());
        }

        Ok(envelope
            .predictions
            .into_iter()
            .map(normalize_prediction)
            .collect())
    }

    async fn details(&self, place_id: &str) -> Result<PlaceCandidate, RemoteError> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(RemoteError::EmptyPlaceId);
        }

        let url = self.build_url("details", &[("place_id", place_id)])?;
        let envelope: DetailsResponse = self
            .request_json(url, &format!("details(place_id={place_id})"))
            .await?;
        let has_data = Self::check_status(&envelope.status, envelope.error_message.as_deref())?;

        let place = envelope
            .result
            .filter(|_| has_data)
            .ok_or_else(|| RemoteError::Incomplete {
                place_id: place_id.to_owned(),
                reason: "response has no result".to_owned(),
            })?;

        let candidate = normalize_place(place);
        if !candidate.has_coordinates() {
            return Err(RemoteError::Incomplete {
                place_id: place_id.to_owned(),
                reason: "result has no usable geometry".to_owned(),
            });
        }
        Ok(candidate)
    }
}
