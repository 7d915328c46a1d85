//! HTTP client for the Wikidata SPARQL endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use refdata_core::places::{Country, Place};
use refdata_core::storage::{CountrySource, LookupError, PlaceSource, Result};

use super::sparql::{self, SparqlResponse};
use crate::config::Config;

const SOURCE_NAME: &str = "Wikidata";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

fn unavailable(message: impl ToString) -> LookupError {
    LookupError::SourceUnavailable {
        source_name: SOURCE_NAME,
        message: message.to_string(),
    }
}

/// Read-only client for countries and places on Wikidata.
///
/// Malformed identifiers are answered with `None` without a request.
#[derive(Debug, Clone)]
pub struct WikidataClient {
    http: reqwest::Client,
    endpoint: String,
}

impl WikidataClient {
    /// Creates a client for the configured endpoint and user agent.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.wikidata_user_agent.as_str())
            .timeout(Duration::from_secs(config.wikidata_timeout_seconds))
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            http,
            endpoint: config.wikidata_sparql_url.clone(),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query(&self, query: &str) -> Result<SparqlResponse> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .query(&[("query", query), ("format", "json")])
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "SPARQL query rejected");
            return Err(unavailable(format!("HTTP {status}")));
        }

        response.json().await.map_err(unavailable)
    }
}

#[async_trait]
impl CountrySource for WikidataClient {
    async fn get_country_by_qid(&self, qid: &str) -> Result<Option<Country>> {
        if !sparql::is_qid(qid) {
            return Ok(None);
        }
        let response = self.query(&sparql::country_by_qid_query(qid)).await?;
        Ok(sparql::parse_country_by_qid(qid, &response))
    }

    async fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        if !sparql::is_country_code(code) {
            return Ok(None);
        }
        let response = self.query(&sparql::country_by_code_query(code)).await?;
        Ok(sparql::parse_country_by_code(code, &response))
    }
}

#[async_trait]
impl PlaceSource for WikidataClient {
    async fn get_place_by_qid(&self, qid: &str) -> Result<Option<Place>> {
        if !sparql::is_qid(qid) {
            return Ok(None);
        }
        let response = self.query(&sparql::place_by_qid_query(qid)).await?;
        let place = sparql::parse_place(qid, &response);
        if place.is_none() {
            tracing::debug!(place_qid = %qid, "Place has no country entity");
        }
        Ok(place)
    }
}
