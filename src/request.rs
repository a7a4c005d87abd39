use crate::error::QueryError;
use crate::time_range::TimeRange;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum Tier {
    #[serde(rename = "TIER_FREQUENT_SEARCH")]
    #[value(name = "frequent-search")]
    FrequentSearch,
    #[serde(rename = "TIER_ARCHIVE")]
    #[value(name = "archive")]
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum QuerySyntax {
    #[serde(rename = "QUERY_SYNTAX_DATAPRIME")]
    #[value(name = "dataprime")]
    Dataprime,
    #[serde(rename = "QUERY_SYNTAX_LUCENE")]
    #[value(name = "lucene")]
    Lucene,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<QuerySyntax>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339"
    )]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl QueryMetadata {
    pub fn new(
        tier: Option<Tier>,
        syntax: Option<QuerySyntax>,
        range: TimeRange,
        limit: Option<u32>,
    ) -> Self {
        QueryMetadata {
            tier,
            syntax,
            start_date: range.start,
            end_date: range.end,
            limit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &QueryMetadata::default()
    }
}

fn rfc3339<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

/// Body of a query POST
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QueryMetadata>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>, metadata: QueryMetadata) -> Self {
        QueryRequest {
            query: query.into(),
            metadata: (!metadata.is_empty()).then_some(metadata),
        }
    }
}

/// Blocking client for the query endpoint
pub struct QueryClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl QueryClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, QueryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("logq/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(QueryClient {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the query and return the raw response body
    pub fn execute(&self, request: &QueryRequest) -> Result<String, QueryError> {
        tracing::debug!(endpoint = %self.endpoint(), "sending query");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(QueryError::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }
}
