//! HTTP client for the Search Analytics query API

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::retry::{with_retry, RetryPolicy};
use super::{async_trait, MetricSource};
use crate::error::FetchError;
use crate::models::{MetricRow, TimeWindow};

/// Date format used by the query API
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default query endpoint
const DEFAULT_API_URL: &str = "https://www.googleapis.com/webmasters/v3";

/// Default upper cap on rows per request
const DEFAULT_ROW_LIMIT: u32 = 5000;

/// Configuration for the Search Analytics client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL
    pub api_url: String,
    /// Property (site) URI the queries run against, trailing slash included
    pub property_uri: String,
    /// OAuth bearer token with read access to the property
    pub auth_token: String,
    /// Upper cap on rows per request
    pub row_limit: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Config for one property with the stock endpoint and limits
    pub fn new(property_uri: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            property_uri: property_uri.into(),
            auth_token: auth_token.into(),
            row_limit: DEFAULT_ROW_LIMIT,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Search Analytics query client
///
/// Issues windowed, optionally page-filtered queries and decodes the
/// dated rows. Transient failures are retried once under the configured
/// policy before escalating.
pub struct SearchConsoleClient {
    http: Client,
    query_url: Url,
    config: ClientConfig,
}

impl SearchConsoleClient {
    /// Create a client for the configured property
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        // The property URI is a path segment on the API side, so every
        // reserved character in it must be percent-encoded.
        let property: String =
            url::form_urlencoded::byte_serialize(config.property_uri.as_bytes()).collect();
        let query_url = Url::parse(&format!(
            "{}/sites/{}/searchAnalytics/query",
            config.api_url.trim_end_matches('/'),
            property
        ))?;

        Ok(Self {
            http,
            query_url,
            config,
        })
    }

    /// Property URI the client queries
    pub fn property_uri(&self) -> &str {
        &self.config.property_uri
    }

    async fn query_once(&self, body: &QueryRequest<'_>) -> Result<QueryResponse, FetchError> {
        let response = self
            .http
            .post(self.query_url.clone())
            .bearer_auth(&self.config.auth_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MetricSource for SearchConsoleClient {
    async fn fetch(
        &self,
        window: TimeWindow,
        page: Option<&str>,
    ) -> Result<Vec<MetricRow>, FetchError> {
        let body = QueryRequest {
            start_date: window.start.format(DATE_FORMAT).to_string(),
            end_date: window.end.format(DATE_FORMAT).to_string(),
            dimensions: ["date", "page"],
            dimension_filter_groups: page.map(|url| {
                [FilterGroup {
                    filters: [DimensionFilter {
                        dimension: "page",
                        operator: "equals",
                        expression: url,
                    }],
                }]
            }),
            row_limit: self.config.row_limit,
        };

        let response = with_retry(self.config.retry, || self.query_once(&body)).await?;

        // An absent `rows` field means no data for the window, not an error.
        let rows = response.rows.unwrap_or_default();
        debug!(
            start = %window.start,
            end = %window.end,
            page = page.unwrap_or("<all>"),
            rows = rows.len(),
            "search analytics query returned"
        );

        rows.into_iter().map(decode_row).collect()
    }
}

fn decode_row(row: ApiRow) -> Result<MetricRow, FetchError> {
    let date_key = row
        .keys
        .first()
        .ok_or_else(|| FetchError::Malformed("row without date key".to_string()))?;
    let url = row
        .keys
        .get(1)
        .ok_or_else(|| FetchError::Malformed(format!("row for {date_key} without page key")))?;
    let date = NaiveDate::parse_from_str(date_key, DATE_FORMAT)
        .map_err(|err| FetchError::Malformed(format!("bad date key {date_key:?}: {err}")))?;

    Ok(MetricRow {
        date,
        url: url.clone(),
        clicks: row.clicks.round() as u64,
        impressions: row.impressions.round() as u64,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    start_date: String,
    end_date: String,
    dimensions: [&'static str; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension_filter_groups: Option<[FilterGroup<'a>; 1]>,
    row_limit: u32,
}

#[derive(Debug, Serialize)]
struct FilterGroup<'a> {
    filters: [DimensionFilter<'a>; 1],
}

#[derive(Debug, Serialize)]
struct DimensionFilter<'a> {
    dimension: &'static str,
    operator: &'static str,
    expression: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Option<Vec<ApiRow>>,
}

#[derive(Debug, Deserialize)]
struct ApiRow {
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    /// Path the client derives for the test property
    const QUERY_PATH: &str = "/sites/https%3A%2F%2Fexample.com%2F/searchAnalytics/query";

    fn test_client(server_url: &str) -> SearchConsoleClient {
        let mut config = ClientConfig::new("https://example.com/", "test-token");
        config.api_url = server_url.to_string();
        config.retry = RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_millis(1),
        };
        SearchConsoleClient::new(config).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_decodes_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", QUERY_PATH)
            .match_body(Matcher::PartialJson(json!({
                "startDate": "2024-01-01",
                "endDate": "2024-02-27",
                "dimensions": ["date", "page"],
                "rowLimit": 5000,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "rows": [
                        {"keys": ["2024-01-01", "/pricing/"], "clicks": 120.0, "impressions": 4000.0},
                        {"keys": ["2024-01-02", "/pricing/"], "clicks": 118.0, "impressions": 3900.0},
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let rows = client.fetch(window(), None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "/pricing/");
        assert_eq!(rows[0].clicks, 120);
        assert_eq!(rows[1].impressions, 3900);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[tokio::test]
    async fn test_page_filter_sent_as_equals_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", QUERY_PATH)
            .match_body(Matcher::PartialJson(json!({
                "dimensionFilterGroups": [
                    {"filters": [{"dimension": "page", "operator": "equals", "expression": "/pricing/"}]}
                ],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"rows": []}).to_string())
            .create_async()
            .await;

        let client = test_client(&server.url());
        let rows = client.fetch(window(), Some("/pricing/")).await.unwrap();

        mock.assert_async().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_missing_rows_field_means_no_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", QUERY_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let rows = client.fetch(window(), None).await.unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_retried_once_then_escalates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", QUERY_PATH)
            .with_status(503)
            .with_body("backend unavailable")
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.fetch(window(), None).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, FetchError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_auth_error_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", QUERY_PATH)
            .with_status(403)
            .with_body("forbidden")
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.fetch(window(), None).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, FetchError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_malformed_row_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", QUERY_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"rows": [{"keys": ["2024-01-01"], "clicks": 5.0}]}).to_string())
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.fetch(window(), None).await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
