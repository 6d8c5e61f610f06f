use crate::config::OddsApiSettings;
use crate::error::EdgeError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::debug;

const MONEYLINE_MARKET: &str = "h2h"; // h2h = head-to-head (moneyline)
const ODDS_FORMAT: &str = "decimal";
const DATE_FORMAT: &str = "iso";

/// Request quota reported by The Odds API response headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApiUsage {
    pub remaining: Option<u32>,
    pub used: Option<u32>,
}

impl ApiUsage {
    fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|value| value as u32)
        };
        Self {
            remaining: read("x-requests-remaining"),
            used: read("x-requests-used"),
        }
    }
}

/// Raw fixtures of one league, plus the quota seen on the response
#[derive(Debug, Clone, Default)]
pub struct OddsBoard {
    pub fixtures: Vec<serde_json::Value>,
    pub usage: ApiUsage,
}

/// Anything that can produce a moneyline board for a league key
#[async_trait]
pub trait OddsSource {
    async fn fetch_board(&self, league_key: &str) -> Result<OddsBoard, EdgeError>;
}

pub struct OddsApiClient {
    api_key: String,
    settings: OddsApiSettings,
    client: reqwest::Client,
}

impl OddsApiClient {
    /// Fails with `MissingCredential` on a blank key, before any request is made
    pub fn new(api_key: String, settings: OddsApiSettings) -> Result<Self, EdgeError> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(EdgeError::MissingCredential);
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| EdgeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            settings,
            client,
        })
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    /// Fetch the moneyline board for one league. One request, no retries.
    async fn fetch_board(&self, league_key: &str) -> Result<OddsBoard, EdgeError> {
        let url = format!("{}/{}/odds", self.settings.base_url, league_key);
        let bookmakers = self.settings.bookmakers.query_value();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.settings.region.as_str()),
                ("markets", MONEYLINE_MARKET),
                ("bookmakers", bookmakers.as_str()),
                ("oddsFormat", ODDS_FORMAT),
                ("dateFormat", DATE_FORMAT),
            ])
            .send()
            .await
            // the URL carries the API key, keep it out of error messages
            .map_err(|source| EdgeError::Request {
                league: league_key.to_string(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EdgeError::Status {
                league: league_key.to_string(),
                status,
            });
        }

        let usage = ApiUsage::from_headers(response.headers());
        debug!(
            "{}: API requests remaining {:?}, used {:?}",
            league_key, usage.remaining, usage.used
        );

        let fixtures: Vec<serde_json::Value> =
            response.json().await.map_err(|source| EdgeError::Decode {
                league: league_key.to_string(),
                source: source.without_url(),
            })?;

        Ok(OddsBoard { fixtures, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BookmakerSet;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap as AxumHeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::time::Duration;

    async fn odds_handler(
        Path(sport): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, AxumHeaderMap, Json<serde_json::Value>) {
        let mut headers = AxumHeaderMap::new();
        headers.insert("x-requests-remaining", "480".parse().unwrap());
        headers.insert("x-requests-used", "20".parse().unwrap());

        if params.get("apiKey").map(String::as_str) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, headers, Json(serde_json::json!({})));
        }
        if sport == "icehockey_nhl" {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                headers,
                Json(serde_json::json!({ "message": "unknown sport" })),
            );
        }
        if sport == "baseball_mlb" {
            return (StatusCode::OK, headers, Json(serde_json::json!({ "oops": true })));
        }

        // echo the query so the test can check what was requested
        let board = serde_json::json!([{
            "home_team": "Arsenal",
            "away_team": "Chelsea",
            "commence_time": "2025-10-17T19:00:00Z",
            "query": params,
        }]);
        (StatusCode::OK, headers, Json(board))
    }

    async fn spawn_server() -> String {
        let app = Router::new().route("/v4/sports/:sport/odds", get(odds_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v4/sports", addr)
    }

    fn settings(base_url: String) -> OddsApiSettings {
        OddsApiSettings {
            base_url,
            region: "us".to_string(),
            bookmakers: BookmakerSet::parse("draftkings,fanduel"),
            timeout: Duration::from_secs(20),
        }
    }

    #[test]
    fn test_blank_key_is_missing_credential() {
        let result = OddsApiClient::new("   ".to_string(), OddsApiSettings::default());
        assert!(matches!(result, Err(EdgeError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_fetch_board_sends_moneyline_query() {
        let base = spawn_server().await;
        let client = OddsApiClient::new("test-key".to_string(), settings(base)).unwrap();

        let board = client.fetch_board("soccer_epl").await.unwrap();
        assert_eq!(board.fixtures.len(), 1);
        assert_eq!(
            board.usage,
            ApiUsage {
                remaining: Some(480),
                used: Some(20)
            }
        );

        let query = &board.fixtures[0]["query"];
        assert_eq!(query["regions"], "us");
        assert_eq!(query["markets"], "h2h");
        assert_eq!(query["bookmakers"], "draftkings,fanduel");
        assert_eq!(query["oddsFormat"], "decimal");
        assert_eq!(query["dateFormat"], "iso");
    }

    #[tokio::test]
    async fn test_non_success_status_is_retrieval_error() {
        let base = spawn_server().await;
        let client = OddsApiClient::new("test-key".to_string(), settings(base.clone())).unwrap();
        let err = client.fetch_board("icehockey_nhl").await.unwrap_err();
        assert!(matches!(
            err,
            EdgeError::Status { status, .. } if status == StatusCode::UNPROCESSABLE_ENTITY
        ));

        let wrong_key = OddsApiClient::new("other".to_string(), settings(base)).unwrap();
        let err = wrong_key.fetch_board("soccer_epl").await.unwrap_err();
        assert!(err.is_retrieval());
    }

    #[tokio::test]
    async fn test_non_array_body_is_decode_error() {
        let base = spawn_server().await;
        let client = OddsApiClient::new("test-key".to_string(), settings(base)).unwrap();
        let err = client.fetch_board("baseball_mlb").await.unwrap_err();
        assert!(matches!(err, EdgeError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OddsApiClient::new(
            "test-key".to_string(),
            settings(format!("http://{}/v4/sports", addr)),
        )
        .unwrap();
        let err = client.fetch_board("soccer_epl").await.unwrap_err();
        assert!(matches!(err, EdgeError::Request { .. }));
        assert!(!format!("{err:?}").contains("test-key"));
    }
}
