//! Recommendation service client over HTTP.
//!
//! Sends `user`, `max_results` and the exclusion flags as query parameters. The service may
//! answer with a bare JSON list or with a paginated `{results, next}` page; pages are followed
//! until `max_results` items are collected.

use crate::domain::{DomainError, RecommendationItem, RecommendationQuery};
use crate::ports::RecommendationPort;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://recommend.games";
pub const DEFAULT_RECOMMEND_PATH: &str = "/recommend";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Safety net against a service that keeps returning `next`.
const MAX_PAGES: usize = 10;

pub struct HttpRecommendClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecommendClient {
    /// # Arguments
    /// * `base_url` - Service root, e.g. "https://recommend.games"
    /// * `path` - Endpoint path appended to the base URL
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("board-game-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: Self::endpoint(base_url, path),
        })
    }

    fn endpoint(base_url: &str, path: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn query_pairs(query: &RecommendationQuery) -> Vec<(&'static str, String)> {
        vec![
            ("user", query.user.clone()),
            ("max_results", query.max_results.to_string()),
            ("exclude_known", query.exclude_known.to_string()),
            ("exclude_owned", query.exclude_owned.to_string()),
            ("exclude_clusters", query.exclude_clusters.to_string()),
        ]
    }

    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<RecommendResponse, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Recommendation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "recommendation service returned error");
            return Err(DomainError::Recommendation(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::Recommendation(format!("Failed to parse response: {}", e)))
    }
}

/// Either shape the service is known to return.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecommendResponse {
    List(Vec<RecommendationItem>),
    Page {
        results: Vec<RecommendationItem>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl RecommendResponse {
    fn into_parts(self) -> (Vec<RecommendationItem>, Option<String>) {
        match self {
            RecommendResponse::List(items) => (items, None),
            RecommendResponse::Page { results, next } => (results, next),
        }
    }
}

#[async_trait::async_trait]
impl RecommendationPort for HttpRecommendClient {
    async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<RecommendationItem>, DomainError> {
        info!(user = %query.user, url = %self.endpoint, "requesting recommendations");

        let first = self
            .client
            .get(&self.endpoint)
            .query(&Self::query_pairs(query));
        let (mut items, mut next) = self.fetch_page(first).await?.into_parts();

        let mut pages = 1;
        while items.len() < query.max_results {
            let Some(url) = next.take() else { break };
            if pages >= MAX_PAGES {
                warn!(pages, "giving up on further result pages");
                break;
            }
            debug!(url = %url, "fetching next result page");
            let (more, following) = self.fetch_page(self.client.get(&url)).await?.into_parts();
            if more.is_empty() {
                break;
            }
            items.extend(more);
            next = following;
            pages += 1;
        }

        items.truncate(query.max_results);
        info!(user = %query.user, count = items.len(), "recommendations received");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local HTTP server: answers the n-th connection with `respond(base, n)` and records
    /// every request line.
    async fn serve(
        respond: impl Fn(&str, usize) -> (u16, String) + Send + 'static,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let server_base = base.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let line = String::from_utf8_lossy(&head)
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let n = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(line);
                    seen.len() - 1
                };
                let (status, body) = respond(&server_base, n);
                let reply = format!(
                    "HTTP/1.1 {} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (base, requests)
    }

    fn page(base: &str, names: &[&str], next_page: usize) -> String {
        let results: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
        json!({
            "results": results,
            "next": format!("{}/recommend?page={}", base, next_page),
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_follows_next_and_truncates() {
        let (base, requests) = serve(|base, n| match n {
            0 => (200, page(base, &["A", "B", "C"], 2)),
            _ => (200, page(base, &["D", "E", "F"], 3)),
        })
        .await;
        let client = HttpRecommendClient::new(&base, "/recommend", Duration::from_secs(5)).unwrap();

        let items = client
            .recommend(&RecommendationQuery::for_user("markus shepherd"))
            .await
            .unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
        assert_eq!(
            *requests.lock().unwrap(),
            vec![
                "GET /recommend?user=markus+shepherd&max_results=5&exclude_known=true&exclude_owned=true&exclude_clusters=true HTTP/1.1".to_string(),
                "GET /recommend?page=2 HTTP/1.1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_after_max_pages() {
        let (base, requests) = serve(|base, n| (200, page(base, &["G"], n + 2))).await;
        let client = HttpRecommendClient::new(&base, "/recommend", Duration::from_secs(5)).unwrap();
        let query = RecommendationQuery {
            max_results: 50,
            ..RecommendationQuery::for_user("markus")
        };

        let items = client.recommend(&query).await.unwrap();

        assert_eq!(items.len(), MAX_PAGES);
        assert_eq!(requests.lock().unwrap().len(), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_error_page_maps_to_excerpt() {
        let (base, requests) = serve(|base, n| match n {
            0 => (200, page(base, &["A", "B"], 2)),
            _ => (500, "x".repeat(300)),
        })
        .await;
        let client = HttpRecommendClient::new(&base, "/recommend", Duration::from_secs(5)).unwrap();

        let err = client
            .recommend(&RecommendationQuery::for_user("markus"))
            .await
            .unwrap_err();

        let msg = match err {
            DomainError::Recommendation(msg) => msg,
            other => panic!("expected recommendation error, got {:?}", other),
        };
        assert!(msg.starts_with("API error 500"), "{}", msg);
        assert!(msg.ends_with(&"x".repeat(200)));
        assert!(!msg.contains(&"x".repeat(201)));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        assert_eq!(
            HttpRecommendClient::endpoint("https://recommend.games/", "/recommend"),
            "https://recommend.games/recommend"
        );
        assert_eq!(
            HttpRecommendClient::endpoint("http://localhost:8000", "api/games/recommend/"),
            "http://localhost:8000/api/games/recommend/"
        );
    }

    #[test]
    fn test_query_pairs_carry_policy() {
        let pairs = HttpRecommendClient::query_pairs(&RecommendationQuery::for_user("markus"));
        assert_eq!(
            pairs,
            vec![
                ("user", "markus".to_string()),
                ("max_results", "5".to_string()),
                ("exclude_known", "true".to_string()),
                ("exclude_owned", "true".to_string()),
                ("exclude_clusters", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_response_bare_list() {
        let resp: RecommendResponse =
            serde_json::from_str(r#"[{"name": "Catan", "image_url": ["a"]}, {"name": "Azul"}]"#)
                .unwrap();
        let (items, next) = resp.into_parts();
        assert_eq!(items.len(), 2);
        assert!(next.is_none());
    }

    #[test]
    fn test_response_paginated() {
        let resp: RecommendResponse = serde_json::from_str(
            r#"{"count": 80, "next": "https://recommend.games/recommend?page=2",
                "results": [{"name": "Catan", "bgg_id": 13}]}"#,
        )
        .unwrap();
        let (items, next) = resp.into_parts();
        assert_eq!(items[0].name, "Catan");
        assert_eq!(
            next.as_deref(),
            Some("https://recommend.games/recommend?page=2")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_recommendation_error() {
        let client =
            HttpRecommendClient::new("http://127.0.0.1:9", "/recommend", Duration::from_secs(2))
                .unwrap();
        let err = client
            .recommend(&RecommendationQuery::for_user("markus"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Recommendation(_)));
    }
}
