// src/services/catalog.rs

//! Raycast catalog fetcher.
//!
//! Downloads the extension list with one bounded GET and turns it into
//! [`Item`]s sorted by downloads. Parsing is all-or-nothing: one bad record
//! fails the whole fetch.

use std::collections::HashSet;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;

use crate::error::{AppError, Result};
use crate::models::Item;
use crate::utils::http::truncate_body;

/// Catalog response envelope.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<RawExtension>,
}

#[derive(Debug, Deserialize)]
struct RawExtension {
    name: String,
    download_count: RawCount,
}

/// Download counts arrive either as JSON numbers or numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(Number),
    Text(String),
}

impl RawCount {
    fn to_count(&self) -> Option<u64> {
        match self {
            RawCount::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| {
                        f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64
                    })
                    .map(|f| f as u64)
            }),
            RawCount::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }
}

impl std::fmt::Display for RawCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCount::Number(n) => write!(f, "{n}"),
            RawCount::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Parse a catalog body into items sorted by downloads, highest first.
///
/// Ties keep the order in which the catalog listed them.
pub fn parse_catalog(body: &[u8]) -> Result<Vec<Item>> {
    let response: CatalogResponse = serde_json::from_slice(body)
        .map_err(|e| AppError::data_format(format!("unexpected catalog body: {e}")))?;

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(response.data.len());

    for (index, raw) in response.data.into_iter().enumerate() {
        if raw.name.trim().is_empty() {
            return Err(AppError::data_format(format!(
                "record {index} has an empty name"
            )));
        }
        let count = raw.download_count.to_count().ok_or_else(|| {
            AppError::data_format(format!(
                "record {index} ({}) has a non-integer download_count {}",
                raw.name, raw.download_count
            ))
        })?;
        if !seen.insert(raw.name.clone()) {
            return Err(AppError::data_format(format!(
                "duplicate extension name {}",
                raw.name
            )));
        }
        items.push(Item::new(raw.name, count));
    }

    // `sort_by` is stable, so equal counts stay in catalog order.
    items.sort_by(|a, b| b.download_count.cmp(&a.download_count));
    Ok(items)
}

/// Service that reads current download counts from the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    client: Client,
    url: String,
}

impl CatalogFetcher {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch and normalize the current catalog.
    pub async fn fetch(&self) -> Result<Vec<Item>> {
        log::debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::fetch(format!(
                "catalog responded with {}: {}",
                status,
                truncate_body(&body, 200)
            )));
        }

        let body = response.bytes().await?;
        let items = parse_catalog(&body)?;
        log::info!("Fetched {} extensions from catalog", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::HttpConfig;
    use crate::utils::http::create_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_parse_sorts_descending_and_stable() {
        let body = br#"{"data": [
            {"name": "low", "download_count": 1},
            {"name": "tie-first", "download_count": "50"},
            {"name": "high", "download_count": 900},
            {"name": "tie-second", "download_count": 50}
        ]}"#;
        let items = parse_catalog(body).unwrap();
        assert_eq!(names(&items), vec!["high", "tie-first", "tie-second", "low"]);
        assert_eq!(items[1].download_count, 50);
    }

    #[test]
    fn test_parse_coerces_counts() {
        let body = br#"{"data": [
            {"name": "a", "download_count": " 42 "},
            {"name": "b", "download_count": 7.0},
            {"name": "c", "download_count": 3, "title": "ignored"}
        ]}"#;
        let items = parse_catalog(body).unwrap();
        assert_eq!(items, vec![Item::new("a", 42), Item::new("b", 7), Item::new("c", 3)]);
    }

    #[test]
    fn test_parse_empty_catalog() {
        assert!(parse_catalog(br#"{"data": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_records() {
        let cases: [&[u8]; 8] = [
            br#"{"data": [{"name": "a", "download_count": "many"}]}"#,
            br#"{"data": [{"name": "a", "download_count": -4}]}"#,
            br#"{"data": [{"name": "a", "download_count": 1.5}]}"#,
            br#"{"data": [{"name": "a", "download_count": null}]}"#,
            br#"{"data": [{"name": "", "download_count": 1}]}"#,
            br#"{"data": [{"name": "a", "download_count": 1}, {"name": "a", "download_count": 2}]}"#,
            br#"{"items": []}"#,
            b"<html>oops</html>",
        ];
        for body in cases {
            let err = parse_catalog(body).unwrap_err();
            assert!(
                matches!(err, AppError::DataFormat(_)),
                "expected data format error, got {err}"
            );
        }
    }

    #[test]
    fn test_parse_count_range_edges() {
        let body = br#"{"data": [{"name": "a", "download_count": "9223372036854775808"}]}"#;
        assert_eq!(parse_catalog(body).unwrap()[0].download_count, 1u64 << 63);

        let body = br#"{"data": [{"name": "a", "download_count": 18446744073709551616}]}"#;
        assert!(matches!(parse_catalog(body), Err(AppError::DataFormat(_))));
    }

    #[test]
    fn test_one_bad_record_fails_everything() {
        let body = br#"{"data": [
            {"name": "good", "download_count": 10},
            {"name": "bad", "download_count": "ten"}
        ]}"#;
        assert!(parse_catalog(body).is_err());
    }

    #[tokio::test]
    async fn test_fetch_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/extensions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"name": "B", "download_count": "5"},
                    {"name": "A", "download_count": 15}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_client(&HttpConfig::default()).unwrap();
        let fetcher = CatalogFetcher::new(client, format!("{}/api/extensions", server.uri()));
        let items = fetcher.fetch().await.unwrap();
        assert_eq!(items, vec![Item::new("A", 15), Item::new("B", 5)]);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = create_client(&HttpConfig::default()).unwrap();
        let fetcher = CatalogFetcher::new(client, server.uri());
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = HttpConfig {
            timeout_secs: 1,
            ..HttpConfig::default()
        };
        let fetcher = CatalogFetcher::new(create_client(&config).unwrap(), server.uri());
        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::Http(ref e) if e.is_timeout()));
        assert!(err.is_fetch_failure());
    }
}
