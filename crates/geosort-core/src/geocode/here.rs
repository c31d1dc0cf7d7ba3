//! HERE reverse geocoding client.
//!
//! `GET /v1/revgeocode?apiKey=…&at=<lat>,<lon>&lang=…&limit=…` answers with
//! `{"items": [{"address": {"city": "…"}}]}`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::GeocodingConfig;
use crate::error::PipelineError;
use crate::types::{Coordinates, Locality};

use super::provider::ReverseGeocoder;

/// HERE Geocoding & Search reverse geocoder.
pub struct HereGeocoder {
    api_key: String,
    endpoint: String,
    language: String,
    limit: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl HereGeocoder {
    pub fn new(config: &GeocodingConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            limit: config.result_limit,
            timeout: Duration::from_millis(config.timeout_ms),
            client: reqwest::Client::new(),
        }
    }
}

// --- Response types ---
// Every level is optional so an unexpected shape degrades to "no locality"
// instead of a parse failure.

#[derive(Deserialize)]
struct RevGeocodeResponse {
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    address: Option<Address>,
}

#[derive(Deserialize)]
struct Address {
    city: Option<String>,
}

/// Extract the first result's city from a response body.
pub fn parse_locality(body: &[u8], coordinates: &Coordinates) -> Result<Locality, PipelineError> {
    let invalid = |message: String| PipelineError::InvalidLocation {
        coordinates: coordinates.to_string(),
        message,
    };

    let response: RevGeocodeResponse = serde_json::from_slice(body)
        .map_err(|e| invalid(format!("unexpected response shape: {e}")))?;

    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| invalid("no results".to_string()))?;
    let address = item
        .address
        .ok_or_else(|| invalid("result has no address".to_string()))?;
    let city = address
        .city
        .ok_or_else(|| invalid("address has no city".to_string()))?;

    Locality::new(&city).ok_or_else(|| invalid("city is blank".to_string()))
}

#[async_trait]
impl ReverseGeocoder for HereGeocoder {
    fn name(&self) -> &str {
        "here"
    }

    async fn locate(&self, coordinates: &Coordinates) -> Result<Locality, PipelineError> {
        let at = coordinates.to_string();
        let limit = self.limit.to_string();

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("at", at.as_str()),
                ("lang", self.language.as_str()),
                ("limit", limit.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            // The request URL carries the API key; keep it out of messages
            .map_err(|e| PipelineError::Service {
                message: format!("HERE request failed: {}", e.without_url()),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Service {
                message: format!("HERE HTTP {status}: {}", text.trim()),
                status_code: Some(status.as_u16()),
            });
        }

        let body = resp.bytes().await.map_err(|e| PipelineError::Service {
            message: format!("Failed to read HERE response: {}", e.without_url()),
            status_code: None,
        })?;

        let locality = parse_locality(&body, coordinates)?;
        tracing::trace!("HERE resolved {coordinates} to {locality}");
        Ok(locality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn paris() -> Coordinates {
        Coordinates::new(48.85667, 2.35222)
    }

    #[test]
    fn test_parse_locality_city() {
        let body = br#"{"items":[{"title":"Rue de Rivoli","address":{"label":"x","city":"Paris","countryCode":"FRA"}}]}"#;
        assert_eq!(parse_locality(body, &paris()).unwrap().as_str(), "Paris");
    }

    #[test]
    fn test_parse_locality_takes_first_item() {
        let body = br#"{"items":[{"address":{"city":"Paris"}},{"address":{"city":"Lyon"}}]}"#;
        assert_eq!(parse_locality(body, &paris()).unwrap().as_str(), "Paris");
    }

    #[test]
    fn test_parse_locality_structural_failures_are_invalid_location() {
        let cases: [&[u8]; 7] = [
            br#"{"items":[]}"#,
            br#"{}"#,
            br#"{"items":[{}]}"#,
            br#"{"items":[{"address":{"county":"Somewhere"}}]}"#,
            br#"{"items":[{"address":{"city":"  "}}]}"#,
            br#"{"items":"nope"}"#,
            b"<html>oops</html>",
        ];
        for body in cases {
            let err = parse_locality(body, &paris()).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidLocation { .. }),
                "{}: {err:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    /// Serve exactly one HTTP response and hand back the request head.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}/v1/revgeocode"), rx)
    }

    fn client(endpoint: String) -> HereGeocoder {
        let config = GeocodingConfig {
            endpoint,
            timeout_ms: 5000,
            ..GeocodingConfig::default()
        };
        HereGeocoder::new(&config, "test-key")
    }

    #[tokio::test]
    async fn test_locate_sends_expected_query() {
        let (url, request) =
            serve_once("200 OK", r#"{"items":[{"address":{"city":"Paris"}}]}"#).await;

        let locality = client(url).locate(&paris()).await.unwrap();
        assert_eq!(locality.as_str(), "Paris");

        let head = request.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("GET /v1/revgeocode?"));
        assert!(request_line.contains("apiKey=test-key"));
        assert!(request_line.contains("at=48.85667%2C2.35222"));
        assert!(request_line.contains("lang=en-US"));
        assert!(request_line.contains("limit=1"));
    }

    #[tokio::test]
    async fn test_locate_empty_items_is_invalid_location() {
        let (url, _request) = serve_once("200 OK", r#"{"items": []}"#).await;
        let err = client(url).locate(&paris()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLocation { .. }));
    }

    #[tokio::test]
    async fn test_locate_http_error_is_service_error() {
        let (url, _request) =
            serve_once("503 Service Unavailable", r#"{"error":"busy"}"#).await;
        let err = client(url).locate(&paris()).await.unwrap_err();
        match err {
            PipelineError::Service { status_code, .. } => assert_eq!(status_code, Some(503)),
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_locate_connection_refused_is_service_error() {
        // Bind then drop to get a port nobody is listening on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/v1/revgeocode"))
            .locate(&paris())
            .await
            .unwrap_err();
        match err {
            PipelineError::Service {
                status_code,
                message,
            } => {
                assert_eq!(status_code, None);
                assert!(!message.contains("test-key"));
            }
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_locate_hung_server_times_out_as_service_error() {
        // Accepts the connection and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = GeocodingConfig {
            endpoint: format!("http://{addr}/v1/revgeocode"),
            timeout_ms: 200,
            ..GeocodingConfig::default()
        };
        let started = std::time::Instant::now();
        let err = HereGeocoder::new(&config, "test-key")
            .locate(&paris())
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(
            err,
            PipelineError::Service {
                status_code: None,
                ..
            }
        ));
    }
}
