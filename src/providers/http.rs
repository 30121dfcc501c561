use crate::core::error::TransportError;
use crate::core::request::{Method, RawRequest, RawResponse, Transport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

/// reqwest-backed transport rooted at the API base URL, e.g.
/// `http://localhost:8000/api/v1`. No client-side timeout or retries.
pub struct HttpTransport {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API base URL: {}", base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .user_agent(concat!("stockview/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(HttpTransport { base_url, client })
    }

    pub fn url_for(&self, request: &RawRequest) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(
        name = "HttpSend",
        skip(self, request),
        fields(method = %request.method, path = %request.path())
    )]
    async fn send(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(request)?;
        debug!("Requesting {}", url);

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::request::ApiRequest;
    use crate::core::stock::{Period, StockCode};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_building() {
        let transport = HttpTransport::new("http://localhost:8000/api/v1/").unwrap();
        let code = StockCode::new("72 03").unwrap();
        let req = ApiRequest::price_series(&code, Some(Period::SixMonths));
        let url = transport.url_for(req.raw()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/stocks/72%2003/prices?period=6m"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpTransport::new("not a url").is_err());
        assert!(HttpTransport::new("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn test_send_returns_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluations"))
            .and(query_param("stock_code", "7203"))
            .and(query_param("period", "1y"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&mock_server.uri()).unwrap();
        let code = StockCode::new("7203").unwrap();
        let req = ApiRequest::request_evaluation(&code, None);
        let response = transport.send(req.raw()).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "missing");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        // Grab a free port and close it again so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{addr}")).unwrap();
        let req = ApiRequest::evaluation_by_id(1);
        let result = transport.send(req.raw()).await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }
}
