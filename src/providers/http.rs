//! HTTP-backed provider: one outbound call per invocation

use super::error::ProviderError;
use super::traits::*;
use crate::network::HttpClient;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Runs a [`Backend`] over the shared [`HttpClient`].
///
/// Enforces the call timeout, maps transport failures and non-2xx statuses
/// to [`ProviderError`]s, and hands 2xx bodies to the backend parser.
pub struct HttpProvider<B> {
    backend: B,
    client: HttpClient,
}

impl<B: Backend> HttpProvider<B> {
    pub fn new(backend: B, client: HttpClient) -> Self {
        Self { backend, client }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: Backend> Provider for HttpProvider<B> {
    fn kind(&self) -> ProviderKind {
        self.backend.kind()
    }

    fn about(&self) -> ProviderAbout {
        self.backend.about()
    }

    async fn invoke(
        &self,
        params: &RequestParams,
        timeout: Duration,
    ) -> Result<ProviderOutput, ProviderError> {
        let kind = self.backend.kind();
        let request = self.backend.request(params)?;
        let start = Instant::now();

        debug!(provider = %kind, url = %request.url, ?timeout, "sending provider request");

        // The outer timeout also bounds body download; dropping the inner
        // future aborts the request and releases the connection.
        let response = match tokio::time::timeout(
            timeout,
            self.client.execute_with_timeout(request, timeout),
        )
        .await
        {
            Err(_) => return Err(ProviderError::timeout(kind, timeout)),
            Ok(Err(e)) => return Err(ProviderError::from_transport(kind, e, timeout)),
            Ok(Ok(response)) => response,
        };

        debug!(
            provider = %kind,
            status = response.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "provider responded"
        );

        if !response.is_success() {
            return Err(ProviderError::from_status(kind, response.status, &response.text));
        }

        self.backend.response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ErrorKind, Serp, Tavily};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn tavily(server: &MockServer) -> HttpProvider<Tavily> {
        let backend = Tavily::new("tvly-test").with_base_url(server.uri());
        HttpProvider::new(backend, HttpClient::new().unwrap())
    }

    fn serp(server: &MockServer) -> HttpProvider<Serp> {
        let backend = Serp::new("serp-test").with_base_url(format!("{}/search", server.uri()));
        HttpProvider::new(backend, HttpClient::new().unwrap())
    }

    #[tokio::test]
    async fn test_tavily_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(
                json!({"api_key": "tvly-test", "query": "rust async", "max_results": 3}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Rust async uses futures.",
                "results": [
                    {"title": "Async Book", "url": "https://rust-lang.github.io/async-book/", "content": "Futures", "score": 0.9}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = tavily(&server)
            .invoke(&RequestParams::new("rust async", 3), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(output.results.len(), 1);
        assert_eq!(output.summary.as_deref(), Some("Rust async uses futures."));
    }

    #[tokio::test]
    async fn test_serp_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("api_key", "serp-test"))
            .and(query_param("q", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [
                    {"position": 1, "title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "Rust"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = serp(&server)
            .invoke(&RequestParams::new("rust", 10), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(output.results.len(), 1);
    }

    #[tokio::test]
    async fn test_auth_and_rate_limit_are_distinct() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid key"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let params = RequestParams::new("q", 5);

        let err = tavily(&server).invoke(&params, TIMEOUT).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthFailed);
        assert_eq!(err.provider, ProviderKind::Tavily);
        assert!(err.message.contains("invalid key"));

        let err = serp(&server).invoke(&params, TIMEOUT).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert_eq!(err.provider, ProviderKind::Serp);
    }

    #[tokio::test]
    async fn test_server_error_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = tavily(&server)
            .invoke(&RequestParams::new("q", 5), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert!(err.message.contains("503"));
        assert!(err.message.contains("upstream down"));
    }

    #[tokio::test]
    async fn test_empty_200_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = tavily(&server)
            .invoke(&RequestParams::new("q", 5), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let start = Instant::now();
        let err = tavily(&server)
            .invoke(&RequestParams::new("q", 5), Duration::from_millis(200))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop a server so the port is very likely closed
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let backend = Tavily::new("k").with_base_url(uri);
        let provider = HttpProvider::new(backend, HttpClient::new().unwrap());

        let err = provider
            .invoke(&RequestParams::new("q", 5), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let backend = Serp::new("serp-secret-key").with_base_url(format!("{}/search", uri));
        let provider = HttpProvider::new(backend, HttpClient::new().unwrap());

        let err = provider
            .invoke(&RequestParams::new("q", 5), TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NetworkError);
        assert!(!err.message.contains("serp-secret-key"));
        assert!(!err.to_string().contains("api_key"));
    }
}
