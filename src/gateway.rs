use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::GatewayConfig;

/// Shown to the user whenever no recommendation text could be obtained.
pub const FALLBACK_TEXT: &str = "No tengo recomendaciones, pero intenta de nuevo.";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gateway returned status {0}")]
    Status(u16),
    #[error("Invalid gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can answer a free-text query with recommendation text.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn recommend(&self, query: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    recomendaciones: String,
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One POST of `{"query": ...}`, expecting `{"recomendaciones": "..."}` back.
    pub async fn fetch(&self, query: &str) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { query })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ChatResponse>(&body) {
            Ok(parsed) => {
                debug!(status = status.as_u16(), len = parsed.recomendaciones.len(), "Gateway response");
                Ok(parsed.recomendaciones)
            }
            Err(_) if !status.is_success() => Err(GatewayError::Status(status.as_u16())),
            Err(e) => Err(GatewayError::Decode(e)),
        }
    }
}

/// Asks `source`; any failure is logged and becomes [`FALLBACK_TEXT`].
pub async fn recommend_or_fallback<S>(source: &S, query: &str) -> String
where
    S: RecommendationSource + ?Sized,
{
    match source.recommend(query).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "Recommendation request failed");
            FALLBACK_TEXT.to_string()
        }
    }
}

#[async_trait]
impl RecommendationSource for GatewayClient {
    async fn recommend(&self, query: &str) -> Result<String, GatewayError> {
        self.fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Conversation;

    fn client_for(server: &mockito::Server) -> GatewayClient {
        GatewayClient::new(&GatewayConfig {
            url: format!("{}/chat", server.url()),
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"query": "futuristic action"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"recomendaciones": "Movie A: https://a.com\nMovie B: info"}"#)
            .create_async()
            .await;

        let text = client_for(&server).fetch("futuristic action").await.unwrap();
        assert_eq!(text, "Movie A: https://a.com\nMovie B: info");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_field_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch("drama").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch("drama").await.unwrap_err();
        assert!(matches!(err, GatewayError::Status(500)));
        assert_eq!(recommend_or_fallback(&client, "drama").await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_falls_back() {
        let client = GatewayClient::new(&GatewayConfig {
            url: "http://127.0.0.1:1/chat".to_string(),
            timeout_secs: Some(2),
        })
        .unwrap();

        let err = client.fetch("futuristic action").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
        assert_eq!(
            recommend_or_fallback(&client, "futuristic action").await,
            "No tengo recomendaciones, pero intenta de nuevo."
        );
    }

    #[tokio::test]
    async fn test_silent_gateway_times_out_to_fallback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = GatewayClient::new(&GatewayConfig {
            url: format!("http://{}/chat", addr),
            timeout_secs: Some(1),
        })
        .unwrap();

        let mut conv = Conversation::new();
        conv.submit_name("Ana");
        assert!(conv.submit_description("futuristic action", &client).await);
        assert_eq!(conv.messages().len(), 3);
        assert_eq!(
            conv.messages().last().map(|m| m.text.as_str()),
            Some("No tengo recomendaciones, pero intenta de nuevo.")
        );
    }
}
