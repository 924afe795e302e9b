use super::{ImagePayload, ImageProvider};
use crate::core::error::BotError;
use crate::providers::base_client::BaseApiClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u32,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAIImageProvider {
    client: BaseApiClient,
    model: String,
}

impl OpenAIImageProvider {
    pub fn with_endpoint(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client: BaseApiClient::new(endpoint, Some(api_key)),
            model,
        }
    }
}

/// Maps a non-success HTTP answer onto the error taxonomy, keeping the
/// provider's own message when the body carries one.
fn error_from_status(status: StatusCode, body: &str) -> BotError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {}: {}", status.as_u16(), body.trim()));

    if status == StatusCode::TOO_MANY_REQUESTS {
        BotError::RateLimited(message)
    } else {
        BotError::Api(message)
    }
}

fn parse_payload(body: &str) -> Result<ImagePayload, BotError> {
    let parsed: ImageGenerationResponse = serde_json::from_str(body)?;
    Ok(parsed
        .data
        .into_iter()
        .next()
        .map(|d| ImagePayload {
            url: d.url.filter(|u| !u.is_empty()),
            b64_json: d.b64_json.filter(|b| !b.is_empty()),
        })
        .unwrap_or_default())
}

#[async_trait]
impl ImageProvider for OpenAIImageProvider {
    async fn generate_image(
        &self,
        prompt: &str,
        size: &str,
        count: u32,
    ) -> Result<ImagePayload, BotError> {
        let payload = ImageGenerationRequest {
            model: &self.model,
            prompt,
            size,
            n: count.max(1),
        };

        let response = self
            .client
            .send_request("images/generations", &payload)
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(error_from_status(status, &body));
        }

        parse_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let req = ImageGenerationRequest {
            model: "gpt-image-1",
            prompt: "a red bicycle",
            size: "1024x1024",
            n: 1,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-image-1",
                "prompt": "a red bicycle",
                "size": "1024x1024",
                "n": 1
            })
        );
    }

    #[test]
    fn parses_url_and_b64_variants() {
        let url = parse_payload(r#"{"data":[{"url":"https://img/1.png"}]}"#).unwrap();
        assert_eq!(url.url.as_deref(), Some("https://img/1.png"));
        assert!(url.b64_json.is_none());

        let b64 = parse_payload(r#"{"created":1,"data":[{"b64_json":"aGk="}]}"#).unwrap();
        assert!(b64.url.is_none());
        assert_eq!(b64.b64_json.as_deref(), Some("aGk="));

        let empty = parse_payload(r#"{"data":[]}"#).unwrap();
        assert_eq!(empty, ImagePayload::default());
    }

    #[test]
    fn malformed_body_is_serialization_error() {
        assert!(matches!(
            parse_payload("<html>oops</html>"),
            Err(BotError::Serialization(_))
        ));
    }

    #[test]
    fn error_bodies_keep_provider_message() {
        let body = r#"{"error":{"message":"rate limit exceeded","type":"requests"}}"#;
        let err = error_from_status(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, BotError::RateLimited(_)));
        assert_eq!(err.detail(), "rate limit exceeded");

        let err = error_from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, BotError::Api(_)));
        assert_eq!(err.detail(), "HTTP 502: upstream down");
    }
}
