use crate::core::error::BotError;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

/// Thin reqwest wrapper shared by every remote API the bot talks to.
#[derive(Clone)]
pub struct BaseApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl BaseApiClient {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub async fn send_request<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, BotError> {
        let request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(payload);

        Ok(self.decorate(request).send().await?)
    }

    pub async fn send_multipart(&self, path: &str, form: Form) -> Result<Response, BotError> {
        let request = self.client.post(self.url(path)).multipart(form);
        Ok(self.decorate(request).send().await?)
    }
}
