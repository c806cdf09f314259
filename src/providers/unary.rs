use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, error, info};

use crate::request::{ChatCompletionRequest, ChatCompletionResponse};

const ENDPOINT: &str = "/chat/completions";

/// Single request/response client authenticated with a bearer credential.
/// No retries: one failed attempt surfaces immediately.
pub struct UnaryClient
{   api_password: String
  , http: crate::config::HttpConfig
  , sampling: crate::config::SamplingConfig
  , http_client: reqwest::Client
}

impl UnaryClient
{   pub fn new(
      api_password: String
    , http: crate::config::HttpConfig
    , sampling: crate::config::SamplingConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating UnaryClient for {}", http.base_url);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(http.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Cannot build HTTP client: {}", e);
            crate::error::Error::Configuration(e.to_string())
          })?;
        Ok(UnaryClient
        {   api_password
          , http
          , sampling
          , http_client
        })
    }

    fn url(&self) -> String
    {   format!("{}{}", self.http.base_url.trim_end_matches('/'), ENDPOINT)
    }

    fn map_send_error(&self, e: reqwest::Error) -> crate::error::Error
    {   if e.is_timeout()
        {   error!("Request timed out: {}", e);
            crate::error::Error::Timeout(self.http.timeout_secs)
        } else if e.is_connect()
        {   error!("Connection failed: {}", e);
            crate::error::Error::Transport(
              format!("connection failed: {}", e)
            )
        } else
        {   error!("HTTP error: {}", e);
            crate::error::Error::Transport(e.to_string())
        }
    }

    async fn handle_send_request(&self, user_text: &str)
      -> Result<String, crate::error::Error>
    {   let request = ChatCompletionRequest::new(
          &self.http,
          &self.sampling,
          crate::request::summary_turns(user_text)
        );
        let url = self.url();
        debug!("POST {} (input {} chars)", url, user_text.chars().count());
        trace!("Request body: {:?}", request);

        let response = self.http_client
          .post(&url)
          .header("Authorization", format!("Bearer {}", self.api_password))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        trace!("Response status: {}", status);

        let body = response.text().await
          .map_err(|e| self.map_send_error(e))?;

        if !status.is_success()
        {   let detail = match serde_json::from_str::<serde_json::Value>(&body)
            {   Ok(json) => json.to_string()
              , Err(_) => body
            };
            error!("HTTP request failed, status {}: {}", status, detail);
            return Err(crate::error::Error::Http
            {   status: status.as_u16()
              , body: detail
            });
        }

        let parsed: ChatCompletionResponse
          = serde_json::from_str(&body).map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::Protocol(
              format!("response body is not valid JSON: {}", e)
            )
          })?;

        if parsed.code != 0
        {   let message = parsed.message
              .unwrap_or_else(|| "unknown error".to_string());
            error!("API error {}: {}", parsed.code, message);
            return Err(crate::error::Error::Api
            {   code: parsed.code
              , message
            });
        }

        if let Some(usage) = &parsed.usage
        {   debug!(
              "Token usage: prompt {}, completion {}, total {}",
              usage.prompt_tokens,
              usage.completion_tokens,
              usage.total_tokens
            );
        }

        let choice = parsed.choices.into_iter().next()
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::Protocol(
              "response has no choices".to_string()
            )
          })?;
        let content = choice.message
          .and_then(|m| m.content)
          .ok_or_else(|| {
            error!("Choice has no message content");
            crate::error::Error::Protocol(
              "response is missing message.content".to_string()
            )
          })?;

        info!("Received response, {} chars", content.chars().count());
        Ok(content)
    }
}

#[async_trait]
impl crate::providers::Transport for UnaryClient
{   async fn send_request(&self, user_text: &str)
      -> Result<String, crate::error::Error>
    {   self.handle_send_request(user_text).await
    }

    fn protocol(&self) -> crate::Protocol
    {   crate::Protocol::Http
    }
}
