//! Transport variants for the summary model

pub mod streaming;
pub mod unary;

// Re-export for convenience
pub use streaming::StreamingClient;
pub use unary::UnaryClient;

use async_trait::async_trait;

/// Send one prompt, get the raw model text back.
/// Each call is independent; no state is shared between calls.
#[async_trait]
pub trait Transport: Send + Sync
{   async fn send_request(&self, user_text: &str)
      -> Result<String, crate::error::Error>;

    fn protocol(&self) -> crate::Protocol;
}

/// Build the variant selected by `config`.
/// Fails with a configuration error before any network attempt.
pub fn from_config(config: &crate::config::SummaryConfig)
  -> Result<Box<dyn Transport>, crate::error::Error>
{   let credentials = config.credentials()?;
    match (config.protocol, credentials)
    {   (crate::Protocol::Http, crate::config::Credentials::Bearer(token)) => {
          let client: Box<dyn Transport> = Box::new(UnaryClient::new(
            token,
            config.http.clone(),
            config.sampling.clone()
          )?);
          Ok(client)
        }
      , ( crate::Protocol::WebSocket
        , crate::config::Credentials::Signed { app_id, api_key, api_secret }
        ) => {
          let client: Box<dyn Transport> = Box::new(StreamingClient::new(
            streaming::SigningKeys { app_id, api_key, api_secret },
            config.streaming.clone(),
            config.sampling.clone()
          ));
          Ok(client)
        }
      , (protocol, _) => {
          Err(crate::error::Error::Configuration(format!(
            "credentials do not match protocol {:?}", protocol
          )))
        }
    }
}
