use std::time::Duration;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::{debug, trace, error, info};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::assembler::{Progress, ResponseAssembler};
use crate::request::StreamRequest;

type WsStream = tokio_tungstenite::WebSocketStream<
  tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>
>;

/// Identifier, key and secret for the signed endpoint
#[derive(Clone)]
pub struct SigningKeys
{   pub app_id: String
  , pub api_key: String
  , pub api_secret: String
}

/// Client for the streaming socket endpoint.
///
/// Every call signs a fresh target, opens its own connection, and owns one
/// `ResponseAssembler`; nothing is shared between calls.
pub struct StreamingClient
{   keys: SigningKeys
  , streaming: crate::config::StreamingConfig
  , sampling: crate::config::SamplingConfig
}

impl StreamingClient
{   pub fn new(
      keys: SigningKeys
    , streaming: crate::config::StreamingConfig
    , sampling: crate::config::SamplingConfig
    ) -> Self
    {   debug!("Creating StreamingClient for {}", streaming.endpoint());
        StreamingClient
        {   keys
          , streaming
          , sampling
        }
    }

    fn check_keys(&self) -> Result<(), crate::error::Error>
    {   let missing = [
          ("SPARK_APPID", &self.keys.app_id)
        , ("SPARK_APIKEY", &self.keys.api_key)
        , ("SPARK_APISECRET", &self.keys.api_secret)
        ].iter()
          .filter(|(_, v)| v.trim().is_empty())
          .map(|(name, _)| *name)
          .collect::<Vec<_>>();
        if missing.is_empty()
        {   Ok(())
        } else
        {   error!("Missing streaming credentials: {:?}", missing);
            Err(crate::error::Error::Configuration(
              format!("{} not set", missing.join(", "))
            ))
        }
    }

    async fn handle_send_request(&self, user_text: &str)
      -> Result<String, crate::error::Error>
    {   self.check_keys()?;
        let mut assembler = ResponseAssembler::new();
        assembler.connecting();

        let target = crate::signer::sign_now(
          &self.streaming.host,
          &self.streaming.path,
          &self.keys.api_key,
          &self.keys.api_secret
        )?;
        let url = target.url(&self.streaming.endpoint())?;

        let envelope = StreamRequest::new(
          &self.keys.app_id,
          &self.streaming.domain,
          &self.sampling,
          crate::request::summary_turns(user_text)
        );
        let body = serde_json::to_string(&envelope).map_err(|e| {
          error!("Cannot serialize request: {}", e);
          crate::error::Error::Protocol(
            format!("cannot serialize request: {}", e)
          )
        })?;

        debug!(
          "Connecting to {} (input {} chars)",
          self.streaming.endpoint(),
          user_text.chars().count()
        );
        let ceiling = Duration::from_secs(self.streaming.timeout_secs);
        let call = connect_and_exchange(url.as_str(), body, assembler);
        match tokio::time::timeout(ceiling, call).await
        {   Ok(result) => result
          , Err(_) => {
              error!(
                "No completion within {}s",
                self.streaming.timeout_secs
              );
              Err(crate::error::Error::Timeout(self.streaming.timeout_secs))
            }
        }
    }
}

async fn connect_and_exchange(
  url: &str
, body: String
, mut assembler: ResponseAssembler
) -> Result<String, crate::error::Error>
{   match tokio_tungstenite::connect_async(url).await
    {   Ok((ws, _response)) => exchange(ws, body, assembler).await
      , Err(e) => {
          assembler.fail(crate::error::Error::Transport(
            format!("connection failed: {}", e)
          ));
          assembler.finish()
        }
    }
}

/// Send the envelope and read fragments until a terminal state
async fn exchange(
  mut ws: WsStream
, body: String
, mut assembler: ResponseAssembler
) -> Result<String, crate::error::Error>
{   trace!("Sending request: {}", truncate(&body, 200));
    if let Err(e) = ws.send(Message::Text(body)).await
    {   assembler.fail(crate::error::Error::Transport(
          format!("failed to send request: {}", e)
        ));
        let _ = ws.close(None).await;
        return assembler.finish();
    }
    assembler.request_sent();

    loop
    {   let progress = match ws.next().await
        {   Some(Ok(Message::Text(text))) => assembler.push_text(&text)
          , Some(Ok(Message::Binary(bytes))) => {
              match String::from_utf8(bytes)
              {   Ok(text) => assembler.push_text(&text)
                , Err(e) => assembler.fail(crate::error::Error::Protocol(
                    format!("binary fragment is not UTF-8: {}", e)
                  ))
              }
            }
          , Some(Ok(Message::Close(frame))) => {
              debug!("Server closed connection: {:?}", frame);
              assembler.connection_closed()
            }
          , Some(Ok(_)) => Progress::Pending
          , Some(Err(e)) => {
              assembler.fail(crate::error::Error::Transport(
                format!("connection error: {}", e)
              ))
            }
          , None => assembler.connection_closed()
        };

        if progress == Progress::Done
        {   break;
        }
    }

    if let Err(e) = ws.close(None).await
    {   trace!("Close after terminal state: {}", e);
    }

    let result = assembler.finish();
    if let Ok(content) = &result
    {   info!("Received response, {} chars", content.chars().count());
    }
    result
}

fn truncate(text: &str, max_chars: usize) -> &str
{   match text.char_indices().nth(max_chars)
    {   Some((idx, _)) => &text[..idx]
      , None => text
    }
}

#[async_trait]
impl crate::providers::Transport for StreamingClient
{   async fn send_request(&self, user_text: &str)
      -> Result<String, crate::error::Error>
    {   self.handle_send_request(user_text).await
    }

    fn protocol(&self) -> crate::Protocol
    {   crate::Protocol::WebSocket
    }
}
