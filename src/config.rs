//! Configuration for the summary client, resolved once at startup

use std::fmt;
use serde::{Deserialize, Serialize};
use log::{debug, warn};

pub const DEFAULT_HOST: &str = "spark-api.xf-yun.com";
pub const DEFAULT_API_PATH: &str = "/v3.5/chat";
pub const DEFAULT_DOMAIN: &str = "generalv3.5";
pub const DEFAULT_HTTP_BASE_URL: &str
  = "https://spark-api-open.xf-yun.com/v2";
pub const DEFAULT_MODEL: &str = "x1";
pub const DEFAULT_USER: &str = "user_123456";

/// Streaming (socket) endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig
{   /// Application identifier sent in the envelope header
    pub app_id: Option<String>
  , /// Key embedded in the signed authorization
    pub api_key: Option<String>
  , /// Secret used as the HMAC key
    pub api_secret: Option<String>
  , pub host: String
  , pub path: String
  , /// Model domain, e.g. "generalv3.5"
    pub domain: String
  , /// "wss" in production, "ws" for local endpoints
    pub scheme: String
  , /// Ceiling for one whole exchange in seconds
    pub timeout_secs: u64
}

impl Default for StreamingConfig
{   fn default() -> Self
    {   StreamingConfig
        {   app_id: None
          , api_key: None
          , api_secret: None
          , host: DEFAULT_HOST.to_string()
          , path: DEFAULT_API_PATH.to_string()
          , domain: DEFAULT_DOMAIN.to_string()
          , scheme: "wss".to_string()
          , timeout_secs: 120
        }
    }
}

impl StreamingConfig
{   /// Endpoint without authentication parameters
    pub fn endpoint(&self) -> String
    {   format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// Request/response (HTTP) endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig
{   /// Bearer credential
    pub api_password: Option<String>
  , pub base_url: String
  , pub model: String
  , /// Opaque end-user identifier sent with every request
    pub user: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl Default for HttpConfig
{   fn default() -> Self
    {   HttpConfig
        {   api_password: None
          , base_url: DEFAULT_HTTP_BASE_URL.to_string()
          , model: DEFAULT_MODEL.to_string()
          , user: DEFAULT_USER.to_string()
          , timeout_secs: 60
        }
    }
}

/// Sampling parameters shared by both transports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig
{   pub temperature: f32
  , pub max_tokens: u32
  , /// Streaming endpoint only
    pub top_k: u32
  , /// HTTP endpoint only
    pub top_p: f32
}

impl Default for SamplingConfig
{   fn default() -> Self
    {   SamplingConfig
        {   temperature: 0.5
          , max_tokens: 4096
          , top_k: 4
          , top_p: 0.95
        }
    }
}

/// Summary client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig
{   pub protocol: crate::Protocol
  , pub streaming: StreamingConfig
  , pub http: HttpConfig
  , pub sampling: SamplingConfig
}

/// Resolved secret material for the selected protocol
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials
{   Bearer(String)
  , Signed
    {   app_id: String
      , api_key: String
      , api_secret: String
    }
}

impl fmt::Debug for Credentials
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Credentials::Bearer(_) => {
              write!(f, "Bearer(***)")
            }
          , Credentials::Signed { app_id, .. } => {
              write!(f, "Signed {{ app_id: {}, api_key: ***, api_secret: *** }}", app_id)
            }
        }
    }
}

impl SummaryConfig
{   /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded environment from {}", path.display())
          , Err(e) if e.not_found() => debug!("No .env file found")
          , Err(e) => warn!("Ignoring unreadable .env file: {}", e)
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };
        let mut config = SummaryConfig::default();

        if let Some(protocol) = get("API_PROTOCOL")
        {   config.protocol = protocol.parse()?;
        }

        let streaming = &mut config.streaming;
        streaming.app_id = get("SPARK_APPID");
        streaming.api_key = get("SPARK_APIKEY");
        streaming.api_secret = get("SPARK_APISECRET");
        if let Some(v) = get("SPARK_HOST") { streaming.host = v; }
        if let Some(v) = get("SPARK_API_PATH") { streaming.path = v; }
        if let Some(v) = get("SPARK_DOMAIN") { streaming.domain = v; }
        if let Some(v) = get("SPARK_WS_SCHEME") { streaming.scheme = v; }
        if let Some(v) = get("SPARK_STREAM_TIMEOUT_SECS")
        {   streaming.timeout_secs
              = parse_secs("SPARK_STREAM_TIMEOUT_SECS", &v)?;
        }

        let http = &mut config.http;
        http.api_password = get("SPARK_HTTP_API_PASSWORD");
        if let Some(v) = get("SPARK_HTTP_BASE_URL") { http.base_url = v; }
        if let Some(v) = get("SPARK_MODEL") { http.model = v; }
        if let Some(v) = get("SPARK_HTTP_USER") { http.user = v; }
        if let Some(v) = get("SPARK_HTTP_TIMEOUT_SECS")
        {   http.timeout_secs
              = parse_secs("SPARK_HTTP_TIMEOUT_SECS", &v)?;
        }

        debug!("Configuration resolved for protocol {:?}", config.protocol);
        Ok(config)
    }

    /// Resolve the credentials the selected protocol needs
    pub fn credentials(&self)
      -> Result<Credentials, crate::error::Error>
    {   match self.protocol
        {   crate::Protocol::Http => {
              let password = required(
                &self.http.api_password,
                "SPARK_HTTP_API_PASSWORD"
              )?;
              Ok(Credentials::Bearer(password))
            }
          , crate::Protocol::WebSocket => {
              Ok(Credentials::Signed
              {   app_id: required(
                    &self.streaming.app_id, "SPARK_APPID"
                  )?
                , api_key: required(
                    &self.streaming.api_key, "SPARK_APIKEY"
                  )?
                , api_secret: required(
                    &self.streaming.api_secret, "SPARK_APISECRET"
                  )?
              })
            }
        }
    }
}

fn required(value: &Option<String>, name: &str)
  -> Result<String, crate::error::Error>
{   match value.as_deref().map(str::trim)
    {   Some(v) if !v.is_empty() => Ok(v.to_string())
      , _ => Err(crate::error::Error::Configuration(
          format!("{} is not set", name)
        ))
    }
}

fn parse_secs(name: &str, value: &str)
  -> Result<u64, crate::error::Error>
{   value.parse::<u64>()
      .ok()
      .filter(|secs| *secs > 0)
      .ok_or_else(|| {
        crate::error::Error::Configuration(format!(
          "{} must be a positive number of seconds, got {:?}",
          name, value
        ))
      })
}
