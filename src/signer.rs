//! HMAC-SHA256 request signing for the streaming endpoint
//!
//! The server checks a signature over
//! `"host: <host>\ndate: <date>\nGET <path> HTTP/1.1"` keyed with the API
//! secret. The signature, the API key, and the list of signed headers are
//! packed into an authorization string which is base64-encoded again and
//! passed as a query parameter together with `host` and `date`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::{debug, error};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// RFC 1123 date layout the server expects
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const ALGORITHM: &str = "hmac-sha256";
pub const SIGNED_HEADERS: &str = "host date request-line";

/// Authentication parameters for one connection attempt.
/// Valid for a short server-side window; build a new one per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTarget
{   pub host: String
  , pub date: String
  , pub authorization: String
}

impl SignedTarget
{   /// Append `host`, `date` and `authorization` to `endpoint`
    pub fn url(&self, endpoint: &str)
      -> Result<url::Url, crate::error::Error>
    {   url::Url::parse_with_params(
          endpoint,
          &[
            ("host", self.host.as_str())
          , ("date", self.date.as_str())
          , ("authorization", self.authorization.as_str())
          ]
        ).map_err(|e| {
          error!("Invalid streaming endpoint {}: {}", endpoint, e);
          crate::error::Error::Configuration(
            format!("invalid streaming endpoint {}: {}", endpoint, e)
          )
        })
    }
}

/// Render a timestamp in the signed date format
pub fn http_date(at: DateTime<Utc>) -> String
{   at.format(DATE_FORMAT).to_string()
}

/// Sign a `GET <path>` request against `host` at the given instant
pub fn sign(
  host: &str
, path: &str
, api_key: &str
, api_secret: &str
, at: DateTime<Utc>
) -> Result<SignedTarget, crate::error::Error>
{   let date = http_date(at);
    let canonical = format!(
      "host: {}\ndate: {}\nGET {} HTTP/1.1",
      host, date, path
    );

    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
      .map_err(|e| {
        error!("Cannot key HMAC: {}", e);
        crate::error::Error::Signing(e.to_string())
      })?;
    mac.update(canonical.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let authorization_origin = format!(
      "api_key=\"{}\", algorithm=\"{}\", headers=\"{}\", signature=\"{}\"",
      api_key, ALGORITHM, SIGNED_HEADERS, signature
    );
    debug!("Signed request for {}{} at {}", host, path, date);

    Ok(SignedTarget
    {   host: host.to_string()
      , date
      , authorization: STANDARD.encode(authorization_origin)
    })
}

/// Sign with the current wall-clock time
pub fn sign_now(
  host: &str
, path: &str
, api_key: &str
, api_secret: &str
) -> Result<SignedTarget, crate::error::Error>
{   sign(host, path, api_key, api_secret, Utc::now())
}
