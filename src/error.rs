use std::fmt;

/// Error type for every summarize call, whichever transport is active.
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Credentials or settings are missing or invalid
    Configuration(String)
  , /// Request signing failed
    Signing(String)
  , /// Connection refused, reset, or dropped
    Transport(String)
  , /// No terminal answer within the configured ceiling
    Timeout(u64)
  , /// Non-success HTTP status
    Http
    {   status: u16
      , body: String
    }
  , /// Malformed or structurally incomplete server message
    Protocol(String)
  , /// Server answered with a well-formed error envelope
    Api
    {   code: i64
      , message: String
    }
  , /// Completion reached but no content was accumulated
    EmptyResponse
  , /// Caller handed in blank text
    EmptyInput
  , /// Returned report text is not the expected JSON
    ParseError(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Code or status carried by the error, if the server sent one
    pub fn code(&self) -> Option<i64>
    {   match self
        {   Error::Api { code, .. } => Some(*code)
          , Error::Http { status, .. } => Some(i64::from(*status))
          , _ => None
        }
    }

    /// Whether the failure happened below the application protocol
    pub fn is_transport(&self) -> bool
    {   matches!(
          self,
          Error::Transport(_) | Error::Timeout(_) | Error::Http { .. }
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Configuration(msg) => {
              write!(f, "Configuration error: {}", msg)
            }
          , Error::Signing(msg) => {
              write!(f, "Signing error: {}", msg)
            }
          , Error::Transport(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , Error::Timeout(secs) => {
              write!(f, "Request timed out after {}s", secs)
            }
          , Error::Http { status, body } => {
              if body.is_empty()
              {   write!(f, "HTTP request failed with status {}", status)
              } else
              {   write!(f,
                    "HTTP request failed with status {}: {}",
                    status, body
                  )
              }
            }
          , Error::Protocol(msg) => {
              write!(f, "Protocol error: {}", msg)
            }
          , Error::Api { code, message } => {
              write!(f,
                "API request failed, code: {}, message: {}",
                code, message
              )
            }
          , Error::EmptyResponse => {
              write!(f, "Model returned no content")
            }
          , Error::EmptyInput => {
              write!(f, "Input text is empty")
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
