use log::{debug, info, error};
use crate::providers::Transport;

/// Single entry point for summarizing text.
///
/// The transport variant is chosen once, at construction; callers never
/// branch on protocol.
pub struct SummaryClient
{   transport: Box<dyn Transport>
  , strip_fences: bool
}

impl SummaryClient
{   /// Build the client selected by `config`.
    /// Missing credentials fail here, before any network call.
    pub fn new(config: &crate::config::SummaryConfig)
      -> Result<Self, crate::error::Error>
    {   debug!("Creating SummaryClient for {:?}", config.protocol);
        let transport = crate::providers::from_config(config)
          .map_err(|e| {
            error!("Cannot create summary client: {}", e);
            e
          })?;
        info!("Summary client ready, protocol {:?}", transport.protocol());
        Ok(Self::with_transport(transport))
    }

    /// Wrap an already constructed transport
    pub fn with_transport(transport: Box<dyn Transport>) -> Self
    {   SummaryClient
        {   transport
          , strip_fences: true
        }
    }

    /// Toggle removal of a markdown code fence around the answer
    pub fn strip_fences(mut self, enabled: bool) -> Self
    {   self.strip_fences = enabled;
        self
    }

    pub fn protocol(&self) -> crate::Protocol
    {   self.transport.protocol()
    }

    /// Send `user_text` to the model and return its JSON text.
    /// Either the full answer or an error, never a partial result.
    pub async fn summarize(&self, user_text: &str)
      -> Result<String, crate::error::Error>
    {   if user_text.trim().is_empty()
        {   error!("Refusing to summarize empty input");
            return Err(crate::error::Error::EmptyInput);
        }
        debug!(
          "Summarizing {} chars via {:?}",
          user_text.chars().count(),
          self.transport.protocol()
        );

        let raw = self.transport.send_request(user_text).await?;
        if self.strip_fences
        {   let stripped = strip_code_fence(&raw);
            if stripped.len() != raw.len()
            {   debug!("Removed markdown code fence from response");
            }
            Ok(stripped.to_string())
        } else
        {   Ok(raw)
        }
    }

    /// Summarize and parse the answer into report fields.
    /// Fences are only removed when `strip_fences` is on.
    pub async fn summarize_report(&self, user_text: &str)
      -> Result<crate::report::ReportFields, crate::error::Error>
    {   let text = self.summarize(user_text).await?;
        crate::report::ReportFields::parse(&text)
    }
}

/// Remove a markdown fence wrapping the whole text.
///
/// After trimming, the text must start and end with three backticks. A
/// fence opening with `json` loses those four characters whatever follows
/// them. Otherwise the first line of a multi-line block may carry a single
/// word language tag. Anything else, including fences surrounded by prose,
/// is returned unchanged.
pub fn strip_code_fence(text: &str) -> &str
{   let trimmed = text.trim();
    if trimmed.len() < 6
    {   return text;
    }
    let inner = match trimmed
      .strip_prefix("```")
      .and_then(|rest| rest.strip_suffix("```"))
    {   Some(inner) => inner
      , None => return text
    };

    if let Some(body) = inner.strip_prefix("json")
    {   return body.trim();
    }

    match inner.split_once('\n')
    {   Some((tag, body)) => {
          let tag_ok = tag.trim().chars().all(|c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_'
          });
          if tag_ok { body.trim() } else { text }
        }
      , None => inner.trim()
    }
}
