//! Wire envelopes for both transports

use serde::{Deserialize, Serialize};

/// One role-tagged conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// System instruction followed by the built prompt.
/// Fresh per call, no conversation memory.
pub fn summary_turns(user_text: &str) -> Vec<ChatMessage>
{   vec![
      ChatMessage::system(crate::prompt::SYSTEM_INSTRUCTION)
    , ChatMessage::user(crate::prompt::build(user_text))
    ]
}

// ===== Streaming envelope =====

#[derive(Debug, Clone, Serialize)]
pub struct StreamRequest
{   pub header: StreamRequestHeader
  , pub parameter: StreamParameter
  , pub payload: StreamRequestPayload
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamRequestHeader
{   pub app_id: String
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamParameter
{   pub chat: ChatParameter
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatParameter
{   pub domain: String
  , pub temperature: f32
  , pub max_tokens: u32
  , pub top_k: u32
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamRequestPayload
{   pub message: StreamMessage
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamMessage
{   pub text: Vec<ChatMessage>
}

impl StreamRequest
{   pub fn new(
      app_id: &str
    , domain: &str
    , sampling: &crate::config::SamplingConfig
    , messages: Vec<ChatMessage>
    ) -> Self
    {   StreamRequest
        {   header: StreamRequestHeader
            {   app_id: app_id.to_string()
            }
          , parameter: StreamParameter
            {   chat: ChatParameter
                {   domain: domain.to_string()
                  , temperature: sampling.temperature
                  , max_tokens: sampling.max_tokens
                  , top_k: sampling.top_k
                }
            }
          , payload: StreamRequestPayload
            {   message: StreamMessage
                {   text: messages
                }
            }
        }
    }
}

/// Value of `payload.choices.status` in a streamed fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentStatus
{   Start
  , Continuing
  , Final
}

impl FragmentStatus
{   pub fn from_code(code: i64) -> Option<Self>
    {   match code
        {   0 => Some(FragmentStatus::Start)
          , 1 => Some(FragmentStatus::Continuing)
          , 2 => Some(FragmentStatus::Final)
          , _ => None
        }
    }
}

// ===== HTTP envelope =====

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub user: String
  , pub messages: Vec<ChatMessage>
  , pub stream: bool
  , pub temperature: f32
  , pub top_p: f32
  , pub max_tokens: u32
}

impl ChatCompletionRequest
{   pub fn new(
      http: &crate::config::HttpConfig
    , sampling: &crate::config::SamplingConfig
    , messages: Vec<ChatMessage>
    ) -> Self
    {   ChatCompletionRequest
        {   model: http.model.clone()
          , user: http.user.clone()
          , messages
          , stream: false
          , temperature: sampling.temperature
          , top_p: sampling.top_p
          , max_tokens: sampling.max_tokens
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub code: i64
  , #[serde(default)]
    pub message: Option<String>
  , #[serde(default)]
    pub choices: Vec<CompletionChoice>
  , #[serde(default)]
    pub usage: Option<Usage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice
{   #[serde(default)]
    pub message: Option<CompletionMessage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage
{   #[serde(default)]
    pub content: Option<String>
}

/// Token accounting reported by the HTTP endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Usage
{   #[serde(default)]
    pub prompt_tokens: u64
  , #[serde(default)]
    pub completion_tokens: u64
  , #[serde(default)]
    pub total_tokens: u64
}
