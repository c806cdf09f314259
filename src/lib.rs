pub mod error;
pub mod config;
pub mod prompt;
pub mod signer;
pub mod request;
pub mod assembler;
pub mod providers;
pub mod client;
pub mod backend;
pub mod report;
use serde::{Deserialize, Serialize};

pub use backend::SummaryBackend;
pub use client::{strip_code_fence, SummaryClient};
pub use config::SummaryConfig;
pub use error::Error;
pub use report::ReportFields;

/*

spark-summary turns free-form work notes into the fields of a yearly
summary report by asking a hosted language model for a JSON answer.

spark-summary/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and backend channel types
│   ├── error.rs        # Error kinds shared by every transport
│   ├── config.rs       # Environment / .env configuration
│   ├── prompt.rs       # Instruction text around the user's notes
│   ├── signer.rs       # HMAC-SHA256 signing for the socket endpoint
│   ├── request.rs      # Wire envelopes
│   ├── assembler.rs    # Streamed fragment reassembly
│   ├── providers/
│   │   ├── mod.rs      # Transport trait and selection
│   │   ├── streaming.rs
│   │   └── unary.rs
│   ├── client.rs       # SummaryClient facade, fence stripping
│   ├── backend.rs      # Task-owning handle
│   └── report.rs       # Typed report fields
└── tests/

*/

/// SUMMARY BACKEND INTERFACE:

// ===== Summarize =====

pub type SummarizeReply = Result<String, crate::error::Error>;
pub type SummarizeReplySender
  = tokio::sync::mpsc::UnboundedSender<SummarizeReply>;

pub struct SummarizeArgs
{   pub text: String
  , pub reply: SummarizeReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== SummaryHand (sender side) =====

pub struct SummaryHand
{   pub summarize_tx
      : tokio::sync::mpsc::UnboundedSender<SummarizeArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== SummaryFoot (receiver side) =====

pub struct SummaryFoot
{   pub summarize_rx
      : tokio::sync::mpsc::UnboundedReceiver<SummarizeArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// SUMMARY STRUCTURES:

/// Wire protocol used to reach the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Protocol
{   /// Request/response over HTTPS with a bearer credential
    #[default]
    Http
  , /// Streamed fragments over a signed socket connection
    WebSocket
}

impl std::str::FromStr for Protocol
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_uppercase().as_str()
        {   "HTTP" => Ok(Protocol::Http)
          , "WEBSOCKET" => Ok(Protocol::WebSocket)
          , other => Err(crate::error::Error::Configuration(
              format!("unsupported protocol: {}", other)
            ))
        }
    }
}
