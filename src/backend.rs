use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::SummaryFoot;

/// Public handle on a task that owns one `SummaryClient`.
///
/// Commands queue on a channel and the task runs them one at a time, so at
/// most one remote exchange is in flight per backend.
pub struct SummaryBackend
{   hand: crate::SummaryHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl SummaryBackend
{   /// Spawn the task around an already constructed client.
    /// Returns immediately.
    pub fn new(client: crate::client::SummaryClient) -> Self
    {   debug!("Creating SummaryBackend with task ownership");

        let (summarize_tx, summarize_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::SummaryHand
        {   summarize_tx
          , kill_process_tx
        };

        let foot = crate::SummaryFoot
        {   summarize_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, client).await
        });

        SummaryBackend
        {   hand
          , _task_handle
        }
    }

    /// Build the client from configuration, then spawn the task
    pub fn from_config(config: &crate::config::SummaryConfig)
      -> Result<Self, crate::error::Error>
    {   let client = crate::client::SummaryClient::new(config)?;
        Ok(Self::new(client))
    }

    /// Queue a summarize call - returns almost immediately
    pub fn summarize(
      &self
    , text: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SummarizeReply>,
        crate::error::Error
      >
    {   debug!("summarize queuing {} chars", text.chars().count());
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::SummarizeArgs
        {   text
          , reply: reply_tx
        };

        self.hand.summarize_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Queue a call and wait for its answer
    pub async fn summarize_and_wait(&self, text: String)
      -> crate::SummarizeReply
    {   let mut reply_rx = self.summarize(text)?;
        reply_rx.recv().await.unwrap_or_else(|| {
          error!("Backend dropped the reply");
          Err(crate::error::Error::Other(
            "Backend dropped the reply".to_string()
          ))
        })
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down SummaryBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend exited without confirming shutdown");
            Err(crate::error::Error::Other(
              "Backend exited without confirming shutdown".to_string()
            ))
        }
    }
}

/// Main backend event loop
///
/// A summarize command is awaited inside its select arm, which keeps calls
/// strictly sequential. Shutdown is only seen between calls.
async fn run_backend_loop(
  foot: crate::SummaryFoot
, client: crate::client::SummaryClient
)
{   debug!("Starting SummaryBackend event loop");
    let SummaryFoot
    {   mut summarize_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = summarize_rx.recv() => {
          debug!("Received Summarize");
          let result = client.summarize(&cmd.text).await;
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("SummaryBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
