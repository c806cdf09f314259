//! Reassembly of a streamed answer from its fragments

use serde_json::Value;
use log::{debug, trace, warn, error};
use crate::request::FragmentStatus;

/// Lifecycle of one streaming call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState
{   Idle
  , Connecting
  , AwaitingFirstFragment
  , Accumulating
  , Completed
  , Failed
}

impl CallState
{   pub fn is_terminal(&self) -> bool
    {   matches!(self, CallState::Completed | CallState::Failed)
    }
}

/// What the driver should do after feeding a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress
{   /// Keep reading
    Pending
  , /// Terminal state reached, stop reading and close
    Done
}

/// Accumulated result of exactly one call.
///
/// Written only by the fragment loop and read through `finish` once a
/// terminal state is reached. Every event after the first terminal
/// transition is ignored.
#[derive(Debug)]
pub struct ResponseAssembler
{   state: CallState
  , buffer: String
  , error: Option<crate::error::Error>
  , fragments: usize
}

impl Default for ResponseAssembler
{   fn default() -> Self
    {   Self::new()
    }
}

impl ResponseAssembler
{   pub fn new() -> Self
    {   ResponseAssembler
        {   state: CallState::Idle
          , buffer: String::new()
          , error: None
          , fragments: 0
        }
    }

    pub fn state(&self) -> CallState
    {   self.state
    }

    /// Text accumulated so far
    pub fn content(&self) -> &str
    {   &self.buffer
    }

    pub fn fragments(&self) -> usize
    {   self.fragments
    }

    pub fn error(&self) -> Option<&crate::error::Error>
    {   self.error.as_ref()
    }

    /// Idle -> Connecting
    pub fn connecting(&mut self)
    {   self.transition(CallState::Idle, CallState::Connecting);
    }

    /// Connecting -> AwaitingFirstFragment, once the request is on the wire
    pub fn request_sent(&mut self)
    {   self.transition(
          CallState::Connecting,
          CallState::AwaitingFirstFragment
        );
    }

    fn transition(&mut self, from: CallState, to: CallState)
    {   if self.state == from
        {   trace!("Call state {:?} -> {:?}", from, to);
            self.state = to;
        } else
        {   warn!(
              "Ignoring transition {:?} -> {:?} in state {:?}",
              from, to, self.state
            );
        }
    }

    /// Record a failure. No-op once terminal.
    pub fn fail(&mut self, err: crate::error::Error) -> Progress
    {   if self.state.is_terminal()
        {   debug!("Ignoring failure after terminal state: {}", err);
            return Progress::Done;
        }
        error!("Streaming call failed in {:?}: {}", self.state, err);
        self.state = CallState::Failed;
        self.error = Some(err);
        Progress::Done
    }

    /// The connection went away. Fails the call unless already terminal.
    pub fn connection_closed(&mut self) -> Progress
    {   if self.state.is_terminal()
        {   trace!("Connection closed after terminal state");
            return Progress::Done;
        }
        self.fail(crate::error::Error::Transport(
          "connection closed before completion".to_string()
        ))
    }

    /// Feed one raw text frame
    pub fn push_text(&mut self, raw: &str) -> Progress
    {   if self.state.is_terminal()
        {   return Progress::Done;
        }
        trace!("Received fragment: {}", raw);
        match serde_json::from_str::<Value>(raw)
        {   Ok(value) => self.push_value(&value)
          , Err(e) => self.fail(crate::error::Error::Protocol(
              format!("malformed fragment JSON: {}", e)
            ))
        }
    }

    /// Feed one decoded fragment
    pub fn push_value(&mut self, fragment: &Value) -> Progress
    {   match self.state
        {   CallState::AwaitingFirstFragment
          | CallState::Accumulating => {}
          , CallState::Completed
          | CallState::Failed => return Progress::Done
          , CallState::Idle
          | CallState::Connecting => {
              return self.fail(crate::error::Error::Protocol(
                "fragment received before the request was sent"
                  .to_string()
              ));
            }
        }
        self.fragments += 1;

        match inspect(fragment)
        {   Ok((status, chunk)) => {
              self.state = CallState::Accumulating;
              if let Some(chunk) = chunk
              {   trace!("Appending {} bytes", chunk.len());
                  self.buffer.push_str(chunk);
              }
              if status == FragmentStatus::Final
              {   debug!(
                    "Response complete after {} fragments, {} bytes",
                    self.fragments, self.buffer.len()
                  );
                  self.state = CallState::Completed;
                  Progress::Done
              } else
              {   Progress::Pending
              }
            }
          , Err(err) => self.fail(err)
        }
    }

    /// Consume the assembler. Returns the text only on a clean completion
    /// with non-blank content.
    pub fn finish(self) -> Result<String, crate::error::Error>
    {   match self.state
        {   CallState::Completed => {
              if self.buffer.trim().is_empty()
              {   error!("Completed without content");
                  Err(crate::error::Error::EmptyResponse)
              } else
              {   Ok(self.buffer)
              }
            }
          , CallState::Failed => {
              Err(self.error.unwrap_or_else(|| {
                crate::error::Error::Other(
                  "call failed without a recorded error".to_string()
                )
              }))
            }
          , state => {
              Err(crate::error::Error::Protocol(format!(
                "call finished in non-terminal state {:?}", state
              )))
            }
        }
    }
}

/// Validate a fragment in order: header, code, payload, choices, status,
/// then the optional text chunks. Returns the status and the first chunk.
fn inspect(fragment: &Value)
  -> Result<(FragmentStatus, Option<&str>), crate::error::Error>
{   let protocol = |msg: &str| {
      crate::error::Error::Protocol(msg.to_string())
    };

    let header = fragment.get("header")
      .filter(|h| h.is_object())
      .ok_or_else(|| protocol("fragment is missing header"))?;

    let code = header.get("code")
      .and_then(Value::as_i64)
      .unwrap_or(-1);
    if code != 0
    {   let message = header.get("message")
          .and_then(Value::as_str)
          .unwrap_or("unknown error")
          .to_string();
        return Err(crate::error::Error::Api { code, message });
    }

    let payload = fragment.get("payload")
      .filter(|p| p.is_object())
      .ok_or_else(|| protocol("fragment is missing payload"))?;
    let choices = payload.get("choices")
      .filter(|c| c.is_object())
      .ok_or_else(|| protocol("payload is missing choices"))?;
    let status_code = choices.get("status")
      .ok_or_else(|| protocol("choices is missing status"))?
      .as_i64()
      .ok_or_else(|| protocol("choices status is not an integer"))?;
    let status = FragmentStatus::from_code(status_code)
      .ok_or_else(|| {
        crate::error::Error::Protocol(
          format!("unknown choices status {}", status_code)
        )
      })?;

    let chunk = choices.get("text")
      .and_then(Value::as_array)
      .and_then(|text| text.first())
      .and_then(|first| first.get("content"))
      .and_then(Value::as_str);
    if chunk.is_none()
    {   debug!("Fragment with status {:?} carries no content", status);
    }

    Ok((status, chunk))
}
