//! In-memory channel fake for executor and ops tests.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;

use crate::channel::Channel;
use crate::error::{ClientError, Result};

/// What the fake service does with the next request.
pub(crate) enum Step {
    /// Answer with these bytes.
    Reply(Vec<u8>),
    /// Accept the request and never answer.
    Silence,
    /// Start answering and never finish.
    Stall,
    /// Fail the send as a broken connection would.
    SendFails,
}

impl Step {
    pub(crate) fn reply(raw: &str) -> Self {
        Self::Reply(raw.as_bytes().to_vec())
    }
}

enum Pending {
    Reply(Vec<u8>),
    Stalled,
}

/// Plays back one [`Step`] per request and records what was sent.
pub(crate) struct ScriptedChannel {
    steps: VecDeque<Step>,
    pending: Option<Pending>,
    pub(crate) sent: Vec<Vec<u8>>,
    /// Every bound handed to `await_readable` or `receive`, in order.
    pub(crate) waits: Vec<Duration>,
}

impl ScriptedChannel {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            pending: None,
            sent: Vec::new(),
            waits: Vec::new(),
        }
    }

    /// Sent payloads parsed as JSON.
    pub(crate) fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .iter()
            .map(|payload| serde_json::from_slice(payload).expect("sent payload should be json"))
            .collect()
    }
}

impl Channel for ScriptedChannel {
    fn send(&mut self, payload: &[u8]) -> Result<()> {
        assert!(self.pending.is_none(), "second request sent before reply was taken");
        match self.steps.pop_front().expect("unexpected request") {
            Step::Reply(raw) => self.pending = Some(Pending::Reply(raw)),
            Step::Silence => {}
            Step::Stall => self.pending = Some(Pending::Stalled),
            Step::SendFails => {
                return Err(ClientError::Disconnected("broken pipe".to_string()));
            }
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }

    fn await_readable(&mut self, timeout: Duration) -> Result<bool> {
        self.waits.push(timeout);
        Ok(self.pending.is_some())
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>> {
        self.waits.push(timeout);
        match self.pending.take().expect("receive without a pending reply") {
            Pending::Reply(raw) => Ok(Some(Bytes::from(raw))),
            Pending::Stalled => Ok(None),
        }
    }
}
