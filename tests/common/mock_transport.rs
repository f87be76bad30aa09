//! Mock Transport for Testing
//!
//! Plays back a script of replies and records every request with the
//! (tokio) instant it was made.

use async_trait::async_trait;
use matrix_terminal::error::WebhookError;
use matrix_terminal::webhook::{OutboundRequest, RawResponse, Transport};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// What the mock does for one call
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Step {
    Reply(RawResponse),
    Fail(WebhookError),
    /// Fail with a transport error naming the call number ("failure #3")
    FailNumbered,
    /// Never answer
    Hang,
}

#[allow(dead_code)]
impl Step {
    pub fn json(body: &str) -> Self {
        Step::Reply(RawResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        })
    }

    pub fn status(status: u16) -> Self {
        Step::Reply(RawResponse {
            status,
            content_type: Some("text/plain".to_string()),
            body: String::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub at: Instant,
    pub request: OutboundRequest,
}

/// Scripted transport; once the script runs out the last step repeats
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<Step>>,
    last: Step,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn scripted(steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or(Step::Hang);
        Self {
            script: Mutex::new(steps.into()),
            last,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::scripted(vec![step])
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls excluding connectivity probes
    pub fn message_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.request.query("ping").is_none())
            .collect()
    }

    fn next_step(&self) -> Step {
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.last.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, WebhookError> {
        let number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                at: Instant::now(),
                request: request.clone(),
            });
            calls.len()
        };

        match self.next_step() {
            Step::Reply(response) => Ok(response),
            Step::Fail(err) => Err(err),
            Step::FailNumbered => Err(WebhookError::Transport(format!("failure #{number}"))),
            Step::Hang => std::future::pending().await,
        }
    }
}
