// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

pub mod command;
pub mod direct;
pub mod framer;

use tokio::time::Duration;
use tracing::warn;

use crate::error::Result;
use crate::protocol::Command;
use crate::response::Response;

pub use command::CommandEngine;
pub use framer::{LineFramer, ProtocolMessage};

/// Something that can send commands to a base unit and await responses.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Send a command and wait for its response.
    async fn execute(
        &self,
        command: &Command,
        password: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Response>;

    /// Whether the transport is currently connected.
    fn is_connected(&self) -> bool;

    /// Execute with up to `max_attempts` tries, giving up early once
    /// disconnected or on an error that a retry cannot fix. Failures are
    /// logged, never returned.
    async fn execute_retry(
        &self,
        command: &Command,
        description: &str,
        max_attempts: u32,
    ) -> Option<Response> {
        for attempt in 1..=max_attempts {
            if !self.is_connected() {
                return None;
            }
            match self.execute(command, None, None).await {
                Ok(response) => return Some(response),
                Err(e) if e.is_retryable() => warn!(
                    "Failed to get {} (attempt {}/{}): {}",
                    description, attempt, max_attempts, e
                ),
                Err(e) => {
                    warn!("Failed to get {}: {}", description, e);
                    return None;
                }
            }
        }
        None
    }
}

impl Transport for CommandEngine {
    async fn execute(
        &self,
        command: &Command,
        password: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Response> {
        CommandEngine::execute(self, command, password, wait).await
    }

    fn is_connected(&self) -> bool {
        CommandEngine::is_connected(self)
    }
}

/// Events produced by a transport's reader task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Message(ProtocolMessage),
    Disconnected,
}
