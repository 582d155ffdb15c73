// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{oneshot, Mutex};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};

use crate::error::{LifeSosError, Result};
use crate::protocol::Command;
use crate::response::Response;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A caller waiting for the response to a named command.
struct PendingCommand {
    /// Distinguishes a registration from a later one under the same name
    id: u64,
    sender: oneshot::Sender<Result<Response>>,
}

/// Writes commands and routes responses back to callers via oneshot channels.
///
/// Responses carry no sequence number, so they are correlated by command
/// name. At most one command per name is outstanding; issuing another with
/// the same name rejects the earlier caller with `CommandSuperseded`.
pub struct CommandEngine {
    /// Map of pending command names to their response senders
    pending: Arc<Mutex<HashMap<String, PendingCommand>>>,
    next_id: AtomicU64,
    writer: Mutex<BoxedWriter>,
    connected: Arc<AtomicBool>,
    /// Used when a command does not supply its own password
    password: String,
    default_timeout: Duration,
}

impl CommandEngine {
    pub fn new<W>(writer: W, password: impl Into<String>, default_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            writer: Mutex::new(Box::new(writer)),
            connected: Arc::new(AtomicBool::new(true)),
            password: password.into(),
            default_timeout,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Number of commands still waiting for a response.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Send a command and wait for its response.
    ///
    /// `password` overrides the configured one for this command only, and
    /// `wait` overrides the default timeout.
    pub async fn execute(
        &self,
        command: &Command,
        password: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Response> {
        if !self.is_connected() {
            return Err(LifeSosError::NotConnected);
        }

        let name = command.name();
        let password = password.unwrap_or(&self.password);
        let masked = command.format(&"*".repeat(password.len()));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let (tx, rx) = oneshot::channel();
        let previous = self
            .pending
            .lock()
            .await
            .insert(name.clone(), PendingCommand { id, sender: tx });
        if let Some(previous) = previous {
            warn!("Command '{}' superseded by a newer request", name);
            let _ = previous.sender.send(Err(LifeSosError::CommandSuperseded {
                command: name.clone(),
            }));
        }

        debug!("DataSent: {}", masked);
        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(command.format(password).as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            error!("Failed to write command: {}", e);
            self.remove_pending(&name, id).await;
            return Err(LifeSosError::Io(e));
        }

        match timeout(wait.unwrap_or(self.default_timeout), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(LifeSosError::ChannelClosed),
            Err(_) => {
                self.remove_pending(&name, id).await;
                debug!("Command timeout: {}", masked);
                Err(LifeSosError::CommandTimeout { command: masked })
            }
        }
    }

    /// Hand a response to the caller waiting on its command name.
    ///
    /// Returns false when nobody was waiting.
    pub async fn resolve(&self, response: &Response) -> bool {
        let name = response.command_name();
        match self.pending.lock().await.remove(&name) {
            Some(pending) => {
                let _ = pending.sender.send(Ok(response.clone()));
                true
            }
            None => false,
        }
    }

    /// Reject every outstanding command, used once the connection is gone.
    pub async fn reject_pending(&self) {
        for (_, pending) in self.pending.lock().await.drain() {
            let _ = pending.sender.send(Err(LifeSosError::NotConnected));
        }
    }

    /// Mark as disconnected, fail outstanding commands and close the writer.
    pub async fn disconnect(&self) -> Result<()> {
        self.set_connected(false);
        self.reject_pending().await;
        self.writer.lock().await.shutdown().await?;
        Ok(())
    }

    /// Remove a registration only if it has not been replaced since.
    async fn remove_pending(&self, name: &str, id: u64) {
        let mut pending = self.pending.lock().await;
        if pending.get(name).is_some_and(|p| p.id == id) {
            pending.remove(name);
        }
    }
}
