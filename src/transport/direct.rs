// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::BaseUnitConfig;
use crate::error::{LifeSosError, Result};
use crate::transport::command::CommandEngine;
use crate::transport::framer::{LineFramer, ProtocolMessage};
use crate::transport::TransportEvent;

/// Direct TCP transport, connected to the base unit's LAN port.
pub struct DirectTcpTransport {
    engine: Arc<CommandEngine>,
    reader_handle: Option<JoinHandle<()>>,
}

impl DirectTcpTransport {
    /// Open the connection and start reading.
    ///
    /// `Connected` is sent on `events` before any message, and
    /// `Disconnected` once the stream ends.
    pub async fn connect<T>(config: &BaseUnitConfig, events: mpsc::UnboundedSender<T>) -> Result<Self>
    where
        T: From<TransportEvent> + Send + 'static,
    {
        info!("Connecting to base unit at {}:{}", config.host, config.port);

        let stream = timeout(
            config.connect_timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| {
            error!("TCP connect timed out after {:?}", config.connect_timeout);
            LifeSosError::ConnectionTimeout
        })?
        .map_err(|e| {
            error!("TCP connect failed: {}", e);
            LifeSosError::Io(e)
        })?;
        stream.set_nodelay(true)?;

        info!("Connected to base unit");
        let (reader, writer) = stream.into_split();
        let engine = Arc::new(CommandEngine::new(
            writer,
            config.password.clone(),
            config.command_timeout,
        ));

        let _ = events.send(TransportEvent::Connected.into());
        let reader_handle = spawn_reader_task(reader, engine.clone(), events);

        Ok(Self {
            engine,
            reader_handle: Some(reader_handle),
        })
    }

    /// Get the command engine, shared with background tasks.
    pub fn engine(&self) -> &Arc<CommandEngine> {
        &self.engine
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// Close the connection. The reader task reports `Disconnected`.
    pub async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from base unit");
        self.engine.disconnect().await
    }
}

impl Drop for DirectTcpTransport {
    fn drop(&mut self) {
        // Stops retry loops still holding the engine
        self.engine.set_connected(false);
        if let Some(handle) = self.reader_handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the task that frames incoming data and routes each message.
///
/// Every message is forwarded on `events`; responses also settle the
/// matching pending command. The message is forwarded first so the
/// consumer has seen it by the time the waiting caller resumes.
pub fn spawn_reader_task<R, T>(
    mut reader: R,
    engine: Arc<CommandEngine>,
    events: mpsc::UnboundedSender<T>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: From<TransportEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        let mut framer = LineFramer::new();

        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    debug!("Reader: connection closed");
                    break;
                }
                Ok(n) => {
                    for message in framer.push(&buf[..n]) {
                        let response = match &message {
                            ProtocolMessage::Response(response) => Some(response.clone()),
                            _ => None,
                        };
                        let _ = events.send(TransportEvent::Message(message).into());
                        if let Some(response) = response {
                            engine.resolve(&response).await;
                        }
                    }
                }
                Err(e) => {
                    error!("Reader: read error: {}", e);
                    break;
                }
            }
        }

        engine.set_connected(false);
        engine.reject_pending().await;
        info!("Disconnected from base unit");
        let _ = events.send(TransportEvent::Disconnected.into());
    })
}
