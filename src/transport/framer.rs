// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use tracing::{debug, warn};

use crate::constants::{
    ContactIdEventCode, CMD_SENSOR_LOG, DEVICE_EVENT_PREFIX, MARKER_END, MARKER_START,
    SWITCH_TRIGGER_FAILED, UNENROLLED_DEVICE_PREFIX,
};
use crate::contact_id::ContactId;
use crate::device_event::DeviceEvent;
use crate::response::Response;

/// Longest incomplete line kept while waiting for its separator.
pub const MAX_LINE_LENGTH: usize = 1024;

/// A classified line received from the base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolMessage {
    /// `!...&` - response to a command
    Response(Response),
    /// `MINPIC=...` - event raised by an enrolled device
    DeviceEvent(DeviceEvent),
    /// `(...)` - Contact ID message
    ContactId(ContactId),
}

/// Reassembles lines from an arbitrarily chunked byte stream.
///
/// Lines end with CR, LF or CRLF. Text after the last separator is kept
/// until the next chunk completes it, up to [`MAX_LINE_LENGTH`].
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incomplete line waiting for its separator.
    pub fn residual(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk and return the messages from every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProtocolMessage> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let messages = match self.buffer.rfind(['\r', '\n']) {
            Some(end) => {
                let residual = self.buffer.split_off(end + 1);
                let complete = std::mem::replace(&mut self.buffer, residual);
                complete
                    .split(['\r', '\n'])
                    .filter(|line| !line.is_empty())
                    .filter_map(classify_line)
                    .collect()
            }
            None => Vec::new(),
        };

        if self.buffer.len() > MAX_LINE_LENGTH {
            warn!(
                "Discarding {} bytes received without a line separator",
                self.buffer.len()
            );
            self.buffer.clear();
        }
        messages
    }
}

/// Classify a single complete line. Unrecognised or malformed lines yield `None`.
pub fn classify_line(line: &str) -> Option<ProtocolMessage> {
    if line.len() >= 2 && line.starts_with(MARKER_START) && line.ends_with(MARKER_END) {
        debug!("DataReceived: {}", line);
        let text = line[1..line.len() - 1].to_lowercase();
        return match Response::parse(&text) {
            Ok(response) => response.map(ProtocolMessage::Response),
            Err(e) => {
                warn!("Failed to parse response '{}': {}", line, e);
                None
            }
        };
    }

    if line.starts_with(DEVICE_EVENT_PREFIX) {
        debug!("DataReceived: {}", line);
        return match DeviceEvent::parse(line) {
            Ok(event) => Some(ProtocolMessage::DeviceEvent(event)),
            Err(e) => {
                warn!("Failed to parse device event '{}': {}", line, e);
                None
            }
        };
    }

    if line.len() >= 2 && line.starts_with('(') && line.ends_with(')') {
        return match ContactId::parse(&line[1..line.len() - 1]) {
            Ok(contact_id) => {
                // Periodic heartbeat, too noisy to log
                if contact_id.event() != Some(ContactIdEventCode::PeriodicTestReport) {
                    debug!("DataReceived: {}", line);
                }
                Some(ProtocolMessage::ContactId(contact_id))
            }
            Err(e) => {
                warn!("Failed to parse Contact ID '{}': {}", line, e);
                None
            }
        };
    }

    if line.starts_with(UNENROLLED_DEVICE_PREFIX) || line == SWITCH_TRIGGER_FAILED {
        debug!("Ignoring: {}", line);
    } else if is_sensor_log_notice(line) {
        // Same information arrives as a device event
    } else {
        debug!("Unhandled line: {}", line);
    }
    None
}

fn is_sensor_log_notice(line: &str) -> bool {
    line.strip_prefix('[')
        .is_some_and(|rest| rest.starts_with(CMD_SENSOR_LOG) && rest.ends_with(']'))
}
