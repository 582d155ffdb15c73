// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::time::Duration;

use crate::constants::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_PORT, DEFAULT_RETRY_MAX};

/// Configuration for connecting to a LifeSOS base unit.
#[derive(Debug, Clone)]
pub struct BaseUnitConfig {
    /// Base unit host name or IP address
    pub host: String,
    /// Base unit TCP port (default: 1680)
    pub port: u16,
    /// Master password, sent with every command. Empty when none is set.
    pub password: String,
    /// How long to wait for a response to each command
    pub command_timeout: Duration,
    /// Attempts per query during discovery
    pub retry_max: u32,
    /// Whether to read initial state and all enrolled devices on connect
    pub auto_discover: bool,
    /// How long to wait for the TCP connection to open
    pub connect_timeout: Duration,
    /// Capacity of the broadcast event channel
    pub event_capacity: usize,
}

impl Default for BaseUnitConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            retry_max: DEFAULT_RETRY_MAX,
            auto_discover: true,
            connect_timeout: Duration::from_secs(10),
            event_capacity: 256,
        }
    }
}

impl BaseUnitConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> BaseUnitConfigBuilder {
        BaseUnitConfigBuilder::default()
    }
}

/// Builder for BaseUnitConfig.
#[derive(Debug, Clone, Default)]
pub struct BaseUnitConfigBuilder {
    config: BaseUnitConfig,
}

impl BaseUnitConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    pub fn retry_max(mut self, retries: u32) -> Self {
        self.config.retry_max = retries;
        self
    }

    pub fn auto_discover(mut self, auto_discover: bool) -> Self {
        self.config.auto_discover = auto_discover;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn build(mut self) -> BaseUnitConfig {
        self.config.event_capacity = self.config.event_capacity.max(1);
        self.config
    }
}
