//! Peer-wide configuration shared by every connection.

use crate::incoming::IncomingKind;

/// Seconds between keep-alive pings.
pub const DEFAULT_PING_INTERVAL: f64 = 4.0;
/// Seconds without an accepted pong before a connection is declared dead.
pub const DEFAULT_CONNECTION_TIMEOUT: f64 = 25.0;

/// Tunables for a peer, shared as `Arc<PeerConfig>` by its connections.
///
/// Delivery of each [`IncomingKind`] to the host is individually
/// switchable; kinds the host never reads would otherwise pile up in its
/// queue.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    ping_interval: f64,
    connection_timeout: f64,
    enabled_kinds: u16,
}

impl Default for PeerConfig {
    fn default() -> Self {
        let mut config = Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            enabled_kinds: 0,
        };
        // Latency updates are opt-in; everything else the host usually
        // wants is on.
        config.enable(IncomingKind::StatusChanged);
        config.enable(IncomingKind::UnconnectedData);
        config.enable(IncomingKind::Data);
        config.enable(IncomingKind::Receipt);
        config.enable(IncomingKind::DebugMessage);
        config.enable(IncomingKind::WarningMessage);
        config.enable(IncomingKind::ErrorMessage);
        config
    }
}

impl PeerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ping_interval(&self) -> f64 {
        self.ping_interval
    }

    /// Seconds between keep-alive pings; must stay below the connection
    /// timeout or the timeout can expire between pings.
    pub fn set_ping_interval(&mut self, seconds: f64) {
        assert!(
            seconds > 0.0 && seconds < self.connection_timeout,
            "ping interval must be positive and below the connection timeout"
        );
        self.ping_interval = seconds;
    }

    pub fn connection_timeout(&self) -> f64 {
        self.connection_timeout
    }

    pub fn set_connection_timeout(&mut self, seconds: f64) {
        assert!(
            seconds > self.ping_interval,
            "connection timeout must exceed the ping interval"
        );
        self.connection_timeout = seconds;
    }

    pub fn enable(&mut self, kind: IncomingKind) {
        self.enabled_kinds |= kind.mask();
    }

    pub fn disable(&mut self, kind: IncomingKind) {
        self.enabled_kinds &= !kind.mask();
    }

    /// Whether records of `kind` are delivered to the host.
    pub fn is_enabled(&self, kind: IncomingKind) -> bool {
        self.enabled_kinds & kind.mask() != 0
    }
}
