//! A single remote peer as seen from the network thread.
//!
//! The network thread owns every [`Connection`] outright; all mutating
//! methods take `&mut self`, so touching one from another thread is a
//! compile error. The host only ever sees [`IncomingMessage`] records
//! produced here and handed over through the peer's queue.

use crate::config::PeerConfig;
use crate::incoming::{ConnectionId, IncomingKind, IncomingMessage};
use crate::latency::{LatencyTracker, Ping, Pong};
use crate::time::NetworkClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Retransmission surface of a sender channel. The channels themselves
/// (windows, acks, resends) live outside this crate; the connection only
/// needs somewhere to push a fresh resend delay.
pub trait SenderChannel: std::fmt::Debug {
    /// Called whenever a new RTT estimate produces a new delay.
    fn update_resend_delay(&mut self, _delay: f64) {}
}

/// Channel that retransmits unacknowledged sends after `resend_delay`.
#[derive(Debug)]
pub struct ReliableSenderChannel {
    resend_delay: f64,
}

impl ReliableSenderChannel {
    pub fn new(initial_delay: f64) -> Self {
        Self {
            resend_delay: initial_delay,
        }
    }

    pub fn resend_delay(&self) -> f64 {
        self.resend_delay
    }
}

impl SenderChannel for ReliableSenderChannel {
    fn update_resend_delay(&mut self, delay: f64) {
        self.resend_delay = delay;
    }
}

/// Fire-and-forget channel; RTT changes do not concern it.
#[derive(Debug, Default)]
pub struct UnreliableSenderChannel;

impl SenderChannel for UnreliableSenderChannel {}

/// Connection-side keep-alive driver: owns the latency tracker and fans
/// its results out to the send channels and the host.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    remote_endpoint: SocketAddr,
    config: Arc<PeerConfig>,
    clock: Arc<dyn NetworkClock>,
    latency: LatencyTracker,
    channels: Vec<Box<dyn SenderChannel + Send>>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        remote_endpoint: SocketAddr,
        config: Arc<PeerConfig>,
        clock: Arc<dyn NetworkClock>,
    ) -> Self {
        let latency = LatencyTracker::new(config.connection_timeout());
        Self {
            id,
            remote_endpoint,
            config,
            clock,
            latency,
            channels: Vec::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn remote_endpoint(&self) -> SocketAddr {
        self.remote_endpoint
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    /// Registers a send channel; every registered channel receives resend
    /// delay updates from then on.
    pub fn add_channel(&mut self, channel: Box<dyn SenderChannel + Send>) {
        self.channels.push(channel);
    }

    /// Completes the connect handshake: doubled timeout window plus an
    /// immediate ping, which the caller must put on the wire.
    pub fn on_handshake_complete(&mut self) -> Ping {
        let now = self.clock.now();
        self.latency.initialize_ping(now)
    }

    /// Periodic driver. Returns a ping once per configured interval; the
    /// caller sends it.
    pub fn heartbeat(&mut self) -> Option<Ping> {
        let now = self.clock.now();
        if now >= self.latency.sent_ping_time() + self.config.ping_interval() {
            Some(self.latency.send_ping(now))
        } else {
            None
        }
    }

    /// Whether the deadline passed without an accepted pong.
    pub fn is_timed_out(&self) -> bool {
        self.clock.now() > self.latency.timeout_deadline()
    }

    /// Answers a ping. The returned pong is stamped with the current
    /// clock, so it must go on the wire immediately rather than sit in a
    /// queue.
    pub fn received_ping(&mut self, ping: Ping) -> Pong {
        self.latency.make_pong(ping.number, self.clock.now())
    }

    /// Folds in a pong: refreshes the timeout and the estimators, pushes
    /// the new resend delay to every channel, and produces a
    /// latency-update record when the host asked for one.
    pub fn received_pong(&mut self, pong: Pong) -> Option<IncomingMessage> {
        let now = self.clock.now();
        let outcome = self.latency.received_pong(now, pong)?;
        for channel in &mut self.channels {
            channel.update_resend_delay(outcome.resend_delay);
        }
        debug!(
            connection = %self.id,
            rtt = outcome.rtt,
            average = outcome.average_rtt,
            "latency updated"
        );

        if !self.config.is_enabled(IncomingKind::ConnectionLatencyUpdated) {
            return None;
        }
        let mut record = IncomingMessage::new(IncomingKind::ConnectionLatencyUpdated);
        record.write_f32(outcome.rtt as f32);
        record.set_sender(self.remote_endpoint, self.id);
        record.set_receive_time(now);
        Some(record)
    }
}
