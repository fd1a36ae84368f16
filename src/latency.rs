//! Keep-alive and latency estimation for a single connection.
//!
//! A periodic ping carries the low byte of a monotonically increasing
//! counter; the matching pong echoes that byte together with the
//! responder's send time. Each accepted pong refreshes the timeout
//! deadline, folds the RTT sample into an EWMA, and refines the estimated
//! offset between the two clocks. The offset makes timestamps written on
//! one peer readable on the other: `remote = local + offset`.

use crate::buffer::MessageBuffer;
use crate::error::Result;
use tracing::{debug, trace};

/// Weight of a fresh RTT sample in the running average.
pub const RTT_EWMA_WEIGHT: f64 = 0.3;
/// RTT assumed before the first sample when deriving a resend delay.
pub const DEFAULT_RTT_GUESS: f64 = 0.1;
/// Floor of the retransmission delay, seconds.
pub const RESEND_DELAY_FLOOR: f64 = 0.025;
/// RTT multiplier of the retransmission delay.
pub const RESEND_DELAY_FACTOR: f64 = 2.1;

/// Sentinel for "no RTT sample accepted yet".
const RTT_UNSET: f64 = -1.0;

/// Keep-alive request: the low byte of the sender's ping counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub number: u8,
}

impl Ping {
    pub fn encode(&self, buf: &mut MessageBuffer) {
        buf.write_u8(self.number);
    }

    pub fn decode(buf: &mut MessageBuffer) -> Result<Self> {
        Ok(Self {
            number: buf.read_u8()?,
        })
    }
}

/// Keep-alive reply: the echoed ping byte plus the responder's local send
/// time in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pong {
    pub number: u8,
    pub send_time: f32,
}

impl Pong {
    pub fn encode(&self, buf: &mut MessageBuffer) {
        buf.write_u8(self.number);
        buf.write_f32(self.send_time);
    }

    pub fn decode(buf: &mut MessageBuffer) -> Result<Self> {
        Ok(Self {
            number: buf.read_u8()?,
            send_time: buf.read_f32()?,
        })
    }
}

/// What an accepted pong changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PongOutcome {
    /// Raw sample for this exchange.
    pub rtt: f64,
    /// Smoothed estimate after folding the sample in.
    pub average_rtt: f64,
    /// Updated retransmission delay for reliable sender channels.
    pub resend_delay: f64,
}

/// Per-connection latency state.
///
/// Owned by the connection, which is owned by the network thread; every
/// mutating operation takes `&mut self`, so off-thread use is a compile
/// error rather than a runtime check.
#[derive(Debug)]
pub struct LatencyTracker {
    sent_ping_number: u32,
    sent_ping_time: f64,
    average_rtt: f64,
    remote_time_offset: f64,
    timeout_deadline: f64,
    connection_timeout: f64,
}

impl LatencyTracker {
    pub fn new(connection_timeout: f64) -> Self {
        Self {
            sent_ping_number: 0,
            sent_ping_time: 0.0,
            average_rtt: RTT_UNSET,
            remote_time_offset: 0.0,
            timeout_deadline: f64::INFINITY,
            connection_timeout,
        }
    }

    /// Called once when the connect handshake completes: grants a doubled
    /// timeout window until the first pong lands and pings immediately.
    pub fn initialize_ping(&mut self, now: f64) -> Ping {
        self.timeout_deadline = now + 2.0 * self.connection_timeout;
        self.average_rtt = RTT_UNSET;
        self.send_ping(now)
    }

    /// Issues the next keep-alive ping.
    pub fn send_ping(&mut self, now: f64) -> Ping {
        self.sent_ping_number = self.sent_ping_number.wrapping_add(1);
        self.sent_ping_time = now;
        Ping {
            number: self.sent_ping_number as u8,
        }
    }

    /// Builds the reply for a received ping. `now` must be captured as
    /// close to emission as possible: the peer halves its measured RTT
    /// around this timestamp.
    pub fn make_pong(&self, ping_number: u8, now: f64) -> Pong {
        Pong {
            number: ping_number,
            send_time: now as f32,
        }
    }

    /// Folds a pong into the estimators.
    ///
    /// Returns `None` when the echoed byte does not match the outstanding
    /// ping: stale, reordered, or spoofed pongs carry no usable timing
    /// and are dropped.
    pub fn received_pong(&mut self, now: f64, pong: Pong) -> Option<PongOutcome> {
        if pong.number != self.sent_ping_number as u8 {
            trace!(
                got = pong.number,
                expected = self.sent_ping_number as u8,
                "discarding mismatched pong"
            );
            return None;
        }

        self.reset_timeout(now);

        let rtt = now - self.sent_ping_time;
        debug_assert!(rtt >= 0.0, "pong cannot precede its ping");
        let diff = pong.send_time as f64 + rtt * 0.5 - now;

        if self.average_rtt < 0.0 {
            self.remote_time_offset = diff;
            self.average_rtt = rtt;
            debug!(rtt, offset = diff, "initial roundtrip estimate");
        } else {
            self.average_rtt = self.average_rtt * (1.0 - RTT_EWMA_WEIGHT) + rtt * RTT_EWMA_WEIGHT;
            // Cumulative mean over every sample so far; the ping counter
            // doubles as the sample count.
            let samples = self.sent_ping_number as f64;
            self.remote_time_offset = (self.remote_time_offset * (samples - 1.0) + diff) / samples;
        }

        Some(PongOutcome {
            rtt,
            average_rtt: self.average_rtt,
            resend_delay: self.resend_delay(),
        })
    }

    /// Pushes the timeout deadline out by the configured window.
    pub fn reset_timeout(&mut self, now: f64) {
        self.timeout_deadline = now + self.connection_timeout;
    }

    /// Retransmission delay derived from the current estimate: strictly
    /// positive even at zero RTT, non-decreasing in RTT.
    pub fn resend_delay(&self) -> f64 {
        let rtt = if self.average_rtt < 0.0 {
            DEFAULT_RTT_GUESS
        } else {
            self.average_rtt
        };
        RESEND_DELAY_FLOOR + rtt * RESEND_DELAY_FACTOR
    }

    /// One-shot offset assignment for the first network-time-carrying
    /// packet that arrives before any pong has.
    pub fn initialize_remote_time_offset(&mut self, remote_send_time: f64, now: f64) {
        let rtt = self.average_rtt.max(0.0);
        self.remote_time_offset = remote_send_time + rtt * 0.5 - now;
    }

    /// Smoothed roundtrip estimate in seconds; negative until the first
    /// pong has been accepted.
    pub fn average_roundtrip_time(&self) -> f64 {
        self.average_rtt
    }

    pub fn remote_time_offset(&self) -> f64 {
        self.remote_time_offset
    }

    /// Translates a local timestamp onto the remote peer's clock.
    pub fn remote_time(&self, local: f64) -> f64 {
        local + self.remote_time_offset
    }

    /// Translates a remote timestamp onto the local clock.
    pub fn local_time(&self, remote: f64) -> f64 {
        remote - self.remote_time_offset
    }

    /// Local time after which the connection is considered dead.
    pub fn timeout_deadline(&self) -> f64 {
        self.timeout_deadline
    }

    /// Local time of the most recent ping emission.
    pub fn sent_ping_time(&self) -> f64 {
        self.sent_ping_time
    }

    pub fn sent_ping_number(&self) -> u32 {
        self.sent_ping_number
    }
}
