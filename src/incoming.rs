//! Incoming message records handed from the network thread to the host.

use crate::buffer::MessageBuffer;
use crate::error::Result;
use crate::pool::ArrayPool;
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};

/// Identifies a connection without sharing ownership of it across
/// threads. The network thread resolves ids back to live connections;
/// stale ids resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an incoming record means to the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IncomingKind {
    /// Never delivered deliberately; seeing one indicates a library bug.
    Error = 0,
    /// A connection changed status (connecting, connected, disconnected).
    StatusChanged = 1,
    /// Data from a source we hold no connection to.
    UnconnectedData = 2,
    /// Application data from a connected peer.
    Data = 3,
    /// Delivery receipt for an earlier send.
    Receipt = 4,
    DebugMessage = 5,
    WarningMessage = 6,
    ErrorMessage = 7,
    /// A pong refreshed the roundtrip estimate; payload is the RTT as f32.
    ConnectionLatencyUpdated = 8,
}

impl IncomingKind {
    /// Bit for this kind in the configuration's enabled mask.
    pub const fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// How a message was, or should be, delivered.
///
/// The discriminants are the wire tag values for channel zero; sequenced
/// and ordered methods claim 32 consecutive tags, one per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeliveryMethod {
    Unknown = 0,
    Unreliable = 1,
    UnreliableSequenced = 2,
    ReliableUnordered = 34,
    ReliableSequenced = 35,
    ReliableOrdered = 67,
}

/// Channels available to each sequenced or ordered delivery method.
pub const SEQUENCED_CHANNEL_COUNT: u8 = 32;

/// Wire-level message tag: a delivery method fused with a channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireMessageType(pub u8);

impl WireMessageType {
    pub fn from_parts(method: DeliveryMethod, channel: u8) -> Self {
        match method {
            DeliveryMethod::Unknown
            | DeliveryMethod::Unreliable
            | DeliveryMethod::ReliableUnordered => {
                assert_eq!(channel, 0, "{method:?} supports a single channel");
                Self(method as u8)
            }
            DeliveryMethod::UnreliableSequenced
            | DeliveryMethod::ReliableSequenced
            | DeliveryMethod::ReliableOrdered => {
                assert!(
                    channel < SEQUENCED_CHANNEL_COUNT,
                    "channel index out of range"
                );
                Self(method as u8 + channel)
            }
        }
    }

    pub fn delivery_method(self) -> DeliveryMethod {
        match self.0 {
            1 => DeliveryMethod::Unreliable,
            2..=33 => DeliveryMethod::UnreliableSequenced,
            34 => DeliveryMethod::ReliableUnordered,
            35..=66 => DeliveryMethod::ReliableSequenced,
            67..=98 => DeliveryMethod::ReliableOrdered,
            _ => DeliveryMethod::Unknown,
        }
    }

    pub fn channel(self) -> u8 {
        let method = self.delivery_method();
        match method {
            DeliveryMethod::UnreliableSequenced
            | DeliveryMethod::ReliableSequenced
            | DeliveryMethod::ReliableOrdered => self.0 - method as u8,
            _ => 0,
        }
    }
}

/// A received message: a readable [`MessageBuffer`] plus delivery
/// metadata. Created by the socket reader, consumed once by the host,
/// then recycled.
#[derive(Debug)]
pub struct IncomingMessage {
    buffer: MessageBuffer,
    kind: IncomingKind,
    sender_endpoint: Option<SocketAddr>,
    sender_connection: Option<ConnectionId>,
    sequence_number: u32,
    wire_type: WireMessageType,
    is_fragment: bool,
    receive_time: f64,
    /// Translated timestamp cached by `read_time`; NaN until read.
    user_msg_time: f64,
}

impl IncomingMessage {
    pub fn new(kind: IncomingKind) -> Self {
        Self::from_storage(kind, Vec::new())
    }

    /// Wraps bytes deposited by the socket reader.
    pub fn from_storage(kind: IncomingKind, data: Vec<u8>) -> Self {
        Self {
            buffer: MessageBuffer::from_bytes(data),
            kind,
            sender_endpoint: None,
            sender_connection: None,
            sequence_number: 0,
            wire_type: WireMessageType::default(),
            is_fragment: false,
            receive_time: 0.0,
            user_msg_time: f64::NAN,
        }
    }

    pub fn kind(&self) -> IncomingKind {
        self.kind
    }

    pub fn sender_endpoint(&self) -> Option<SocketAddr> {
        self.sender_endpoint
    }

    pub fn sender_connection(&self) -> Option<ConnectionId> {
        self.sender_connection
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn wire_type(&self) -> WireMessageType {
        self.wire_type
    }

    pub fn is_fragment(&self) -> bool {
        self.is_fragment
    }

    /// Local clock time at which the socket reader received the packet.
    pub fn receive_time(&self) -> f64 {
        self.receive_time
    }

    pub fn set_sender(&mut self, endpoint: SocketAddr, connection: ConnectionId) {
        self.sender_endpoint = Some(endpoint);
        self.sender_connection = Some(connection);
    }

    pub fn set_sequence_number(&mut self, sequence_number: u32) {
        self.sequence_number = sequence_number;
    }

    pub fn set_wire_type(&mut self, wire_type: WireMessageType) {
        self.wire_type = wire_type;
    }

    pub fn set_fragment(&mut self, is_fragment: bool) {
        self.is_fragment = is_fragment;
    }

    pub fn set_receive_time(&mut self, receive_time: f64) {
        self.receive_time = receive_time;
    }

    /// Reads a timestamp stamped by `MessageBuffer::write_time` on the
    /// sending peer and translates it to the local clock using the sender
    /// connection's clock offset. The translated value is cached; later
    /// calls return it without touching the buffer.
    pub fn read_time(&mut self, remote_time_offset: f64, high_precision: bool) -> Result<f64> {
        if self.user_msg_time.is_nan() {
            let remote = if high_precision {
                self.buffer.read_f64()?
            } else {
                self.buffer.read_f32()? as f64
            };
            self.user_msg_time = remote - remote_time_offset;
        }
        Ok(self.user_msg_time)
    }

    /// Clears the record for reuse by the socket reader.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.kind = IncomingKind::Error;
        self.sender_endpoint = None;
        self.sender_connection = None;
        self.sequence_number = 0;
        self.wire_type = WireMessageType::default();
        self.is_fragment = false;
        self.receive_time = 0.0;
        self.user_msg_time = f64::NAN;
    }

    /// Releases the backing storage into `pool` once the host is done
    /// with the record.
    pub fn recycle(self, pool: &ArrayPool) {
        let data = self.buffer.into_bytes();
        if !data.is_empty() {
            pool.recycle(data);
        }
    }
}

impl Deref for IncomingMessage {
    type Target = MessageBuffer;

    fn deref(&self) -> &MessageBuffer {
        &self.buffer
    }
}

impl DerefMut for IncomingMessage {
    fn deref_mut(&mut self) -> &mut MessageBuffer {
        &mut self.buffer
    }
}
