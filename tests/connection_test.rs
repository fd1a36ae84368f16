use netpulse::latency::{Ping, Pong};
use netpulse::{
    Connection, ConnectionId, IncomingKind, IncomingMessage, LatencyTracker, ManualClock,
    MessageBuffer, PeerConfig, SenderChannel, UnreliableSenderChannel,
};
use std::sync::{Arc, Mutex};

fn test_connection(config: PeerConfig, clock: Arc<ManualClock>) -> Connection {
    Connection::new(
        ConnectionId(1),
        "127.0.0.1:14242".parse().unwrap(),
        Arc::new(config),
        clock,
    )
}

/// Records every resend-delay push it receives.
#[derive(Debug, Default)]
struct ProbeChannel {
    delays: Arc<Mutex<Vec<f64>>>,
}

impl SenderChannel for ProbeChannel {
    fn update_resend_delay(&mut self, delay: f64) {
        self.delays.lock().unwrap().push(delay);
    }
}

#[test]
fn test_pong_updates_channels_and_emits_record_when_enabled() {
    let clock = Arc::new(ManualClock::new(10.0));
    let mut config = PeerConfig::new();
    config.enable(IncomingKind::ConnectionLatencyUpdated);
    let mut conn = test_connection(config, clock.clone());

    let delays: Arc<Mutex<Vec<f64>>> = Arc::default();
    conn.add_channel(Box::new(ProbeChannel {
        delays: delays.clone(),
    }));
    conn.add_channel(Box::new(UnreliableSenderChannel));

    let ping = conn.on_handshake_complete();
    clock.set(10.4);
    let mut record = conn
        .received_pong(Pong {
            number: ping.number,
            send_time: 20.0,
        })
        .expect("latency updates enabled");

    assert_eq!(record.kind(), IncomingKind::ConnectionLatencyUpdated);
    assert_eq!(record.sender_connection(), Some(ConnectionId(1)));
    assert_eq!(
        record.sender_endpoint(),
        Some("127.0.0.1:14242".parse().unwrap())
    );
    assert_eq!(record.receive_time(), 10.4);
    let rtt = record.read_f32().unwrap();
    assert!((rtt - 0.4).abs() < 1e-5);

    let delays = delays.lock().unwrap();
    assert_eq!(delays.len(), 1);
    assert!((delays[0] - (0.025 + 0.4 * 2.1)).abs() < 1e-5);
}

#[test]
fn test_latency_record_suppressed_by_default() {
    let clock = Arc::new(ManualClock::new(0.0));
    let mut conn = test_connection(PeerConfig::new(), clock.clone());
    let ping = conn.on_handshake_complete();
    clock.set(0.1);
    let record = conn.received_pong(Pong {
        number: ping.number,
        send_time: 0.0,
    });
    assert!(record.is_none());
    // The estimate updated even though nothing was delivered.
    assert!(conn.latency().average_roundtrip_time() >= 0.0);
}

#[test]
fn test_mismatched_pong_changes_nothing() {
    let clock = Arc::new(ManualClock::new(0.0));
    let mut config = PeerConfig::new();
    config.enable(IncomingKind::ConnectionLatencyUpdated);
    let mut conn = test_connection(config, clock.clone());
    conn.on_handshake_complete();
    clock.set(0.2);
    let record = conn.received_pong(Pong {
        number: 99,
        send_time: 0.0,
    });
    assert!(record.is_none());
    assert!(conn.latency().average_roundtrip_time() < 0.0);
}

#[test]
fn test_heartbeat_cadence() {
    let clock = Arc::new(ManualClock::new(0.0));
    let mut conn = test_connection(PeerConfig::new(), clock.clone());
    conn.on_handshake_complete(); // pings at t = 0

    assert!(conn.heartbeat().is_none());
    clock.set(3.9);
    assert!(conn.heartbeat().is_none());
    clock.set(4.0);
    let ping = conn.heartbeat().expect("interval elapsed");
    assert_eq!(ping.number, 2);
    // The interval restarts from the new ping.
    assert!(conn.heartbeat().is_none());
    clock.set(8.0);
    assert!(conn.heartbeat().is_some());
}

#[test]
fn test_timeout_expiry_without_pongs() {
    let clock = Arc::new(ManualClock::new(0.0));
    let mut conn = test_connection(PeerConfig::new(), clock.clone());
    conn.on_handshake_complete();

    // The handshake grants a doubled window: 2 * 25 s.
    clock.set(49.9);
    assert!(!conn.is_timed_out());
    clock.set(50.1);
    assert!(conn.is_timed_out());
}

#[test]
fn test_pong_postpones_the_deadline() {
    let clock = Arc::new(ManualClock::new(0.0));
    let mut conn = test_connection(PeerConfig::new(), clock.clone());
    let ping = conn.on_handshake_complete();
    clock.set(40.0);
    let _ = conn.received_pong(Pong {
        number: ping.number,
        send_time: 0.0,
    });
    // Deadline moved to 40 + 25.
    clock.set(60.0);
    assert!(!conn.is_timed_out());
    clock.set(65.1);
    assert!(conn.is_timed_out());
}

#[test]
fn test_received_ping_stamps_emission_time() {
    let clock = Arc::new(ManualClock::new(7.25));
    let mut conn = test_connection(PeerConfig::new(), clock);
    let pong = conn.received_ping(Ping { number: 9 });
    assert_eq!(pong.number, 9);
    assert_eq!(pong.send_time, 7.25);
}

#[test]
fn test_read_time_translates_and_caches() {
    // The remote peer's clock runs 100 s ahead: a zero-RTT pong carrying
    // remote time 110 against local time 10 pins the offset.
    let mut tracker = LatencyTracker::new(25.0);
    tracker.send_ping(10.0);
    tracker
        .received_pong(
            10.0,
            Pong {
                number: 1,
                send_time: 110.0,
            },
        )
        .unwrap();

    let mut wire = MessageBuffer::new();
    wire.write_time(120.0, true); // stamped on the remote peer
    let mut msg = IncomingMessage::from_storage(IncomingKind::Data, wire.into_bytes());

    let local = msg
        .read_time(tracker.remote_time_offset(), true)
        .unwrap();
    assert!((local - 20.0).abs() < 1e-5);

    // Cached: a second call returns the same value without consuming
    // more of the buffer.
    let position = msg.read_position();
    let again = msg
        .read_time(tracker.remote_time_offset(), true)
        .unwrap();
    assert_eq!(local, again);
    assert_eq!(msg.read_position(), position);
}
