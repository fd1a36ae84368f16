use std::fmt::Debug;
use std::sync::RwLock;
use std::time::Instant;

/// A monotonic clock measured in seconds.
///
/// All transport timing (ping cadence, timeout deadlines, RTT samples)
/// runs off one of these; the two peers' clocks may disagree by an
/// arbitrary constant, which the latency tracker estimates away.
pub trait NetworkClock: Send + Sync + Debug {
    fn now(&self) -> f64;
}

/// Wall clock counting seconds since its own construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A manual clock for deterministic simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<f64>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: f64) {
        *self.now.write().unwrap() = now;
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.write().unwrap() += seconds;
    }
}

impl NetworkClock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.read().unwrap()
    }
}
