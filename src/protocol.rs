//! Fabricated protocol numbers
//!
//! These are presentation artifacts shown in confirmation messages. They are
//! drawn digit by digit at random, never recorded anywhere, and two draws may
//! collide.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};

pub const PROTOCOL_PREFIX: &str = "CBMPE-";
pub const PROTOCOL_DIGITS: usize = 10;

/// `CBMPE-` followed by ten decimal digits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolNumber(String);

impl ProtocolNumber {
    /// Accepts exactly ten ASCII digits.
    pub fn from_digits(digits: &str) -> Option<Self> {
        let well_formed =
            digits.len() == PROTOCOL_DIGITS && digits.chars().all(|c| c.is_ascii_digit());
        well_formed.then(|| Self(format!("{PROTOCOL_PREFIX}{digits}")))
    }

    fn draw(rng: &mut impl Rng) -> Self {
        let digits: String = (0..PROTOCOL_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(format!("{PROTOCOL_PREFIX}{digits}"))
    }
}

impl fmt::Display for ProtocolNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the chat gets its protocol numbers from
pub trait ProtocolSource: Send + Sync + fmt::Debug {
    fn issue(&self) -> ProtocolNumber;
}

/// Thread-local RNG, a fresh draw every call
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomProtocolSource;

impl ProtocolSource for RandomProtocolSource {
    fn issue(&self) -> ProtocolNumber {
        ProtocolNumber::draw(&mut rand::thread_rng())
    }
}

/// Seeded RNG so a demo session can be replayed with the same numbers
#[derive(Debug)]
pub struct SeededProtocolSource {
    rng: Mutex<StdRng>,
}

impl SeededProtocolSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ProtocolSource for SeededProtocolSource {
    fn issue(&self) -> ProtocolNumber {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ProtocolNumber::draw(&mut *rng)
    }
}
