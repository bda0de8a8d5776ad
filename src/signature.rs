//! Change detection
//!
//! A reading is reduced to one integer, `brightness + temperature + switch`.
//! Different readings can share a signature; a missed update is accepted.

use crate::sensors::SensorReading;

/// Cheap fingerprint of a sensor reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangeSignature(pub u32);

impl ChangeSignature {
    pub fn of(reading: &SensorReading) -> Self {
        Self(
            u32::from(reading.brightness)
                + u32::from(reading.temperature)
                + u32::from(reading.switch_pressed),
        )
    }
}

impl core::fmt::Display for ChangeSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remembers the signature of the last reading pushed to the light
#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: ChangeSignature,
}

impl ChangeDetector {
    /// Starts from signature `0`, which no reading can produce, so the first poll always syncs.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> ChangeSignature {
        self.previous
    }

    pub fn has_changed(&self, signature: ChangeSignature) -> bool {
        self.previous != signature
    }

    /// Record a signature once its reading has reached the light
    pub fn commit(&mut self, signature: ChangeSignature) {
        self.previous = signature;
    }
}
