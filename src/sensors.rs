//! Sensor acquisition
//!
//! Converts raw potentiometer, light sensor and button samples into the values
//! pushed to the light. Analog samples use the 16-bit scale `0..=65535`.

use embedded_hal::digital::InputPin;
use log::info;

/// Lowest temperature value produced by the light sensor (≈ 7000 K)
pub const TEMPERATURE_MIN: u16 = 145;

/// Span of the light sensor mapping, so the highest value is `TEMPERATURE_MIN + 200`
pub const TEMPERATURE_SPAN: u32 = 200;

/// Full scale of an analog sample
pub const ANALOG_FULL_SCALE: u32 = 65_535;

/// Sensor read errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// The ADC never finished a conversion
    #[error("ADC conversion on channel {0} did not complete")]
    AdcTimeout(u8),
    /// The button input could not be read
    #[error("button input could not be read")]
    Button,
}

/// One raw sample of all inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputs {
    pub potentiometer: u16,
    pub light: u16,
    pub switch_pressed: bool,
}

/// Values derived from one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    /// Potentiometer position, `0..=131` over the full scale
    pub brightness: u8,
    /// Mired-style colour temperature, `145..=345`
    pub temperature: u16,
    /// Instantaneous button level
    pub switch_pressed: bool,
}

impl SensorReading {
    pub fn from_raw(raw: RawInputs) -> Self {
        Self {
            brightness: brightness_from_raw(raw.potentiometer),
            temperature: temperature_from_raw(raw.light),
            switch_pressed: raw.switch_pressed,
        }
    }

    /// Print the reading to the console
    pub fn log(&self) {
        info!("[SENSOR] Brightness:{}", self.brightness);
        info!("[SENSOR] Temperature:{}", self.temperature);
        info!("[SENSOR] Switch:{}", u8::from(self.switch_pressed));
    }
}

/// Source of raw input samples
pub trait SensorSource {
    fn read_raw(&mut self) -> Result<RawInputs, SensorError>;

    fn read(&mut self) -> Result<SensorReading, SensorError> {
        self.read_raw().map(SensorReading::from_raw)
    }
}

/// `round(2 * raw / 1000)`
pub fn brightness_from_raw(raw: u16) -> u8 {
    let value = round_half_even(2 * u32::from(raw), 1000);
    // 2 * 65535 / 1000 rounds to 131
    value as u8
}

/// `round(145 + raw / 65535 * 200)`
pub fn temperature_from_raw(raw: u16) -> u16 {
    let offset = round_half_even(u32::from(raw) * TEMPERATURE_SPAN, ANALOG_FULL_SCALE);
    TEMPERATURE_MIN + offset as u16
}

/// Integer division rounding to the nearest value, ties to even.
fn round_half_even(numerator: u32, denominator: u32) -> u32 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let twice = remainder * 2;
    if twice > denominator || (twice == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

/// Widen a 12-bit ADC sample to the 16-bit scale by bit replication.
pub fn widen_12bit_sample(sample: u16) -> u16 {
    let sample = sample & 0x0FFF;
    (sample << 4) | (sample >> 8)
}

/// Retry a oneshot conversion until it yields a 12-bit sample or `expired` reports
/// that its deadline has passed. A sample ready on the last attempt still counts.
pub fn poll_conversion(
    channel: u8,
    mut convert: impl FnMut() -> Option<u16>,
    mut expired: impl FnMut() -> bool,
) -> Result<u16, SensorError> {
    loop {
        if let Some(sample) = convert() {
            return Ok(widen_12bit_sample(sample));
        }
        if expired() {
            return Err(SensorError::AdcTimeout(channel));
        }
    }
}

/// Read the instantaneous level of a button wired active-high.
pub fn read_button<P: InputPin>(pin: &mut P) -> Result<bool, SensorError> {
    pin.is_high().map_err(|_| SensorError::Button)
}
