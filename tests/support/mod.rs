#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, Once};

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};
use embedded_nal_async::{AddrType, Dns, TcpConnect};
use keylight_dial::elgato::{LightApi, LightState, LightsDocument};
use keylight_dial::sensors::{RawInputs, SensorError, SensorSource};
use keylight_dial::sync::SyncError;

/// Potentiometer sample that maps to `brightness` exactly
pub fn potentiometer_for(brightness: u8) -> u16 {
    u16::from(brightness) * 500
}

/// Light sensor sample for the temperature `300`
pub const LIGHT_FOR_300: u16 = 50_790;

pub fn raw(brightness: u8, light: u16, switch_pressed: bool) -> RawInputs {
    RawInputs {
        potentiometer: potentiometer_for(brightness),
        light,
        switch_pressed,
    }
}

/// Replays queued samples, then reports a stuck ADC
pub struct ScriptedSensors {
    samples: VecDeque<RawInputs>,
    pub reads: usize,
}

impl ScriptedSensors {
    pub fn new(samples: &[RawInputs]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            reads: 0,
        }
    }
}

impl SensorSource for ScriptedSensors {
    fn read_raw(&mut self) -> Result<RawInputs, SensorError> {
        self.reads += 1;
        self.samples.pop_front().ok_or(SensorError::AdcTimeout(2))
    }
}

/// In-memory light that records every exchange
pub struct RecordingLight {
    pub state: LightsDocument,
    pub fetches: usize,
    pub pushes: Vec<LightsDocument>,
    pub fail_next_push: Option<SyncError>,
}

impl RecordingLight {
    pub fn with_lights(lights: &[LightState]) -> Self {
        let mut state = LightsDocument {
            lights: heapless::Vec::new(),
            number_of_lights: lights.len() as u8,
        };
        for light in lights {
            state.lights.push(*light).unwrap();
        }
        Self {
            state,
            fetches: 0,
            pushes: Vec::new(),
            fail_next_push: None,
        }
    }

    pub fn single(on: u8) -> Self {
        Self::with_lights(&[LightState {
            on,
            brightness: 20,
            temperature: 200,
        }])
    }
}

impl LightApi for RecordingLight {
    async fn fetch_lights(&mut self) -> Result<LightsDocument, SyncError> {
        self.fetches += 1;
        Ok(self.state.clone())
    }

    async fn push_lights(&mut self, document: &LightsDocument) -> Result<(), SyncError> {
        if let Some(error) = self.fail_next_push.take() {
            return Err(error);
        }
        self.pushes.push(document.clone());
        self.state = document.clone();
        Ok(())
    }
}

/// Delay that returns immediately and remembers what was asked for
#[derive(Default)]
pub struct RecordingDelay {
    pub pauses_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.pauses_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.pauses_ms.push(ms);
    }
}

/// Serves canned HTTP responses, one per connection, and keeps the raw requests
pub struct WireTcp {
    responses: RefCell<VecDeque<Vec<u8>>>,
    requests: RefCell<Vec<Vec<u8>>>,
}

impl WireTcp {
    pub fn new(responses: &[String]) -> Self {
        Self {
            responses: RefCell::new(responses.iter().map(|r| r.as_bytes().to_vec()).collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| String::from_utf8(request.clone()).unwrap())
            .collect()
    }
}

pub struct WireStream<'a> {
    response: Vec<u8>,
    pos: usize,
    written: RefMut<'a, Vec<u8>>,
}

impl ErrorType for WireStream<'_> {
    type Error = ErrorKind;
}

impl Read for WireStream<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ErrorKind> {
        let n = buf.len().min(self.response.len() - self.pos).min(16);
        buf[..n].copy_from_slice(&self.response[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for WireStream<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, ErrorKind> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl TcpConnect for WireTcp {
    type Error = ErrorKind;
    type Connection<'a>
        = WireStream<'a>
    where
        Self: 'a;

    async fn connect<'a>(&'a self, _remote: SocketAddr) -> Result<WireStream<'a>, ErrorKind> {
        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or(ErrorKind::ConnectionRefused)?;
        let mut requests = self.requests.borrow_mut();
        requests.push(Vec::new());
        Ok(WireStream {
            response,
            pos: 0,
            written: RefMut::map(requests, |r| r.last_mut().unwrap()),
        })
    }
}

/// Resolves address literals only
pub struct LiteralDns;

impl Dns for LiteralDns {
    type Error = ErrorKind;

    async fn get_host_by_name(
        &self,
        host: &str,
        _addr_type: AddrType,
    ) -> Result<IpAddr, ErrorKind> {
        host.parse().map_err(|_| ErrorKind::InvalidInput)
    }

    async fn get_host_by_address(
        &self,
        _addr: IpAddr,
        _result: &mut [u8],
    ) -> Result<usize, ErrorKind> {
        Err(ErrorKind::Unsupported)
    }
}

pub fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

/// Captures every log line emitted by the crate
pub struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.lines.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

pub fn capture_logs() -> &'static CaptureLogger {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
    &LOGGER
}

impl CaptureLogger {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|line| line.contains(needle))
    }
}
