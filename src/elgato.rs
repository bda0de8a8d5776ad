//! Elgato Key Light API client
//!
//! Reads and writes the light state document at `http://{ip}:{port}/elgato/lights`.

use core::fmt::Write as _;
use core::net::SocketAddrV4;

use embedded_nal_async::{Dns, TcpConnect};
use heapless::{String, Vec};
use log::{debug, warn};
use reqwless::client::HttpClient;
use reqwless::headers::ContentType;
use reqwless::request::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::{ELGATO_LIGHTS_PATH, HTTP_BUFFER_SIZE, MAX_LIGHTS};
use crate::http::HttpError;
use crate::sensors::SensorReading;
use crate::sync::SyncError;

/// Room for the serialized single-light update
const REQUEST_BODY_SIZE: usize = 128;

/// "http://255.255.255.255:65535/elgato/lights" is 43 bytes
const URL_SIZE: usize = 48;

/// State of a single light as exchanged with the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    /// 0 or 1
    pub on: u8,
    /// 3-100 on the device
    #[serde(default)]
    pub brightness: u8,
    /// 143-344 (7000K-2900K)
    #[serde(default)]
    pub temperature: u16,
}

/// Body of `GET` and `PUT /elgato/lights`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightsDocument {
    pub lights: Vec<LightState, MAX_LIGHTS>,
    #[serde(rename = "numberOfLights", default)]
    pub number_of_lights: u8,
}

/// Light state document errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed light state document: {0}")]
    Decode(serde_json_core::de::Error),
    #[error("light state document does not fit the request buffer")]
    Encode,
    #[error("light reported an empty lights array")]
    NoLights,
}

impl LightsDocument {
    /// Document addressing exactly one light slot
    pub fn single(light: LightState) -> Self {
        let mut lights = Vec::new();
        // Capacity is MAX_LIGHTS, so the first push always fits.
        let _ = lights.push(light);
        Self {
            lights,
            number_of_lights: 1,
        }
    }

    /// `on` of the last entry in `lights`.
    ///
    /// Every entry is visited and the last one wins, so with several lights the base
    /// state comes from the final entry rather than the first.
    pub fn last_reported_on(&self) -> Result<u8, ProtocolError> {
        let mut on = None;
        for light in &self.lights {
            on = Some(light.on);
        }
        on.ok_or(ProtocolError::NoLights)
    }
}

/// Toggle law: pressing the button flips whatever the light reported.
pub fn toggle(on: u8, switch_pressed: bool) -> u8 {
    on ^ u8::from(switch_pressed)
}

/// State pushed after a change: toggled power, fresh brightness and temperature.
pub fn light_update(reported_on: u8, reading: &SensorReading) -> LightState {
    LightState {
        on: toggle(reported_on, reading.switch_pressed),
        brightness: reading.brightness,
        temperature: reading.temperature,
    }
}

pub fn decode(bytes: &[u8]) -> Result<LightsDocument, ProtocolError> {
    serde_json_core::from_slice(bytes)
        .map(|(document, _)| document)
        .map_err(ProtocolError::Decode)
}

pub fn encode<'b>(document: &LightsDocument, buf: &'b mut [u8]) -> Result<&'b [u8], ProtocolError> {
    let len = serde_json_core::to_slice(document, buf).map_err(|_| ProtocolError::Encode)?;
    Ok(&buf[..len])
}

/// Remote light endpoint used by the sync loop
pub trait LightApi {
    /// Current state of all lights on the device
    fn fetch_lights(&mut self) -> impl Future<Output = Result<LightsDocument, SyncError>>;

    /// Replace the light state; the response status is only logged
    fn push_lights(
        &mut self,
        document: &LightsDocument,
    ) -> impl Future<Output = Result<(), SyncError>>;
}

/// HTTP session with one Key Light, reused for every request
pub struct ElgatoClient<T, D> {
    tcp: T,
    dns: D,
    url: String<URL_SIZE>,
    rx_buffer: [u8; HTTP_BUFFER_SIZE],
    body_buffer: [u8; REQUEST_BODY_SIZE],
}

impl<T: TcpConnect, D: Dns> ElgatoClient<T, D> {
    pub fn new(tcp: T, dns: D, addr: SocketAddrV4) -> Self {
        let mut url = String::new();
        let _ = write!(url, "http://{}{}", addr, ELGATO_LIGHTS_PATH);
        Self {
            tcp,
            dns,
            url,
            rx_buffer: [0; HTTP_BUFFER_SIZE],
            body_buffer: [0; REQUEST_BODY_SIZE],
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tcp(&self) -> &T {
        &self.tcp
    }
}

impl<T: TcpConnect, D: Dns> LightApi for ElgatoClient<T, D> {
    async fn fetch_lights(&mut self) -> Result<LightsDocument, SyncError> {
        let mut client = HttpClient::new(&self.tcp, &self.dns);
        let mut request = client
            .request(Method::GET, &self.url)
            .await
            .map_err(HttpError::from)?;
        let response = request
            .send(&mut self.rx_buffer)
            .await
            .map_err(HttpError::from)?;
        if !response.status.is_successful() {
            return Err(HttpError::Status(response.status.0).into());
        }

        let body = response
            .body()
            .read_to_end()
            .await
            .map_err(HttpError::from)?;
        debug!("[HTTP] GET {} -> {} bytes", ELGATO_LIGHTS_PATH, body.len());
        Ok(decode(body)?)
    }

    async fn push_lights(&mut self, document: &LightsDocument) -> Result<(), SyncError> {
        let body = encode(document, &mut self.body_buffer)?;
        let mut client = HttpClient::new(&self.tcp, &self.dns);
        let mut request = client
            .request(Method::PUT, &self.url)
            .await
            .map_err(HttpError::from)?
            .body(body)
            .content_type(ContentType::ApplicationJson);
        let response = request
            .send(&mut self.rx_buffer)
            .await
            .map_err(HttpError::from)?;
        if !response.status.is_successful() {
            warn!("[HTTP] PUT {} answered {}", ELGATO_LIGHTS_PATH, response.status.0);
        }
        Ok(())
    }
}
