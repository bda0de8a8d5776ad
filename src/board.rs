//! ESP32-C3 adapters for the sensor port and the light client
//!
//! Potentiometer on GPIO2 and light sensor on GPIO3 (ADC1, 11 dB attenuation),
//! push button on GPIO5 with a pull-down.

use embassy_net::Stack;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_time::{Duration, Instant};
use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcChannel, AdcPin};
use esp_hal::gpio::Input;
use esp_hal::peripherals::{ADC1, GPIO2, GPIO3};

use crate::config;
use crate::elgato::ElgatoClient;
use crate::sensors::{RawInputs, SensorError, SensorSource, poll_conversion, read_button};

/// Time a oneshot conversion may take before the channel is reported as stuck
const ADC_READ_TIMEOUT: Duration = Duration::from_millis(5);

const TCP_TX_BUFFER_SIZE: usize = 512;

pub type BoardAdc = Adc<'static, ADC1<'static>, Blocking>;
pub type PotentiometerPin = AdcPin<GPIO2<'static>, ADC1<'static>>;
pub type LightSensorPin = AdcPin<GPIO3<'static>, ADC1<'static>>;

/// One socket is enough: requests to the light never overlap
pub type LightTcpState = TcpClientState<1, TCP_TX_BUFFER_SIZE, { config::HTTP_BUFFER_SIZE }>;
pub type LightTcp = TcpClient<'static, 1, TCP_TX_BUFFER_SIZE, { config::HTTP_BUFFER_SIZE }>;
pub type LightClient = ElgatoClient<LightTcp, DnsSocket<'static>>;

fn sample<PIN: AdcChannel>(
    adc: &mut BoardAdc,
    pin: &mut AdcPin<PIN, ADC1<'static>>,
    channel: u8,
) -> Result<u16, SensorError> {
    let deadline = Instant::now() + ADC_READ_TIMEOUT;
    poll_conversion(
        channel,
        || adc.read_oneshot(pin).ok(),
        || Instant::now() >= deadline,
    )
}

/// Potentiometer, light sensor and button of the dial
pub struct BoardSensors {
    adc: BoardAdc,
    potentiometer: PotentiometerPin,
    light: LightSensorPin,
    button: Input<'static>,
}

impl BoardSensors {
    pub fn new(
        adc: BoardAdc,
        potentiometer: PotentiometerPin,
        light: LightSensorPin,
        button: Input<'static>,
    ) -> Self {
        Self {
            adc,
            potentiometer,
            light,
            button,
        }
    }
}

impl SensorSource for BoardSensors {
    fn read_raw(&mut self) -> Result<RawInputs, SensorError> {
        let potentiometer = sample(
            &mut self.adc,
            &mut self.potentiometer,
            config::POTENTIOMETER_PIN,
        )?;
        let light = sample(&mut self.adc, &mut self.light, config::LIGHT_SENSOR_PIN)?;
        let switch_pressed = read_button(&mut self.button)?;
        Ok(RawInputs {
            potentiometer,
            light,
            switch_pressed,
        })
    }
}

/// Light client over the embassy-net stack; every request times out after
/// `HTTP_TIMEOUT_MS` of inactivity
pub fn light_client(stack: Stack<'static>, state: &'static LightTcpState) -> LightClient {
    let mut tcp = TcpClient::new(stack, state);
    tcp.set_timeout(Some(Duration::from_millis(config::HTTP_TIMEOUT_MS)));
    ElgatoClient::new(tcp, DnsSocket::new(stack), config::ELGATO_ADDR)
}
