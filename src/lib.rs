#![cfg_attr(not(test), no_std)]

//! ESP32-C3 Elgato Key Light dial library
//!
//! Reads a potentiometer, a light sensor and a push button, and mirrors that
//! physical control state onto an Elgato Key Light through its local REST API.
//! Everything except the `board` module is hardware independent and runs on the host.

pub mod app;
pub mod elgato;
pub mod http;
pub mod network;
pub mod sensors;
pub mod signature;
pub mod sync;

#[cfg(target_arch = "riscv32")]
pub mod wifi;

#[cfg(target_arch = "riscv32")]
pub mod board;

/// Project version information
pub const VERSION: &str = "0.1.0-dev";

/// Default configuration constants
pub mod config {
    use core::net::{Ipv4Addr, SocketAddrV4};

    /// Address of the Elgato Key Light on the local network
    pub const ELGATO_ADDR: SocketAddrV4 =
        SocketAddrV4::new(Ipv4Addr::new(192, 168, 178, 151), 9123);

    /// REST resource holding the light state
    pub const ELGATO_LIGHTS_PATH: &str = "/elgato/lights";

    /// WiFi configuration
    /// Read from environment variables at compile time
    pub const WIFI_SSID: &str = env!("WIFI_SSID");
    pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

    /// WiFi association timeout in milliseconds
    pub const WIFI_CONNECT_TIMEOUT_MS: u64 = 10_000;

    /// Time allowed for the DHCP lease after association
    pub const DHCP_TIMEOUT_MS: u64 = 15_000;

    // The pin numbers below only label logs and sensor errors. They mirror the
    // GPIO2/GPIO3/GPIO5 peripherals wired in `main` and must be changed together.

    /// ADC1 channel of the rotary potentiometer (brightness)
    pub const POTENTIOMETER_PIN: u8 = 2;

    /// ADC1 channel of the light sensor (colour temperature)
    pub const LIGHT_SENSOR_PIN: u8 = 3;

    /// Digital input of the push button (on/off toggle)
    pub const BUTTON_PIN: u8 = 5;

    /// Pause after every GET-then-PUT exchange so the light's API is not flooded
    pub const SYNC_COOLDOWN_MS: u32 = 500;

    /// Pause between polls when nothing changed
    pub const IDLE_POLL_INTERVAL_MS: u32 = 10;

    /// TCP connect and socket inactivity timeout for requests to the light
    pub const HTTP_TIMEOUT_MS: u64 = 10_000;

    /// Receive buffer for one HTTP response (headers and body)
    pub const HTTP_BUFFER_SIZE: usize = 1024;

    /// Maximum number of light entries accepted in a device response
    pub const MAX_LIGHTS: usize = 8;
}
