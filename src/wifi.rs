//! WiFi module for ESP32-C3 board
//!
//! Joins the configured network in station mode using esp-wifi 0.14.1, then waits
//! for the embassy-net DHCP lease.

use core::net::Ipv4Addr;

use embassy_net::Stack;
use embassy_time::{Duration, Instant, Timer, with_timeout};
use esp_wifi::wifi::{AuthMethod, ClientConfiguration, Configuration, WifiController};
use log::{info, warn};

use crate::config;
use crate::network::{BootError, Credentials, NetworkLink};

/// Interval between association status checks
const CONNECT_POLL_MS: u64 = 100;

/// WiFi station with its embassy-net stack
pub struct WiFiManager<'a> {
    controller: WifiController<'a>,
    stack: Stack<'a>,
}

impl<'a> WiFiManager<'a> {
    pub fn new(controller: WifiController<'a>, stack: Stack<'a>) -> Self {
        Self { controller, stack }
    }

    fn configure(&mut self, credentials: &Credentials<'_>) -> Result<(), BootError> {
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client_config = ClientConfiguration {
            ssid: credentials
                .ssid
                .try_into()
                .map_err(|_| BootError::InvalidCredentials)?,
            password: credentials
                .password
                .try_into()
                .map_err(|_| BootError::InvalidCredentials)?,
            auth_method,
            ..Default::default()
        };

        self.controller
            .set_configuration(&Configuration::Client(client_config))
            .map_err(|_| BootError::Driver)?;
        self.controller.start().map_err(|_| BootError::Driver)?;
        self.controller.connect().map_err(|_| BootError::Driver)
    }

    async fn wait_for_association(&mut self) -> Result<(), BootError> {
        let deadline = Instant::now() + Duration::from_millis(config::WIFI_CONNECT_TIMEOUT_MS);
        while !self.controller.is_connected().unwrap_or(false) {
            if Instant::now() >= deadline {
                return Err(BootError::AssociationTimeout(config::WIFI_CONNECT_TIMEOUT_MS));
            }
            Timer::after(Duration::from_millis(CONNECT_POLL_MS)).await;
        }
        Ok(())
    }

    async fn wait_for_lease(&self) -> Result<Ipv4Addr, BootError> {
        let timeout = Duration::from_millis(config::DHCP_TIMEOUT_MS);
        with_timeout(timeout, self.stack.wait_config_up())
            .await
            .map_err(|_| BootError::DhcpTimeout(config::DHCP_TIMEOUT_MS))?;

        self.stack
            .config_v4()
            .map(|lease| Ipv4Addr::from(lease.address.address().octets()))
            .ok_or(BootError::DhcpTimeout(config::DHCP_TIMEOUT_MS))
    }
}

impl NetworkLink for WiFiManager<'_> {
    async fn associate(&mut self, credentials: &Credentials<'_>) -> Result<Ipv4Addr, BootError> {
        info!("[WIFI] Joining network: {}", credentials.ssid);
        self.configure(credentials)?;

        if let Err(e) = self.wait_for_association().await {
            warn!("[WIFI] Association did not complete");
            let _ = self.controller.disconnect();
            return Err(e);
        }

        info!("[WIFI] Associated, waiting for DHCP");
        self.wait_for_lease().await
    }
}
