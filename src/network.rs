//! Network session bootstrap
//!
//! Associates with the WiFi network once at startup. There is no retry: a failure
//! here is reported and the firmware never starts polling.

use core::net::Ipv4Addr;

use log::{error, info};

use crate::config;

/// Startup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error("WIFI_SSID is empty")]
    MissingSsid,
    #[error("WiFi credentials do not fit the driver configuration")]
    InvalidCredentials,
    #[error("WiFi driver error")]
    Driver,
    #[error("association timed out after {0} ms")]
    AssociationTimeout(u64),
    #[error("no DHCP lease after {0} ms")]
    DhcpTimeout(u64),
}

/// WiFi network credentials
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

impl Credentials<'static> {
    /// Credentials baked in from `WIFI_SSID` / `WIFI_PASSWORD` at build time
    pub const fn from_build_env() -> Self {
        Self {
            ssid: config::WIFI_SSID,
            password: config::WIFI_PASSWORD,
        }
    }
}

/// Station-mode network interface
pub trait NetworkLink {
    /// Join the network and wait for an IPv4 address
    fn associate(
        &mut self,
        credentials: &Credentials<'_>,
    ) -> impl Future<Output = Result<Ipv4Addr, BootError>>;
}

/// Connect once; on failure log the error and hand it back to the caller.
pub async fn bootstrap<L: NetworkLink>(
    link: &mut L,
    credentials: &Credentials<'_>,
) -> Result<Ipv4Addr, BootError> {
    info!("[WIFI] Connecting to WiFi");

    let result = if credentials.ssid.is_empty() {
        Err(BootError::MissingSsid)
    } else {
        link.associate(credentials).await
    };

    match result {
        Ok(ip) => {
            info!("[WIFI] Connected to WiFi");
            info!("[WIFI] IP address is {}", ip);
            Ok(ip)
        }
        Err(e) => {
            error!("[WIFI] Failed to connect, aborting.");
            error!("[WIFI] Error: {}", e);
            Err(e)
        }
    }
}
