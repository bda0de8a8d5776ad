//! Firmware lifecycle: bootstrap the network, then hand over to the sync loop.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;

use crate::elgato::LightApi;
use crate::network::{BootError, Credentials, NetworkLink, bootstrap};
use crate::sensors::SensorSource;
use crate::sync::{StopCondition, SyncError, SyncLoop};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FirmwareError {
    #[error("startup failed: {0}")]
    Boot(#[from] BootError),
    #[error("sync stopped: {0}")]
    Sync(#[from] SyncError),
}

/// Associate, build the light session, and poll until `stop` or the first error.
///
/// `session` is only called once the network is up; a startup failure returns
/// before any sensor is read or any request is made.
pub async fn run<L, S, A, D>(
    link: &mut L,
    credentials: &Credentials<'_>,
    session: impl FnOnce(Ipv4Addr) -> SyncLoop<S, A, D>,
    stop: impl StopCondition,
) -> Result<(), FirmwareError>
where
    L: NetworkLink,
    S: SensorSource,
    A: LightApi,
    D: DelayNs,
{
    let ip = bootstrap(link, credentials).await?;
    let mut sync_loop = session(ip);
    sync_loop.run(stop).await?;
    Ok(())
}
