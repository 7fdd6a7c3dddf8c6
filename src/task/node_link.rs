//! Control node end of the sensing-node link
//!
//! One SPI transaction per word: the chip select of the addressed node goes low,
//! two bytes go out (command, big-endian) and two come back (the reply the node
//! staged during the previous transaction).

use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{with_timeout, Duration};
use embedded_hal_async::spi::SpiDevice as _;

use crate::config::LINK_REPLY_TIMEOUT;
use crate::link::{LinkError, SensorLink};
use crate::task::bus::SpiBus;

/// One sensing node on the shared link bus
pub struct NodeLink {
    device: SpiDevice<'static, CriticalSectionRawMutex, Spi<'static, SPI0, spi::Async>, Output<'static>>,
}

impl NodeLink {
    pub fn new(bus: &'static SpiBus, chip_select: Output<'static>) -> Self {
        Self {
            device: SpiDevice::new(bus, chip_select),
        }
    }
}

impl SensorLink for NodeLink {
    async fn transfer(&mut self, word: u16) -> Result<u16, LinkError> {
        let outgoing = word.to_be_bytes();
        let mut incoming = [0u8; 2];
        let transfer = self.device.transfer(&mut incoming, &outgoing);
        match with_timeout(Duration::from_micros(LINK_REPLY_TIMEOUT), transfer).await {
            Ok(Ok(())) => Ok(u16::from_be_bytes(incoming)),
            Ok(Err(_)) => Err(LinkError::Bus),
            Err(_) => Err(LinkError::Timeout),
        }
    }
}
