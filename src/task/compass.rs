//! Tilt-compensated compass (CMPS12 register map) on the shared I2C bus
//!
//! The compass reports a magnetic bearing. The first successful read after
//! power-up is taken as "facing the attacking goal", so the robot must be
//! placed pointing at it before kick-off.

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal_async::i2c::I2c as _;

use crate::angle;
use crate::system::io::HeadingSource;
use crate::task::bus::I2cBus;

const ADDRESS: u8 = 0x60;
/// Bearing, tenths of a degree, big-endian 16 bit
const BEARING_REGISTER: u8 = 0x02;

pub struct Compass {
    device: I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>,
    zero: Option<f32>,
    last: f32,
}

impl Compass {
    pub fn new(bus: &'static I2cBus) -> Self {
        Self {
            device: I2cDevice::new(bus),
            zero: None,
            last: 0.0,
        }
    }

    async fn read_bearing(&mut self) -> Option<f32> {
        let mut raw = [0u8; 2];
        match self.device.write_read(ADDRESS, &[BEARING_REGISTER], &mut raw).await {
            Ok(()) => Some(u16::from_be_bytes(raw) as f32 / 10.0),
            Err(e) => {
                log_warn!("compass: read failed {:?}", e);
                None
            }
        }
    }
}

impl HeadingSource for Compass {
    /// Heading relative to the power-up bearing; repeats the last value on a failed read
    async fn heading(&mut self) -> f32 {
        if let Some(bearing) = self.read_bearing().await {
            let zero = *self.zero.get_or_insert(bearing);
            self.last = angle::normalize(bearing - zero);
        }
        self.last
    }
}
