//! Pixy2 camera on the shared I2C bus
//!
//! Uses the camera's "get blocks" request for the two goal signatures. The reply
//! is a 6-byte header followed by 14 bytes per block; a reply whose checksum
//! does not match is dropped as an empty poll.

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal_async::i2c::I2c as _;

use crate::config::{COLOUR_SIG_ATTACK, COLOUR_SIG_DEFEND, PIXY_MAX_BLOBS};
use crate::sensing::goal::Blob;
use crate::system::io::{Blobs, VisionSource};
use crate::task::bus::I2cBus;

const ADDRESS: u8 = 0x54;
const SYNC: [u8; 2] = [0xAE, 0xC1];
const REPLY_SYNC: [u8; 2] = [0xAF, 0xC1];
const GET_BLOCKS: u8 = 32;
const BLOCKS_REPLY: u8 = 33;
const HEADER_LEN: usize = 6;
const BLOCK_LEN: usize = 14;
const PAYLOAD_MAX: usize = BLOCK_LEN * PIXY_MAX_BLOBS;

pub struct Camera {
    device: I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>,
}

impl Camera {
    pub fn new(bus: &'static I2cBus) -> Self {
        Self {
            device: I2cDevice::new(bus),
        }
    }

    async fn get_blocks(&mut self) -> Option<Blobs> {
        let signatures = (1u8 << (COLOUR_SIG_ATTACK - 1)) | (1u8 << (COLOUR_SIG_DEFEND - 1));
        let request = [SYNC[0], SYNC[1], GET_BLOCKS, 2, signatures, PIXY_MAX_BLOBS as u8];

        let mut header = [0u8; HEADER_LEN];
        if let Err(e) = self.device.write_read(ADDRESS, &request, &mut header).await {
            log_warn!("camera: request failed {:?}", e);
            return None;
        }
        if header[..2] != REPLY_SYNC || header[2] != BLOCKS_REPLY {
            log_debug!("camera: unexpected reply type {}", header[2]);
            return None;
        }

        let len = (header[3] as usize).min(PAYLOAD_MAX);
        let checksum = u16::from_le_bytes([header[4], header[5]]);
        let mut payload = [0u8; PAYLOAD_MAX];
        if len > 0 {
            if let Err(e) = self.device.read(ADDRESS, &mut payload[..len]).await {
                log_warn!("camera: payload read failed {:?}", e);
                return None;
            }
        }
        let sum = payload[..len].iter().fold(0u16, |sum, b| sum.wrapping_add(*b as u16));
        if sum != checksum {
            log_debug!("camera: checksum mismatch");
            return None;
        }
        Some(parse_blocks(&payload[..len]))
    }
}

fn parse_blocks(payload: &[u8]) -> Blobs {
    let word = |block: &[u8], at: usize| u16::from_le_bytes([block[at], block[at + 1]]);
    payload
        .chunks_exact(BLOCK_LEN)
        .map(|block| Blob {
            signature: word(block, 0) as u8,
            x: word(block, 2),
            y: word(block, 4),
            width: word(block, 6),
            height: word(block, 8),
        })
        .take(PIXY_MAX_BLOBS)
        .collect()
}

impl VisionSource for Camera {
    async fn blobs(&mut self) -> Blobs {
        self.get_blocks().await.unwrap_or_default()
    }
}
