//! Shared buses of the control node
//!
//! Compass and camera share I2C0. Both sensing nodes share SPI0, one chip select
//! each. The buses are created once in `main`, before any task is spawned, and
//! handed out as `'static` mutexes that the shared-bus devices lock per transfer.

use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;

/// Compass and camera bus
pub type I2cBus = Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

/// Sensing-node link bus
pub type SpiBus = Mutex<CriticalSectionRawMutex, Spi<'static, SPI0, spi::Async>>;

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();
static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();

/// Moves the I2C driver into its static mutex. Call once.
pub fn init_i2c(i2c: I2c<'static, I2C0, i2c::Async>) -> &'static I2cBus {
    I2C_BUS.init(Mutex::new(i2c))
}

/// Moves the SPI driver into its static mutex. Call once.
pub fn init_spi(spi: Spi<'static, SPI0, spi::Async>) -> &'static SpiBus {
    SPI_BUS.init(Mutex::new(spi))
}
