//! IR sensing node firmware entry point
//!
//! Samples the receiver ring and answers the control node over SPI.

#![no_std]
#![no_main]

use assign_resources::assign_resources;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals;
use embassy_rp::spi::{self, Spi};
use soccer_robot::config::{LED_BLINK_TIME_SLAVE_TSOP, LINK_FREQUENCY};
use soccer_robot::task::{led_indicate::led_blink, link_respond, tsop_sample::tsop_sample};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

assign_resources! {
    /// Link to the control node, SPI0 in slave mode
    link: LinkResources {
        spi: SPI0,
        clk: PIN_18,
        tx: PIN_19,
        rx: PIN_16,
        cs: PIN_17,
    },
    /// IR receivers, clockwise from straight ahead
    receivers: ReceiverResources {
        r0: PIN_0,
        r1: PIN_1,
        r2: PIN_2,
        r3: PIN_3,
        r4: PIN_4,
        r5: PIN_5,
        r6: PIN_6,
        r7: PIN_7,
        r8: PIN_8,
        r9: PIN_9,
        r10: PIN_10,
        r11: PIN_11,
        r12: PIN_12,
        r13: PIN_13,
        r14: PIN_14,
        r15: PIN_15,
        r16: PIN_20,
        r17: PIN_21,
        r18: PIN_22,
        r19: PIN_23,
        r20: PIN_24,
        r21: PIN_26,
        r22: PIN_27,
        r23: PIN_28,
    },
    /// Receiver supply switch, low = off
    unlock: UnlockResources {
        pin: PIN_29,
    },
    /// Heartbeat LED
    led: LedResources {
        pin: PIN_25,
    },
}

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    let rx = r.receivers;
    let receivers = [
        Input::new(rx.r0, Pull::Up),
        Input::new(rx.r1, Pull::Up),
        Input::new(rx.r2, Pull::Up),
        Input::new(rx.r3, Pull::Up),
        Input::new(rx.r4, Pull::Up),
        Input::new(rx.r5, Pull::Up),
        Input::new(rx.r6, Pull::Up),
        Input::new(rx.r7, Pull::Up),
        Input::new(rx.r8, Pull::Up),
        Input::new(rx.r9, Pull::Up),
        Input::new(rx.r10, Pull::Up),
        Input::new(rx.r11, Pull::Up),
        Input::new(rx.r12, Pull::Up),
        Input::new(rx.r13, Pull::Up),
        Input::new(rx.r14, Pull::Up),
        Input::new(rx.r15, Pull::Up),
        Input::new(rx.r16, Pull::Up),
        Input::new(rx.r17, Pull::Up),
        Input::new(rx.r18, Pull::Up),
        Input::new(rx.r19, Pull::Up),
        Input::new(rx.r20, Pull::Up),
        Input::new(rx.r21, Pull::Up),
        Input::new(rx.r22, Pull::Up),
        Input::new(rx.r23, Pull::Up),
    ];
    let unlock = Output::new(r.unlock.pin, Level::High);

    // Master-mode settings for pin setup; the responder flips the block to slave
    let mut spi_config = spi::Config::default();
    spi_config.frequency = LINK_FREQUENCY;
    spi_config.phase = spi::Phase::CaptureOnSecondTransition;
    spi_config.polarity = spi::Polarity::IdleLow;
    let spi = Spi::new_blocking(r.link.spi, r.link.clk, r.link.tx, r.link.rx, spi_config);
    link_respond::start(spi, r.link.cs);

    spawner.spawn(tsop_sample(receivers, unlock)).unwrap();
    spawner
        .spawn(led_blink(Output::new(r.led.pin, Level::Low), LED_BLINK_TIME_SLAVE_TSOP))
        .unwrap();
}
