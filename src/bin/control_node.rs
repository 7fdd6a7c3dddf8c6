//! Control node firmware entry point
//!
//! Sets up the buses and spawns the control, radio, motor and indicator tasks.
//! Build with `ROBOT_ID` set to this robot's identity (0 or 1).

#![no_std]
#![no_main]

use assign_resources::assign_resources;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{self, I2C0, UART0};
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{self, Uart, UartTx};
use soccer_robot::config::{LINK_FREQUENCY, MOTOR_BAUD, XBEE_BAUD};
use soccer_robot::link::CommandChannel;
use soccer_robot::task::{
    bus,
    camera::Camera,
    compass::Compass,
    control_loop::{control_loop, ControlHardware},
    led_indicate::led_indicate,
    motor_forward::motor_forward,
    node_link::NodeLink,
    radio::{radio_receive, radio_send},
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

assign_resources! {
    /// XBee radio
    radio: RadioResources {
        uart: UART0,
        tx: PIN_0,
        rx: PIN_1,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
    /// Motor controller, transmit only
    motor: MotorResources {
        uart: UART1,
        tx: PIN_4,
        dma: DMA_CH2,
    },
    /// Sensing-node link, one chip select per node
    link: LinkResources {
        spi: SPI0,
        clk: PIN_18,
        mosi: PIN_19,
        miso: PIN_16,
        tx_dma: DMA_CH3,
        rx_dma: DMA_CH4,
        tsop_cs: PIN_17,
        line_cs: PIN_20,
    },
    /// Compass and camera
    i2c: I2cResources {
        i2c: I2C0,
        sda: PIN_12,
        scl: PIN_13,
    },
    /// Indicator LED
    led: LedResources {
        pin: PIN_25,
    },
}

bind_interrupts!(struct Irqs {
    UART0_IRQ => uart::InterruptHandler<UART0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    // Buses first; the control loop's devices borrow them for the rest of the run
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let i2c_bus = bus::init_i2c(I2c::new_async(r.i2c.i2c, r.i2c.scl, r.i2c.sda, Irqs, i2c_config));

    let mut spi_config = spi::Config::default();
    spi_config.frequency = LINK_FREQUENCY;
    spi_config.phase = spi::Phase::CaptureOnSecondTransition;
    spi_config.polarity = spi::Polarity::IdleLow;
    let spi_bus = bus::init_spi(Spi::new(
        r.link.spi,
        r.link.clk,
        r.link.mosi,
        r.link.miso,
        r.link.tx_dma,
        r.link.rx_dma,
        spi_config,
    ));

    let mut radio_config = uart::Config::default();
    radio_config.baudrate = XBEE_BAUD;
    let radio = Uart::new(
        r.radio.uart,
        r.radio.tx,
        r.radio.rx,
        Irqs,
        r.radio.tx_dma,
        r.radio.rx_dma,
        radio_config,
    );
    let (radio_tx, radio_rx) = radio.split();

    let mut motor_config = uart::Config::default();
    motor_config.baudrate = MOTOR_BAUD;
    let motor_tx = UartTx::new(r.motor.uart, r.motor.tx, r.motor.dma, motor_config);

    let hardware = ControlHardware {
        compass: Compass::new(i2c_bus),
        camera: Camera::new(i2c_bus),
        ball: CommandChannel::new(NodeLink::new(spi_bus, Output::new(r.link.tsop_cs, Level::High))),
        line: CommandChannel::new(NodeLink::new(spi_bus, Output::new(r.link.line_cs, Level::High))),
    };

    spawner.spawn(radio_receive(radio_rx)).unwrap();
    spawner.spawn(radio_send(radio_tx)).unwrap();
    spawner.spawn(motor_forward(motor_tx)).unwrap();
    spawner.spawn(led_indicate(Output::new(r.led.pin, Level::Low))).unwrap();
    spawner.spawn(control_loop(hardware)).unwrap();
}
