//! Sensing node end of the link: SPI0 as a slave
//!
//! embassy-rp only drives SPI as a master, so the driver is used to claim and
//! configure the pins, then the peripheral is switched to slave mode through the
//! PAC. Incoming bytes raise `SPI0_IRQ`; every second byte completes a command
//! word, which goes to the [`Responder`], and the newly staged reply is queued
//! in the transmit FIFO for the next transaction.
//!
//! Wiring: the control node's TX (GPIO19) goes to our RX (GPIO16) and our TX
//! (GPIO19) back to its RX (GPIO16). SCK and CSn are shared pin for pin.

use core::sync::atomic::{AtomicU16, Ordering};

use embassy_rp::gpio::Pin;
use embassy_rp::interrupt;
use embassy_rp::interrupt::InterruptExt;
use embassy_rp::pac;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};

use crate::link::{ReplyCache, Responder, TsopHandler};

/// Latest results of this node, published by the sampling task
pub static REPLY_CACHE: ReplyCache = ReplyCache::new();

static RESPONDER: Responder<'static, TsopHandler> = Responder::new(TsopHandler, &REPLY_CACHE);

/// No high byte is waiting for its low byte
const NO_PENDING: u16 = u16::MAX;

/// High byte of the word currently being received
static PENDING: AtomicU16 = AtomicU16::new(NO_PENDING);

/// GPIO function number of the SPI blocks
const FUNCSEL_SPI: u8 = 1;

/// Switches SPI0 to slave mode and starts answering transactions
pub fn start(spi: Spi<'static, SPI0, Blocking>, chip_select: impl Pin) {
    let cs = chip_select.pin() as usize;
    pac::IO_BANK0.gpio(cs).ctrl().write(|w| w.set_funcsel(FUNCSEL_SPI));
    pac::PADS_BANK0.gpio(cs).modify(|w| {
        w.set_ie(true);
        w.set_iso(false);
    });

    let regs = pac::SPI0;
    regs.cr1().modify(|w| w.set_sse(false));
    regs.cr1().modify(|w| w.set_ms(true));
    queue_word(regs, RESPONDER.staged());
    regs.imsc().write(|w| {
        w.set_rxim(true);
        w.set_rtim(true);
    });
    regs.cr1().modify(|w| w.set_sse(true));

    // pins and clocks stay configured; the master-mode driver is not used again
    core::mem::forget(spi);

    interrupt::SPI0_IRQ.unpend();
    unsafe { interrupt::SPI0_IRQ.enable() };
    log_info!("link: responding on SPI0");
}

fn queue_word(regs: pac::spi::Spi, word: u16) {
    for byte in word.to_be_bytes() {
        if regs.sr().read().tnf() {
            regs.dr().write(|w| w.set_data(byte as u16));
        }
    }
}

#[interrupt]
fn SPI0_IRQ() {
    let regs = pac::SPI0;
    while regs.sr().read().rne() {
        let byte = regs.dr().read().data() & 0xFF;
        let high = PENDING.swap(NO_PENDING, Ordering::Relaxed);
        if high == NO_PENDING {
            PENDING.store(byte, Ordering::Relaxed);
        } else {
            RESPONDER.on_transaction((high << 8) | byte);
            queue_word(regs, RESPONDER.staged());
        }
    }
    regs.icr().write(|w| w.set_rtic(true));
}
