//! XBee radio tasks
//!
//! The radio is a transparent serial bridge to the peer robot. Receiving and
//! sending run as separate tasks on the two halves of the UART.

use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, UartRx, UartTx};

use crate::link::radio::FrameDecoder;
use crate::system::peer;

/// Decodes peer reports byte by byte and hands them to the control loop
#[embassy_executor::task]
pub async fn radio_receive(mut rx: UartRx<'static, UART0, uart::Async>) {
    let mut decoder = FrameDecoder::new();
    let mut byte = [0u8; 1];

    loop {
        if let Err(e) = rx.read(&mut byte).await {
            log_warn!("radio: receive failed {:?}", e);
            decoder.reset();
            continue;
        }
        match decoder.push(byte[0]) {
            Some(Ok(frame)) => peer::received(frame),
            Some(Err(e)) => log_debug!("radio: dropped frame {:?}", e),
            None => {}
        }
    }
}

/// Sends every report the control loop queues
#[embassy_executor::task]
pub async fn radio_send(mut tx: UartTx<'static, UART0, uart::Async>) {
    loop {
        let frame = peer::wait_outgoing().await;
        if let Err(e) = tx.write(&frame.encode()).await {
            log_warn!("radio: send failed {:?}", e);
        }
    }
}
