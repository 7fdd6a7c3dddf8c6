//! Peer radio frames
//!
//! The two robots exchange a fixed 9-byte frame over a transparent serial radio:
//!
//! | byte | content                         |
//! |------|---------------------------------|
//! | 0, 1 | start marker `0xFF 0xFF`        |
//! | 2, 3 | ball bearing, big-endian (400 = no ball) |
//! | 4, 5 | ball strength, big-endian       |
//! | 6, 7 | heading, big-endian             |
//! | 8    | play mode tag                   |
//!
//! The radio may drop or split bytes, so [`FrameDecoder`] takes one byte at a
//! time and hunts for the start marker again after every frame or error.

use heapless::Vec;

use crate::config::{XBEE_PACKET_SIZE, XBEE_START};
use crate::sensing::ball::BallObservation;
use crate::system::state::PlayMode;

/// Decoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum FrameError {
    /// Wrong number of bytes
    Length,
    /// Missing start marker
    Start,
    /// Unknown play mode tag
    Mode(u8),
}

/// What a robot tells its peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct RadioFrame {
    pub ball: BallObservation,
    pub heading: u16,
    pub mode: PlayMode,
}

impl RadioFrame {
    pub fn encode(&self) -> [u8; XBEE_PACKET_SIZE] {
        let bearing = self.ball.bearing_word().to_be_bytes();
        let strength = self.ball.strength.to_be_bytes();
        let heading = self.heading.to_be_bytes();
        [
            XBEE_START,
            XBEE_START,
            bearing[0],
            bearing[1],
            strength[0],
            strength[1],
            heading[0],
            heading[1],
            self.mode.tag(),
        ]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() != XBEE_PACKET_SIZE {
            return Err(FrameError::Length);
        }
        if bytes[0] != XBEE_START || bytes[1] != XBEE_START {
            return Err(FrameError::Start);
        }
        let word = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);
        let mode = PlayMode::from_tag(bytes[8]).ok_or(FrameError::Mode(bytes[8]))?;
        Ok(Self {
            ball: BallObservation {
                bearing: BallObservation::bearing_from_word(word(2)),
                strength: word(4),
            },
            heading: word(6) % 360,
            mode,
        })
    }
}

/// Byte-at-a-time frame assembler
#[derive(Default)]
pub struct FrameDecoder {
    buffer: Vec<u8, XBEE_PACKET_SIZE>,
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feeds one received byte; yields a result once a whole frame is in
    pub fn push(&mut self, byte: u8) -> Option<Result<RadioFrame, FrameError>> {
        match self.buffer.len() {
            0 | 1 if byte != XBEE_START => {
                self.buffer.clear();
                return None;
            }
            // A third start byte means the first one was stray
            2 if byte == XBEE_START => return None,
            _ => {}
        }

        // Cannot overflow: the buffer is drained as soon as it is full
        let _ = self.buffer.push(byte);
        if self.buffer.is_full() {
            let result = RadioFrame::decode(&self.buffer);
            self.buffer.clear();
            return Some(result);
        }
        None
    }

    /// Drops a partial frame
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> RadioFrame {
        RadioFrame {
            ball: BallObservation::new(Some(270), 140),
            heading: 359,
            mode: PlayMode::Defend,
        }
    }

    #[test]
    fn byte_layout() {
        let bytes = frame().encode();
        assert_eq!(bytes, [0xFF, 0xFF, 0x01, 0x0E, 0x00, 0x8C, 0x01, 0x67, 2]);
        assert_eq!(RadioFrame::decode(&bytes), Ok(frame()));
    }

    #[test]
    fn no_ball_uses_sentinel() {
        let bytes = RadioFrame {
            ball: BallObservation::NONE,
            heading: 0,
            mode: PlayMode::Undecided,
        }
        .encode();
        assert_eq!(&bytes[2..4], &[0x01, 0x90]);
        assert_eq!(RadioFrame::decode(&bytes).map(|f| f.ball.bearing), Ok(None));
    }

    #[test]
    fn rejects_malformed_frames() {
        let mut bytes = frame().encode();
        assert_eq!(RadioFrame::decode(&bytes[..8]), Err(FrameError::Length));
        bytes[8] = 7;
        assert_eq!(RadioFrame::decode(&bytes), Err(FrameError::Mode(7)));
        bytes[0] = 0;
        assert_eq!(RadioFrame::decode(&bytes), Err(FrameError::Start));
    }

    #[test]
    fn decoder_resyncs_on_garbage() {
        let mut decoder = FrameDecoder::new();
        let mut results = std::vec::Vec::new();
        let stream = [0x12, 0xFF, 0x34, 0xFF, 0xFF, 0xFF]
            .into_iter()
            .chain(frame().encode().into_iter().skip(2));
        for byte in stream {
            if let Some(result) = decoder.push(byte) {
                results.push(result);
            }
        }
        assert_eq!(results, [Ok(frame())]);
    }

    #[test]
    fn decoder_reports_bad_mode_and_continues() {
        let mut decoder = FrameDecoder::new();
        let mut bad = frame().encode();
        bad[8] = 9;
        let results: std::vec::Vec<_> = bad
            .into_iter()
            .chain(frame().encode())
            .filter_map(|byte| decoder.push(byte))
            .collect();
        assert_eq!(results, [Err(FrameError::Mode(9)), Ok(frame())]);
    }
}
