//! Sensing node to control node link
//!
//! The sensing nodes (IR ring, line sensors) answer single-word requests from the
//! control node. The link hardware double-buffers: the word clocked out during a
//! transaction was staged during the *previous* one. The control node therefore
//! sends every command [`LINK_REPEAT`] times and trusts the last reply; by then
//! the command has settled on the responder and its reply has been latched.
//!
//! There is no sequence number or checksum. A corrupted or shifted word goes
//! unnoticed until the next request; repeating the command is the only recovery.
//!
//! # Responder side
//! The sensing node's main loop publishes its latest results into a [`ReplyCache`],
//! one atomic word per value. The transaction handler ([`Responder::on_transaction`])
//! decodes the incoming command and stages the matching cached word for the next
//! transaction. It never waits and never allocates.

pub mod radio;

use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::{LINK_REPEAT, TSOP_NO_BALL};
use crate::sensing::ball::BallObservation;
use crate::sensing::line::LineReading;

/// Requests understood by the sensing nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
#[repr(u16)]
pub enum Command {
    None = 0,
    LinePosition = 1,
    OrbitAngle = 2,
    OrbitSpeed = 3,
    HasBallTsop = 4,
}

impl Command {
    /// Decodes a request word, `None` for unknown codes
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Command::None),
            1 => Some(Command::LinePosition),
            2 => Some(Command::OrbitAngle),
            3 => Some(Command::OrbitSpeed),
            4 => Some(Command::HasBallTsop),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Transport failures seen by the control node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum LinkError {
    /// No reply word arrived in time
    Timeout,
    /// The bus reported an error
    Bus,
}

/// One word-sized transaction with a sensing node
#[allow(async_fn_in_trait)]
pub trait SensorLink {
    /// Clocks `word` out and returns the word clocked in during the same transaction
    async fn transfer(&mut self, word: u16) -> Result<u16, LinkError>;
}

/// Latest results of a sensing node, one atomic word each
///
/// Written by the node's main loop, read by the transaction handler. Every value
/// fits one word, so a reader sees either the old or the new value, never a mix.
pub struct ReplyCache {
    bearing: AtomicU16,
    strength: AtomicU16,
    has_ball: AtomicU16,
    line: AtomicU16,
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyCache {
    pub const fn new() -> Self {
        Self {
            bearing: AtomicU16::new(TSOP_NO_BALL),
            strength: AtomicU16::new(0),
            has_ball: AtomicU16::new(0),
            line: AtomicU16::new(0),
        }
    }

    /// Publishes a finished ball window
    pub fn publish_ball(&self, observation: BallObservation, has_ball: bool) {
        self.bearing.store(observation.bearing_word(), Ordering::Release);
        self.strength.store(observation.strength, Ordering::Release);
        self.has_ball.store(has_ball as u16, Ordering::Release);
    }

    /// Publishes the latest line reading
    pub fn publish_line(&self, reading: LineReading) {
        self.line.store(reading.pack(), Ordering::Release);
    }

    pub fn bearing(&self) -> u16 {
        self.bearing.load(Ordering::Acquire)
    }

    pub fn strength(&self) -> u16 {
        self.strength.load(Ordering::Acquire)
    }

    pub fn has_ball(&self) -> u16 {
        self.has_ball.load(Ordering::Acquire)
    }

    pub fn line(&self) -> u16 {
        self.line.load(Ordering::Acquire)
    }
}

/// Per-node answer table
pub trait CommandHandler {
    /// Reply word for `command`, or `None` to leave the staged reply untouched
    fn reply(&self, command: Command, cache: &ReplyCache) -> Option<u16>;
}

/// Answers of the IR ring node
pub struct TsopHandler;

impl CommandHandler for TsopHandler {
    fn reply(&self, command: Command, cache: &ReplyCache) -> Option<u16> {
        match command {
            Command::OrbitAngle => Some(cache.bearing()),
            Command::OrbitSpeed => Some(cache.strength()),
            Command::HasBallTsop => Some(cache.has_ball()),
            Command::None | Command::LinePosition => None,
        }
    }
}

/// Answers of the line sensor node
pub struct LineHandler;

impl CommandHandler for LineHandler {
    fn reply(&self, command: Command, cache: &ReplyCache) -> Option<u16> {
        match command {
            Command::LinePosition => Some(cache.line()),
            _ => None,
        }
    }
}

/// Transaction handler of a sensing node
pub struct Responder<'a, H> {
    handler: H,
    cache: &'a ReplyCache,
    staged: AtomicU16,
}

impl<'a, H: CommandHandler> Responder<'a, H> {
    pub const fn new(handler: H, cache: &'a ReplyCache) -> Self {
        Self {
            handler,
            cache,
            staged: AtomicU16::new(0),
        }
    }

    /// Handles one transaction
    ///
    /// Returns the word clocked out during this transaction (staged by the
    /// previous one) and stages the reply to `word` for the next.
    pub fn on_transaction(&self, word: u16) -> u16 {
        let outgoing = self.staged.load(Ordering::Acquire);
        match Command::from_code(word) {
            Some(command) => {
                if let Some(reply) = self.handler.reply(command, self.cache) {
                    self.staged.store(reply, Ordering::Release);
                }
            }
            None => log_debug!("link: unknown command {}", word),
        }
        outgoing
    }

    /// Word that goes out on the next transaction
    pub fn staged(&self) -> u16 {
        self.staged.load(Ordering::Acquire)
    }
}

/// Control node side of the link
pub struct CommandChannel<L> {
    link: L,
    repeat: usize,
}

impl<L: SensorLink> CommandChannel<L> {
    pub fn new(link: L) -> Self {
        Self::with_repeat(link, LINK_REPEAT)
    }

    /// Channel sending every command `repeat` times (at least once)
    pub fn with_repeat(link: L, repeat: usize) -> Self {
        Self {
            link,
            repeat: repeat.max(1),
        }
    }

    /// Sends `command` repeatedly and returns the last reply
    pub async fn request(&mut self, command: Command) -> Result<u16, LinkError> {
        let mut reply = 0;
        for _ in 0..self.repeat {
            reply = self.link.transfer(command.code()).await?;
        }
        Ok(reply)
    }

    /// Ball bearing, `None` when no ball is seen or the link failed
    pub async fn orbit_angle(&mut self) -> Option<u16> {
        match self.request(Command::OrbitAngle).await {
            Ok(word) => BallObservation::bearing_from_word(word),
            Err(error) => {
                log_warn!("link: orbit angle request failed: {:?}", error);
                None
            }
        }
    }

    /// Ball strength, 0 when the link failed
    pub async fn orbit_speed(&mut self) -> u16 {
        match self.request(Command::OrbitSpeed).await {
            Ok(word) => word,
            Err(error) => {
                log_warn!("link: orbit speed request failed: {:?}", error);
                0
            }
        }
    }

    /// Whether the IR node sees the ball in the grip, false when the link failed
    pub async fn has_ball(&mut self) -> bool {
        match self.request(Command::HasBallTsop).await {
            Ok(word) => word != 0,
            Err(error) => {
                log_warn!("link: has-ball request failed: {:?}", error);
                false
            }
        }
    }

    /// Bearing and strength in one go
    pub async fn ball(&mut self) -> BallObservation {
        let bearing = self.orbit_angle().await;
        let strength = self.orbit_speed().await;
        BallObservation { bearing, strength }
    }

    /// Line reading, no line when the link failed
    pub async fn line_reading(&mut self) -> LineReading {
        match self.request(Command::LinePosition).await {
            Ok(word) => LineReading::unpack(word),
            Err(error) => {
                log_warn!("link: line request failed: {:?}", error);
                LineReading::NONE
            }
        }
    }

    pub fn into_inner(self) -> L {
        self.link
    }
}
