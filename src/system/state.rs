//! Play state
//!
//! The role a robot plays in the pair and what it knows about its peer.
//!
//! # Roles
//! - Attack: chase the ball and score
//! - Defend: hold position in front of the own goal
//! - Undecided: no peer contact, or no ball seen by either robot
//!
//! Only [`crate::system::play_mode::PlayModeCoordinator`] changes the role; the
//! rest of the crate reads it as a [`PlayState`] value.

use crate::sensing::ball::BallObservation;

/// Role of a robot in the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub enum PlayMode {
    #[default]
    Undecided,
    Attack,
    Defend,
}

impl PlayMode {
    /// Tag of the mode in radio frames
    pub fn tag(self) -> u8 {
        match self {
            PlayMode::Undecided => 0,
            PlayMode::Attack => 1,
            PlayMode::Defend => 2,
        }
    }

    /// Decodes a radio tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(PlayMode::Undecided),
            1 => Some(PlayMode::Attack),
            2 => Some(PlayMode::Defend),
            _ => None,
        }
    }

    /// The role the peer should take when this robot plays `self`
    pub fn opposite(self) -> Self {
        match self {
            PlayMode::Undecided => PlayMode::Undecided,
            PlayMode::Attack => PlayMode::Defend,
            PlayMode::Defend => PlayMode::Attack,
        }
    }
}

/// Role plus the attacking-backwards transient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct PlayState {
    pub mode: PlayMode,
    /// Just took over from defending and still faces the own goal
    pub attacking_backwards: bool,
}

/// Last report received from the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct PeerState {
    pub ball: BallObservation,
    pub heading: u16,
    pub mode: PlayMode,
    /// Receive time (µs)
    pub last_update: u64,
}

impl PeerState {
    /// Whether the report is older than `timeout`
    pub fn is_stale(&self, now: u64, timeout: u64) -> bool {
        now.saturating_sub(self.last_update) > timeout
    }
}
