//! Simulation Timestamp Types
//!
//! Simulated time is counted in episodes, each made of numbered days.
//!
//! # Example
//!
//! ```
//! use forage_events::SimDay;
//!
//! let at = SimDay::new(2, 4);
//! assert_eq!(at.to_string(), "episode_2.day_4");
//! assert_eq!("episode_2.day_4".parse::<SimDay>().unwrap(), at);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A day within an episode.
///
/// Episodes are counted from 0, days from 1 (the world's day counter is
/// incremented before the first agent acts).
///
/// Serializes to strings like "episode_3.day_2".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimDay {
    pub episode: u32,
    pub day: u32,
}

impl SimDay {
    pub fn new(episode: u32, day: u32) -> Self {
        Self { episode, day }
    }
}

impl fmt::Display for SimDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "episode_{}.day_{}", self.episode, self.day)
    }
}

/// Error type for parsing SimDay from strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseDayError {
    #[error("invalid day format: '{0}', expected 'episode_N.day_M'")]
    InvalidFormat(String),
    #[error("invalid episode: '{0}'")]
    InvalidEpisode(String),
    #[error("invalid day: '{0}'")]
    InvalidDay(String),
}

impl FromStr for SimDay {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (episode_part, day_part) = s
            .split_once('.')
            .ok_or_else(|| ParseDayError::InvalidFormat(s.to_string()))?;

        let episode = episode_part
            .strip_prefix("episode_")
            .ok_or_else(|| ParseDayError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseDayError::InvalidEpisode(episode_part.to_string()))?;

        let day = day_part
            .strip_prefix("day_")
            .ok_or_else(|| ParseDayError::InvalidFormat(s.to_string()))?
            .parse::<u32>()
            .map_err(|_| ParseDayError::InvalidDay(day_part.to_string()))?;

        Ok(SimDay { episode, day })
    }
}

impl Serialize for SimDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SimDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
