use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// One step of a scripted input sequence.
///
/// A closed tagged union: a descriptor with an unknown `type` tag is a
/// deserialization error, not a silent no-op. Each descriptor is consumed
/// exactly once, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Press and release one button. `hold_time` defaults to 0.2 s.
    Press {
        button: String,
        #[serde(default)]
        hold_time: Option<f64>,
    },
    /// Hold one or more buttons down in a single batched input call.
    Hold { buttons: Vec<String> },
    /// Release one or more buttons in a single batched input call.
    Release { buttons: Vec<String> },
    /// Sleep; `time` defaults to the sequence's inter-action delay, and the
    /// wait substitutes for that delay.
    Wait {
        #[serde(default)]
        time: Option<f64>,
    },
}

/// Compass direction mapped onto the d-pad buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Name of the controller button this direction maps to.
    pub fn button(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => bail!("invalid direction: {other}"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.button())
    }
}

/// One menu-navigation step: an optional directional move followed by an
/// optional confirm press and an optional trailing delay.
///
/// `direction` stays a free-form string on purpose: an absent or
/// unparseable direction skips the movement sub-step without an error, so
/// a selection list can mix pure-confirm and pure-delay steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSelection {
    pub direction: Option<String>,
    pub steps: u32,
    pub confirm: bool,
    pub confirm_button: String,
    pub delay_after: f64,
}

impl Default for MenuSelection {
    fn default() -> Self {
        Self {
            direction: None,
            steps: 1,
            confirm: false,
            confirm_button: "A".to_string(),
            delay_after: 0.0,
        }
    }
}
