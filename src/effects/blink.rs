use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the cursor starts blinking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BlinkStart {
    /// As soon as the effects start.
    #[default]
    Immediate,

    /// Once the typing animation has finished typing its first phrase.
    AfterFirstPhrase,
}

/// A cursor that flips between visible and hidden at a fixed interval.
///
/// It knows nothing about the typing animation it accompanies.
#[derive(Clone, Debug)]
pub struct CursorBlink {
    visible: bool,
    interval: Duration,
}

impl CursorBlink {
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval("typing.cursor.interval_ms"));
        }
        Ok(Self { visible: true, interval })
    }

    /// Flip the cursor and return whether it's now visible.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
