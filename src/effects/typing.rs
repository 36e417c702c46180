use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the animator walks through its phrases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TypingMode {
    /// Type, pause, delete and move on to the next phrase, forever.
    #[default]
    Cycle,

    /// Type every phrase once, each into its own line, then stop.
    Once,
}

/// The delays between animation steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypingTimings {
    pub type_interval: Duration,
    pub delete_interval: Duration,
    pub pause: Duration,
}

impl TypingTimings {
    /// Make sure every delay is non zero so the animation always moves forward in time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.type_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("typing.type_interval_ms"));
        }
        if self.delete_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("typing.delete_interval_ms"));
        }
        if self.pause.is_zero() {
            return Err(ConfigError::ZeroInterval("typing.pause_ms"));
        }
        Ok(())
    }
}

impl Default for TypingTimings {
    fn default() -> Self {
        Self {
            type_interval: Duration::from_millis(100),
            delete_interval: Duration::from_millis(50),
            pause: Duration::from_millis(1500),
        }
    }
}

/// The animator's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypingState {
    /// The phrase being typed or deleted.
    pub phrase_index: usize,

    /// How many characters of the current phrase are displayed.
    pub char_index: usize,

    /// Whether characters are being removed rather than added.
    pub is_deleting: bool,

    /// Set once the last line has been typed in [TypingMode::Once].
    pub done: bool,
}

/// What a single tick displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    /// The display slot to render into: always 0 when cycling, the line index when typing once.
    pub slot: usize,

    /// The text the slot should now show.
    pub text: &'a str,

    /// Whether this tick finished typing a phrase.
    pub completed: bool,

    /// How long to wait before the next tick, or `None` if this was the last one.
    pub next: Option<Duration>,
}

#[derive(Clone, Debug)]
struct Phrase {
    text: String,
    length: usize,
}

impl Phrase {
    fn new(text: String) -> Self {
        let length = text.chars().count();
        Self { text, length }
    }

    fn prefix(&self, count: usize) -> &str {
        match self.text.char_indices().nth(count) {
            Some((offset, _)) => &self.text[..offset],
            None => &self.text,
        }
    }
}

/// A typewriter that types and deletes phrases one character at a time.
///
/// The animator only computes what to display and when; it's up to the caller to render each
/// [Frame] and to call [TypingAnimator::tick] again once [Frame::next] has elapsed.
#[derive(Clone, Debug)]
pub struct TypingAnimator {
    phrases: Vec<Phrase>,
    mode: TypingMode,
    timings: TypingTimings,
    state: TypingState,
}

impl TypingAnimator {
    pub fn new(phrases: Vec<String>, mode: TypingMode, timings: TypingTimings) -> Result<Self, ConfigError> {
        if phrases.is_empty() {
            return Err(ConfigError::NoPhrases);
        }
        timings.validate()?;
        let phrases = phrases.into_iter().map(Phrase::new).collect();
        Ok(Self { phrases, mode, timings, state: TypingState::default() })
    }

    pub fn state(&self) -> &TypingState {
        &self.state
    }

    pub fn mode(&self) -> TypingMode {
        self.mode
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Run one step of the animation.
    ///
    /// Returns `None` once a [TypingMode::Once] animation has typed its last line.
    pub fn tick(&mut self) -> Option<Frame<'_>> {
        if self.state.done {
            return None;
        }
        let phrase_index = self.state.phrase_index;
        let length = self.phrases[phrase_index].length;
        let slot = match self.mode {
            TypingMode::Cycle => 0,
            TypingMode::Once => phrase_index,
        };

        let deleting = self.state.is_deleting;
        let interval = if deleting {
            self.state.char_index = self.state.char_index.saturating_sub(1);
            self.timings.delete_interval
        } else {
            // Clamped so an empty phrase lands straight on its (zero) length.
            self.state.char_index = (self.state.char_index + 1).min(length);
            self.timings.type_interval
        };
        let shown = self.state.char_index;

        let completed = !deleting && shown == length;
        let next = if completed {
            self.complete_phrase()
        } else if deleting && shown == 0 {
            self.state.is_deleting = false;
            self.state.phrase_index = (phrase_index + 1) % self.phrases.len();
            Some(interval)
        } else {
            Some(interval)
        };

        let text = self.phrases[phrase_index].prefix(shown);
        Some(Frame { slot, text, completed, next })
    }

    fn complete_phrase(&mut self) -> Option<Duration> {
        match self.mode {
            TypingMode::Cycle => {
                self.state.is_deleting = true;
                Some(self.timings.pause)
            }
            TypingMode::Once if self.state.phrase_index + 1 < self.phrases.len() => {
                self.state.phrase_index += 1;
                self.state.char_index = 0;
                Some(self.timings.pause)
            }
            TypingMode::Once => {
                self.state.done = true;
                None
            }
        }
    }
}
