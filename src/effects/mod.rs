mod blink;
mod scroll_spy;
mod typing;

pub use blink::{BlinkStart, CursorBlink};
pub use scroll_spy::ScrollSpy;
pub use typing::{Frame, TypingAnimator, TypingMode, TypingState, TypingTimings};

use crate::page::Page;
use std::time::Duration;

/// The result of polling a timed effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollableState {
    /// Nothing was due, the page was not touched.
    Unmodified,

    /// One or more steps ran and the page was mutated.
    Modified,

    /// The effect ran its last step and won't mutate the page again.
    Done,
}

impl PollableState {
    /// Merge the outcome of polling two independent effects.
    pub fn merge(self, other: Self) -> Self {
        use PollableState::*;
        match (self, other) {
            (Unmodified, Unmodified) => Unmodified,
            (Done, Done) => Done,
            _ => Modified,
        }
    }
}

/// A timed effect that is driven by a repeating scheduler tick.
///
/// `now` is the time elapsed since the effects were started. An implementation runs every step
/// whose deadline is at or before `now`, so a late poll catches up rather than dropping steps.
pub trait Pollable {
    fn poll(&mut self, now: Duration, page: &mut dyn Page) -> PollableState;

    /// When the next step is due, or `None` if the effect has nothing left to do.
    fn next_deadline(&self) -> Option<Duration>;
}
