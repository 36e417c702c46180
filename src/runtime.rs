use crate::{
    config::{SiteConfig, TypingConfig},
    effects::{BlinkStart, CursorBlink, Pollable, PollableState, ScrollSpy, TypingAnimator, TypingState},
    page::Page,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, warn};

/// Drives the page effects from a single repeating tick.
///
/// The runtime is created by [EffectsRuntime::start], advanced by calling
/// [EffectsRuntime::poll] with the time elapsed since then, and told about scrolling through
/// [EffectsRuntime::on_scroll]. [EffectsRuntime::stop] drops every scheduled effect.
pub struct EffectsRuntime {
    typing: Option<TypingEffect>,
    blink: Option<BlinkEffect>,
    pending_blink: Option<BlinkEffect>,
    spy: ScrollSpy,
    running: bool,
}

impl EffectsRuntime {
    /// Set up the effects for a page.
    ///
    /// Effects whose elements aren't on the page are skipped. An invalid config only gets the
    /// scroll spy. This never touches the page.
    pub fn start(config: &SiteConfig, page: &dyn Page) -> Self {
        let mut runtime = Self {
            typing: None,
            blink: None,
            pending_blink: None,
            spy: ScrollSpy::new(config.scroll_spy.bias),
            running: true,
        };
        if let Err(e) = config.validate() {
            warn!("timed page effects disabled: {e}");
            return runtime;
        }
        runtime.typing = TypingEffect::new(&config.typing, page);
        let cursor = &config.typing.cursor;
        if runtime.typing.is_none() {
            return runtime;
        }
        if !page.has_element(&cursor.target) {
            debug!("cursor element '{}' not on page, not blinking", cursor.target);
            return runtime;
        }
        match CursorBlink::new(cursor.interval()) {
            Ok(blink) => {
                let effect = BlinkEffect::new(cursor.target.clone(), blink);
                match cursor.start {
                    BlinkStart::Immediate => runtime.blink = Some(effect.starting_at(Duration::ZERO)),
                    BlinkStart::AfterFirstPhrase => runtime.pending_blink = Some(effect),
                }
            }
            Err(e) => warn!("cursor blink disabled: {e}"),
        }
        runtime
    }

    /// Run every step that is due at `now`.
    pub fn poll(&mut self, now: Duration, page: &mut dyn Page) -> PollableState {
        if !self.running {
            return PollableState::Unmodified;
        }
        let mut state = PollableState::Unmodified;
        if let Some(typing) = &mut self.typing {
            state = typing.poll(now, page);
            if let Some(completed_at) = typing.first_completed_at {
                if let Some(blink) = self.pending_blink.take() {
                    debug!("first phrase typed at {completed_at:?}, starting cursor blink");
                    self.blink = Some(blink.starting_at(completed_at));
                }
            }
        }
        if let Some(blink) = &mut self.blink {
            state = state.merge(blink.poll(now, page));
        }
        state
    }

    /// Handle a scroll notification, returning the id of the now active section.
    pub fn on_scroll(&mut self, page: &mut dyn Page) -> Option<String> {
        if !self.running {
            return None;
        }
        self.spy.highlight(page)
    }

    /// When the next timed step is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        if !self.running {
            return None;
        }
        let typing = self.typing.as_ref().and_then(|typing| typing.next_deadline());
        let blink = self.blink.as_ref().and_then(|blink| blink.next_deadline());
        typing.into_iter().chain(blink).min()
    }

    /// Stop all effects. The page is left as it is.
    pub fn stop(&mut self) {
        if self.running {
            debug!("stopping page effects");
        }
        self.typing = None;
        self.blink = None;
        self.pending_blink = None;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the typing animation was started.
    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    pub fn typing_state(&self) -> Option<&TypingState> {
        self.typing.as_ref().map(|typing| typing.animator.state())
    }
}

struct TypingEffect {
    animator: TypingAnimator,
    targets: Vec<String>,
    next_at: Option<Duration>,
    first_completed_at: Option<Duration>,
}

impl TypingEffect {
    fn new(config: &TypingConfig, page: &dyn Page) -> Option<Self> {
        let targets = config.targets();
        if targets.is_empty() {
            debug!("no typing targets configured, animation disabled");
            return None;
        }
        if let Some(missing) = targets.iter().find(|target| !page.has_element(target)) {
            debug!("typing target '{missing}' not on page, animation disabled");
            return None;
        }
        let animator = match TypingAnimator::new(config.phrases.clone(), config.mode, config.timings()) {
            Ok(animator) => animator,
            Err(e) => {
                warn!("typing animation disabled: {e}");
                return None;
            }
        };
        Some(Self { animator, targets, next_at: Some(config.initial_delay()), first_completed_at: None })
    }
}

impl Pollable for TypingEffect {
    fn poll(&mut self, now: Duration, page: &mut dyn Page) -> PollableState {
        let mut state = PollableState::Unmodified;
        while let Some(due) = self.next_at.filter(|due| *due <= now) {
            let Some(frame) = self.animator.tick() else {
                self.next_at = None;
                return PollableState::Done;
            };
            if let Some(target) = self.targets.get(frame.slot) {
                page.set_text(target, frame.text);
            }
            if frame.completed && self.first_completed_at.is_none() {
                self.first_completed_at = Some(due);
            }
            state = PollableState::Modified;
            match frame.next {
                Some(delay) => self.next_at = Some(due + delay),
                None => {
                    debug!("typing animation finished");
                    self.next_at = None;
                    return PollableState::Done;
                }
            }
        }
        state
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.next_at
    }
}

struct BlinkEffect {
    target: String,
    blink: CursorBlink,
    next_at: Duration,
}

impl BlinkEffect {
    fn new(target: String, blink: CursorBlink) -> Self {
        Self { target, blink, next_at: Duration::ZERO }
    }

    fn starting_at(mut self, start: Duration) -> Self {
        self.next_at = start + self.blink.interval();
        self
    }
}

impl Pollable for BlinkEffect {
    fn poll(&mut self, now: Duration, page: &mut dyn Page) -> PollableState {
        let mut state = PollableState::Unmodified;
        while self.next_at <= now {
            let visible = self.blink.toggle();
            page.set_visible(&self.target, visible);
            self.next_at += self.blink.interval();
            state = PollableState::Modified;
        }
        state
    }

    fn next_deadline(&self) -> Option<Duration> {
        Some(self.next_at)
    }
}

/// A cloneable flag used to ask a running host loop to stop.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
