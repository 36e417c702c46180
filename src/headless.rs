//! Deterministic, display-less runs of the page effects.
//!
//! Time is virtual: the runner jumps straight from one deadline to the next, so a trace of
//! minutes of animation is computed instantly and always yields the same result.

use crate::{
    config::SiteConfig,
    effects::PollableState,
    page::{NavLink, Page, Section, StaticPage},
    runtime::EffectsRuntime,
};
use itertools::Itertools;
use serde::Serialize;
use std::{fmt, time::Duration};

/// A single observable change to the page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Change {
    Text { element: String, text: String },
    Visibility { element: String, visible: bool },
    Link { href: String, active: bool },
    Scroll { offset: f64 },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { element, text } => write!(f, "text    {element} = {text:?}"),
            Self::Visibility { element, visible } => {
                write!(f, "visible {element} = {}", if *visible { "shown" } else { "hidden" })
            }
            Self::Link { href, active } => write!(f, "link    {href} = {}", if *active { "active" } else { "inactive" }),
            Self::Scroll { offset } => write!(f, "scroll  {offset}"),
        }
    }
}

/// A change and the virtual time at which it happened.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageEvent {
    pub at_ms: u64,

    #[serde(flatten)]
    pub change: Change,
}

/// A scroll notification scheduled at a point in virtual time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledScroll {
    pub at: Duration,
    pub offset: f64,
}

impl ScheduledScroll {
    /// Parse a `<millis>:<offset>` pair, e.g. `1500:700`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let (at, offset) = input.split_once(':').ok_or_else(|| format!("expected <millis>:<offset>, got '{input}'"))?;
        let at = at.trim().parse::<u64>().map_err(|e| format!("invalid time '{at}': {e}"))?;
        let offset = offset.trim().parse::<f64>().map_err(|e| format!("invalid offset '{offset}': {e}"))?;
        Ok(Self { at: Duration::from_millis(at), offset })
    }
}

/// A page that records every change made to it.
pub struct RecordingPage {
    page: StaticPage,
    now: Duration,
    events: Vec<PageEvent>,
}

impl RecordingPage {
    pub fn new(page: StaticPage) -> Self {
        Self { page, now: Duration::ZERO, events: Vec::new() }
    }

    pub fn set_now(&mut self, now: Duration) {
        self.now = now;
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.page.scroll_to(offset);
        self.record(Change::Scroll { offset });
    }

    pub fn events(&self) -> &[PageEvent] {
        &self.events
    }

    pub fn into_parts(self) -> (StaticPage, Vec<PageEvent>) {
        (self.page, self.events)
    }

    fn record(&mut self, change: Change) {
        self.events.push(PageEvent { at_ms: self.now.as_millis() as u64, change });
    }
}

impl Page for RecordingPage {
    fn has_element(&self, id: &str) -> bool {
        self.page.has_element(id)
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if self.page.has_element(id) {
            self.page.set_text(id, text);
            self.record(Change::Text { element: id.into(), text: text.into() });
        }
    }

    fn set_visible(&mut self, id: &str, visible: bool) {
        if self.page.has_element(id) {
            self.page.set_visible(id, visible);
            self.record(Change::Visibility { element: id.into(), visible });
        }
    }

    fn sections(&self) -> Vec<Section> {
        self.page.sections()
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.page.nav_links()
    }

    fn set_link_active(&mut self, index: usize, active: bool) {
        let Some(link) = self.page.links().get(index) else { return };
        if link.active != active {
            let href = link.href.clone();
            self.page.set_link_active(index, active);
            self.record(Change::Link { href, active });
        }
    }

    fn scroll_offset(&self) -> f64 {
        self.page.scroll_offset()
    }
}

/// The outcome of a headless run.
pub struct Trace {
    /// Every change, in the order it happened.
    pub events: Vec<PageEvent>,

    /// The page as it was when the run ended.
    pub page: StaticPage,
}

impl Trace {
    /// Run the effects described by a config for `duration` of virtual time.
    ///
    /// Scrolls are delivered in time order, before any timer step due at the same instant.
    pub fn run(config: &SiteConfig, duration: Duration, scrolls: &[ScheduledScroll]) -> Self {
        let mut page = RecordingPage::new(StaticPage::new(&config.page));
        let mut runtime = EffectsRuntime::start(config, &page);
        let mut scrolls = scrolls.iter().sorted_by_key(|scroll| scroll.at).peekable();

        loop {
            let next_timer = runtime.next_deadline();
            let next_scroll = scrolls.peek().map(|scroll| scroll.at);
            let Some(at) = next_timer.into_iter().chain(next_scroll).min() else { break };
            if at > duration {
                break;
            }
            page.set_now(at);
            match scrolls.next_if(|scroll| scroll.at == at) {
                Some(scroll) => {
                    page.scroll_to(scroll.offset);
                    let active = runtime.on_scroll(&mut page);
                    tracing::debug!("scrolled to {} at {at:?}, active section: {active:?}", scroll.offset);
                }
                None => {
                    if runtime.poll(at, &mut page) == PollableState::Done {
                        tracing::debug!("all effects finished at {at:?}");
                    }
                }
            }
        }
        runtime.stop();

        let (page, events) = page.into_parts();
        Self { events, page }
    }

    /// The successive texts written to an element.
    pub fn texts(&self, element: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match &event.change {
                Change::Text { element: target, text } if target == element => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }

    pub fn to_text(&self) -> String {
        self.events.iter().map(|event| format!("{:>8}ms  {}", event.at_ms, event.change)).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn cycle_trace() {
        let config = SiteConfig::from_yaml(
            r#"
typing:
  phrases: [ab, c]
  initial_delay_ms: 1000
page:
  elements: [typed-text]
"#,
        )
        .expect("parse failed");
        let trace = Trace::run(&config, ms(10_000), &[]);
        let texts = trace.texts("typed-text");
        assert_eq!(&texts[..9], &["a", "ab", "a", "", "c", "", "a", "ab", "a"]);

        let times: Vec<_> = trace.events.iter().take(5).map(|event| event.at_ms).collect();
        // pause after "ab", then deletes every 50ms, then a 50ms delay before "c".
        assert_eq!(times, &[1000, 1100, 2600, 2650, 2700]);
    }

    #[test]
    fn two_line_trace_stops_typing() {
        let config = SiteConfig::from_yaml(
            r#"
typing:
  mode: once
  phrases: [Ab, Cd]
  line_targets: [line-1, line-2]
page:
  elements: [line-1, line-2]
"#,
        )
        .expect("parse failed");
        let trace = Trace::run(&config, ms(600_000), &[]);
        assert_eq!(trace.texts("line-1"), &["A", "Ab"]);
        assert_eq!(trace.texts("line-2"), &["C", "Cd"]);
        assert_eq!(trace.page.text("line-1"), Some("Ab"));
        assert_eq!(trace.page.text("line-2"), Some("Cd"));

        let line_2: Vec<_> = trace.events.iter().filter(|event| matches!(&event.change, Change::Text { element, .. } if element == "line-2")).collect();
        assert_eq!(line_2[0].at_ms, 1000 + 100 + 1500);
    }

    #[test]
    fn absent_target_records_nothing() {
        let config = SiteConfig::from_yaml("page: { elements: [], sections: [], links: [] }").expect("parse failed");
        let trace = Trace::run(&config, ms(60_000), &[]);
        assert!(trace.events.is_empty());
    }

    #[test]
    fn scrolls_switch_active_link() {
        let config = SiteConfig::from_yaml("page: { elements: [] }").expect("parse failed");
        let scrolls = [
            ScheduledScroll { at: ms(200), offset: 650.0 },
            ScheduledScroll { at: ms(100), offset: 0.0 },
            ScheduledScroll { at: ms(300), offset: 650.0 },
        ];
        let trace = Trace::run(&config, ms(1000), &scrolls);
        let changes: Vec<_> = trace.events.iter().map(|event| (event.at_ms, event.change.clone())).collect();
        let expected = vec![
            (100, Change::Scroll { offset: 0.0 }),
            (100, Change::Link { href: "#home".into(), active: true }),
            (200, Change::Scroll { offset: 650.0 }),
            (200, Change::Link { href: "#home".into(), active: false }),
            (200, Change::Link { href: "#about".into(), active: true }),
            // Same offset again: nothing flickers.
            (300, Change::Scroll { offset: 650.0 }),
        ];
        assert_eq!(changes, expected);
    }

    #[test]
    fn json_output() {
        let config = SiteConfig::from_yaml("typing: { phrases: [x] }\npage: { elements: [typed-text] }").expect("parse failed");
        let trace = Trace::run(&config, ms(1000), &[]);
        let json: serde_json::Value = serde_json::from_str(&trace.to_json().expect("serialize failed")).expect("invalid json");
        assert_eq!(json, serde_json::json!([{ "at_ms": 1000, "kind": "text", "element": "typed-text", "text": "x" }]));
    }

    #[test]
    fn text_output() {
        let config = SiteConfig::from_yaml("typing: { phrases: [x] }\npage: { elements: [typed-text] }").expect("parse failed");
        let trace = Trace::run(&config, ms(1000), &[]);
        assert_eq!(trace.to_text(), "    1000ms  text    typed-text = \"x\"");
    }

    #[rstest]
    #[case("1500:700", ms(1500), 700.0)]
    #[case(" 0 : -50 ", ms(0), -50.0)]
    fn parse_scroll(#[case] input: &str, #[case] at: Duration, #[case] offset: f64) {
        assert_eq!(ScheduledScroll::parse(input), Ok(ScheduledScroll { at, offset }));
    }

    #[rstest]
    #[case("1500")]
    #[case("abc:1")]
    #[case("1:abc")]
    fn parse_invalid_scroll(#[case] input: &str) {
        assert!(ScheduledScroll::parse(input).is_err());
    }
}
