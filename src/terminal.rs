//! An interactive host that renders the page effects in a terminal.

use crate::{
    config::{SiteConfig, TypingConfig},
    effects::PollableState,
    page::{Page, StaticPage},
    runtime::{EffectsRuntime, StopHandle},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Write},
    time::{Duration, Instant},
};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

/// The glyph drawn for a visible cursor.
const CURSOR: char = '▌';

/// How long to wait for input when no effect is due.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// How far a single arrow key or wheel notch scrolls.
const SCROLL_STEP: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Quit,
    ScrollBy(f64),
    ScrollTo(f64),
}

fn key_action(key: KeyEvent, viewport_height: f64) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::ScrollBy(-SCROLL_STEP),
        KeyCode::Down | KeyCode::Char('j') => Action::ScrollBy(SCROLL_STEP),
        KeyCode::PageUp => Action::ScrollBy(-viewport_height),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::ScrollBy(viewport_height),
        KeyCode::Home | KeyCode::Char('g') => Action::ScrollTo(0.0),
        KeyCode::End | KeyCode::Char('G') => Action::ScrollTo(f64::MAX),
        _ => return None,
    };
    Some(action)
}

/// Puts the terminal in raw, alternate screen mode and restores it when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter<W: Write>(out: &mut W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(out, EnterAlternateScreen, Hide, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs the effects on an in-memory page and draws it on the terminal.
pub struct TerminalHost {
    config: SiteConfig,
    stop: StopHandle,
}

impl TerminalHost {
    pub fn new(config: SiteConfig, stop: StopHandle) -> Self {
        Self { config, stop }
    }

    /// Run until the user quits or the stop handle is triggered.
    pub fn run(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        let _guard = TerminalGuard::enter(&mut stdout)?;

        let mut page = StaticPage::new(&self.config.page);
        let mut runtime = EffectsRuntime::start(&self.config, &page);
        let max_scroll = self.config.page.max_scroll();
        let viewport_height = self.config.page.viewport_height;
        runtime.on_scroll(&mut page);
        info!("terminal host started, typing: {}", runtime.is_typing());

        let started = Instant::now();
        let mut dirty = true;
        while !self.stop.is_stopped() {
            if runtime.poll(started.elapsed(), &mut page) != PollableState::Unmodified {
                dirty = true;
            }
            if dirty {
                let view = View { page: &page, typing: &self.config.typing, max_scroll };
                view.draw(&mut stdout, terminal::size()?)?;
                dirty = false;
            }

            let timeout = match runtime.next_deadline() {
                Some(at) => at.saturating_sub(started.elapsed()).min(IDLE_POLL),
                None => IDLE_POLL,
            };
            if !event::poll(timeout)? {
                continue;
            }
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => key_action(key, viewport_height),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => Some(Action::ScrollBy(-SCROLL_STEP)),
                    MouseEventKind::ScrollDown => Some(Action::ScrollBy(SCROLL_STEP)),
                    _ => None,
                },
                Event::Resize(..) => {
                    dirty = true;
                    None
                }
                _ => None,
            };
            let offset = match action {
                Some(Action::Quit) => {
                    self.stop.stop();
                    continue;
                }
                Some(Action::ScrollBy(delta)) => page.scroll_offset() + delta,
                Some(Action::ScrollTo(offset)) => offset,
                None => continue,
            };
            let offset = offset.clamp(0.0, max_scroll);
            if offset != page.scroll_offset() {
                page.scroll_to(offset);
                let active = runtime.on_scroll(&mut page);
                debug!("scrolled to {offset}, active section: {active:?}");
                dirty = true;
            }
        }
        runtime.stop();
        info!("terminal host stopped");
        Ok(())
    }
}

/// Draws a snapshot of the page.
struct View<'a> {
    page: &'a StaticPage,
    typing: &'a TypingConfig,
    max_scroll: f64,
}

impl View<'_> {
    fn draw<W: Write>(&self, out: &mut W, (width, height): (u16, u16)) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate, Clear(ClearType::All), MoveTo(0, 0), Print(" "))?;
        for link in self.page.links() {
            let label = format!(" {} ", link.target().unwrap_or(link.href.as_str()));
            if link.active {
                queue!(out, SetAttribute(Attribute::Reverse), Print(label), SetAttribute(Attribute::Reset))?;
            } else {
                queue!(out, Print(label))?;
            }
            queue!(out, Print(" "))?;
        }
        queue!(out, MoveTo(0, 1), Print("─".repeat(width as usize)))?;

        let lines = self.typed_lines();
        let top = (height / 2).saturating_sub(lines.len() as u16 / 2);
        for (index, line) in lines.iter().enumerate() {
            let row = top + index as u16;
            queue!(
                out,
                MoveTo(centered_column(line, width), row),
                SetAttribute(Attribute::Bold),
                Print(line),
                SetAttribute(Attribute::Reset)
            )?;
        }

        let section = self.page.links().iter().find(|link| link.active).and_then(|link| link.target()).unwrap_or("-");
        let status = format!(" section: {section}   offset: {:.0}/{:.0}", self.page.scroll_offset(), self.max_scroll);
        let help = " ↑/↓ scroll   PgUp/PgDn page   Home/End jump   q quit";
        queue!(
            out,
            MoveTo(0, height.saturating_sub(2)),
            Print(status),
            MoveTo(0, height.saturating_sub(1)),
            SetAttribute(Attribute::Dim),
            Print(help),
            SetAttribute(Attribute::Reset),
            EndSynchronizedUpdate
        )?;
        out.flush()
    }

    /// The typed text of every target, with the cursor after the line being typed.
    fn typed_lines(&self) -> Vec<String> {
        let targets = self.typing.targets();
        let mut lines: Vec<String> =
            targets.iter().map(|target| self.page.text(target).unwrap_or_default().to_string()).collect();
        let Some(cursor) = self.page.element(&self.typing.cursor.target) else {
            return lines;
        };
        let cursor_line = lines.iter().rposition(|line| !line.is_empty()).unwrap_or(0);
        if let Some(line) = lines.get_mut(cursor_line) {
            line.push(if cursor.visible { CURSOR } else { ' ' });
        }
        lines
    }
}

/// The column at which a line must start to appear centered.
fn centered_column(line: &str, width: u16) -> u16 {
    let line_width = line.width().min(width as usize) as u16;
    (width - line_width) / 2
}
