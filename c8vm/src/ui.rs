//! Terminal front end.
//!
//! The presentation layer is behind the [`Frontend`] trait so the
//! scheduling loop never touches crossterm directly. [`TermFrontend`] is
//! the real one; [`HeadlessFrontend`] replays a scripted command sequence
//! for tests and tty-less runs.

use std::io::{self, Stdout, Write};
use std::panic;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::ResetColor,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};

use crate::constants::{DISPLAY_WIDTH, PRESENT_RATE_HZ};
use crate::machine::MachineView;
use crate::runner::RunState;
use crate::settings::UiSettings;

/// What the user asked the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
}

/// Everything one frame needs, borrowed from the runner for the duration
/// of the draw call.
pub struct Snapshot<'a> {
    pub view: MachineView<'a>,
    pub state: RunState,
    pub clock_hz: u64,
    pub events: &'a [String],
}

pub trait Frontend {
    /// Wait up to `wait` for user input and translate it into a command.
    /// Keys that only affect presentation are handled here and yield
    /// `None`.
    fn poll(&mut self, wait: Duration) -> io::Result<Option<Command>>;

    /// Present one frame.
    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

pub struct TermFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    settings: UiSettings,
}

impl TermFrontend {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            settings: UiSettings::load(),
        })
    }

    /// Restore the terminal and persist the pane toggles.
    pub fn shutdown(mut self) -> io::Result<()> {
        if let Err(e) = self.settings.save() {
            warn!("failed to save UI settings: {e}");
        }
        self.terminal.show_cursor()?;
        restore_terminal()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char(' ') => Some(Command::TogglePause),
            KeyCode::Char('s') => {
                self.settings.show_sidebar = !self.settings.show_sidebar;
                None
            }
            KeyCode::Char('e') => {
                self.settings.show_events = !self.settings.show_events;
                None
            }
            _ => None,
        }
    }
}

impl Frontend for TermFrontend {
    fn poll(&mut self, wait: Duration) -> io::Result<Option<Command>> {
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                return Ok(self.handle_key(key));
            }
        }
        Ok(None)
    }

    fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let settings = self.settings;
        self.terminal.draw(|f| draw_ui(f, snapshot, settings))?;
        Ok(())
    }
}

fn draw_ui(frame: &mut Frame, snapshot: &Snapshot, settings: UiSettings) {
    let size = frame.size();

    let mut rows = vec![Constraint::Min(10)];
    if settings.show_events {
        rows.push(Constraint::Length(6));
    }
    rows.push(Constraint::Length(1));
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(size);

    let top = if settings.show_sidebar {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(66),    // display, 64 pixels plus borders
                Constraint::Length(26), // sidebar
            ])
            .split(vertical[0]);
        draw_sidebar(frame, columns[1], snapshot);
        columns[0]
    } else {
        vertical[0]
    };
    draw_display(frame, top, snapshot);

    if settings.show_events {
        draw_events(frame, vertical[1], snapshot);
    }
    draw_hint_line(frame, vertical[vertical.len() - 1], snapshot);
}

fn draw_display(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let points = lit_points(snapshot.view.display);
    let canvas = Canvas::default()
        .block(Block::default().title(" Display ").borders(Borders::ALL))
        .x_bounds([0.0, 63.0])
        .y_bounds([-31.0, 0.0])
        .marker(Marker::Block)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &points,
                color: Color::Green,
            });
        });
    frame.render_widget(canvas, area);
}

/// Expand the packed 1bpp page into canvas coordinates. Bits are MSB
/// first within a byte, rows run top to bottom, and the canvas y axis
/// points up, so the top row lands on y == 0.
fn lit_points(display: &[u8]) -> Vec<(f64, f64)> {
    let row_bytes = DISPLAY_WIDTH / 8;
    let mut points = Vec::new();
    for (index, &byte) in display.iter().enumerate() {
        for bit in 0..8usize {
            if byte & (0x80 >> bit) == 0 {
                continue;
            }
            let x = (index % row_bytes) * 8 + bit;
            let y = index / row_bytes;
            points.push((x as f64, -(y as f64)));
        }
    }
    points
}

fn draw_sidebar(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let view = &snapshot.view;

    let state_span = match snapshot.state {
        RunState::Running => Span::styled("running", Style::default().fg(Color::Green)),
        RunState::Paused => Span::styled(
            "paused",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    };

    let mut text = vec![
        Line::from(vec![Span::raw("state    "), state_span]),
        Line::from(format!("pc       {:#06x}", view.pc)),
        Line::from(format!("cycles   {}", view.cycles)),
        Line::from(format!("program  {} bytes", view.program_len)),
        Line::from(format!(
            "clock    {} Hz / {} fps",
            snapshot.clock_hz, PRESENT_RATE_HZ
        )),
        Line::from(""),
        Line::from(Span::styled(
            "breakpoints",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
    ];
    if view.breakpoints.is_empty() {
        text.push(Line::from(Span::styled(
            "(none)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for addr in view.breakpoints {
            text.push(Line::from(Span::styled(
                format!("{addr:#06x}"),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let block = Block::default().title(" Machine ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_events(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let mut text: Vec<Line> = snapshot
        .events
        .iter()
        .map(|event| Line::from(event.as_str()))
        .collect();
    if text.is_empty() {
        text.push(Line::from(Span::styled(
            "(quiet so far)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let block = Block::default().title(" Events ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_hint_line(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let (label, color) = match snapshot.state {
        RunState::Running => ("RUNNING", Color::Green),
        RunState::Paused => ("PAUSED", Color::Yellow),
    };
    let spans = vec![
        Span::styled(
            format!(" {label} "),
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " Space:pause  s:sidebar  e:events  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Put the terminal back the way we found it. Safe to call more than
/// once, including from the panic hook.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, cursor::Show, ResetColor)?;
    stdout.flush()
}

/// Chain a terminal restore in front of the default panic handler so a
/// panic does not leave the shell in raw mode on the alternate screen.
pub fn install_terminal_cleanup_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// A frontend with no terminal behind it. It replays a scripted command
/// sequence, one entry per poll, and counts the frames it is asked to
/// draw. When the script runs out it asks the loop to quit rather than
/// spin forever.
pub struct HeadlessFrontend {
    script: Vec<Option<Command>>,
    frames: usize,
}

impl HeadlessFrontend {
    pub fn new(script: Vec<Option<Command>>) -> Self {
        Self { script, frames: 0 }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Frontend for HeadlessFrontend {
    fn poll(&mut self, _wait: Duration) -> io::Result<Option<Command>> {
        if self.script.is_empty() {
            return Ok(Some(Command::Quit));
        }
        Ok(self.script.remove(0))
    }

    fn draw(&mut self, _snapshot: &Snapshot) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
