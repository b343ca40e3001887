//! TUI (Terminal User Interface) module for Folymarket
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # Architecture
//! - `Controls`: cursor, inline editor and key-to-action mapping (no terminal)
//! - `TuiInterface`: owns the terminal, renders the session and feeds
//!   actions from `Controls` into the session loop
//!
//! # State Machine
//! - `Browsing` → `Editing` (Enter on a title/label, or a digit on a slider)
//! - `Editing` → `Browsing` on Enter (commits an action) or Esc (discards)

use crate::error::SessionError;
use crate::model::{Flag, MAX_VALUE, ScoringMode, Variable};
use crate::scoring::Outcome;
use crate::session::{Session, SessionInterface, UserAction};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const SLIDER_STEP: i32 = 5;
const SLIDER_WIDTH: i32 = 10;
const MAX_VALUE_DIGITS: usize = 3;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const YES_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const NO_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const SELECTED_STYLE: Style = Style::new().bg(Color::DarkGray).add_modifier(Modifier::BOLD);
const MUTED_STYLE: Style = Style::new().fg(Color::Gray);

/// One selectable line of the scenario panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Title(usize),
    Variable(usize, usize),
}

impl Row {
    fn scenario(self) -> usize {
        match self {
            Self::Title(s) | Self::Variable(s, _) => s,
        }
    }
}

fn rows(session: &Session) -> Vec<Row> {
    let mut rows = Vec::new();
    for (s, scenario) in session.scenarios().iter().enumerate() {
        rows.push(Row::Title(s));
        rows.extend((0..scenario.variables.len()).map(|v| Row::Variable(s, v)));
    }
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditTarget {
    Title(usize),
    Label(usize, usize),
    Value(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TuiState {
    Browsing,
    Editing { target: EditTarget, buffer: String },
}

/// Cursor position, inline editor and the messages shown under the panels.
#[derive(Debug)]
pub struct Controls {
    cursor: usize,
    state: TuiState,
    error_message: String,
    status: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            state: TuiState::Browsing,
            error_message: String::new(),
            status: "Ready".to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, TuiState::Editing { .. })
    }

    /// Keep the cursor on an existing row after the session changed shape.
    fn clamp_cursor(&mut self, session: &Session) {
        let count = rows(session).len();
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    fn current_row(&self, session: &Session) -> Option<Row> {
        rows(session).get(self.cursor).copied()
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    /// Maps a key press to a session action, updating cursor and editor state.
    pub fn handle_key(&mut self, key: KeyEvent, session: &Session) -> Option<UserAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'C'))
        {
            return Some(UserAction::Exit);
        }
        self.clamp_cursor(session);
        match self.state {
            TuiState::Browsing => self.handle_browsing_key(key, session),
            TuiState::Editing { .. } => self.handle_editing_key(key),
        }
    }

    fn handle_browsing_key(&mut self, key: KeyEvent, session: &Session) -> Option<UserAction> {
        self.error_message.clear();
        if Self::has_modifier_keys(&key) {
            debug_log!("handle_browsing_key() - Ignoring key with modifier: {:?}", key.modifiers);
            return None;
        }

        let row = self.current_row(session);
        let mode = session.mode();
        match key.code {
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                let count = rows(session).len();
                if self.cursor + 1 < count {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
            KeyCode::Char('a' | 'A') => Some(UserAction::AddScenario),
            KeyCode::Char('g' | 'G') => Some(UserAction::Generate),
            KeyCode::Char('c' | 'C') => Some(UserAction::ClearAll),
            KeyCode::Char('u' | 'U') => Some(UserAction::Undo),
            KeyCode::Char('v' | 'V') => match row {
                Some(row) => Some(UserAction::AddVariable {
                    scenario: row.scenario(),
                }),
                None => {
                    self.error_message = "Add a scenario first (A).".to_string();
                    None
                }
            },
            KeyCode::Enter | KeyCode::Char('e' | 'E') => {
                match row {
                    Some(Row::Title(s)) => {
                        let buffer = session.scenarios()[s].title.clone();
                        self.start_editing(EditTarget::Title(s), buffer);
                    }
                    Some(Row::Variable(s, v)) => {
                        let buffer = session.scenarios()[s].variables[v].label.clone();
                        self.start_editing(EditTarget::Label(s, v), buffer);
                    }
                    None => {}
                }
                None
            }
            KeyCode::Char(' ') => match row {
                Some(Row::Variable(s, v)) => Some(UserAction::ToggleFlag {
                    scenario: s,
                    variable: v,
                    flag: Flag::Pressure,
                }),
                _ => None,
            },
            KeyCode::Char('i' | 'I') => match row {
                Some(Row::Variable(s, v)) if mode.flags().contains(&Flag::Impactful) => {
                    Some(UserAction::ToggleFlag {
                        scenario: s,
                        variable: v,
                        flag: Flag::Impactful,
                    })
                }
                Some(Row::Variable(..)) => {
                    self.error_message =
                        format!("No impactful flag in {} mode.", mode.name());
                    None
                }
                _ => None,
            },
            KeyCode::Left | KeyCode::Right => {
                let delta = if key.code == KeyCode::Left {
                    -SLIDER_STEP
                } else {
                    SLIDER_STEP
                };
                let (s, v) = self.slider_target(row, session)?;
                let value = session.scenarios()[s].variables[v].value.saturating_add(delta);
                Some(UserAction::SetValue {
                    scenario: s,
                    variable: v,
                    raw: value.to_string(),
                })
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let (s, v) = self.slider_target(row, session)?;
                self.start_editing(EditTarget::Value(s, v), c.to_string());
                None
            }
            _ => {
                debug_log!("handle_browsing_key() - Ignoring key: {:?}", key.code);
                None
            }
        }
    }

    /// The variable under the cursor, if its slider is shown.
    fn slider_target(&mut self, row: Option<Row>, session: &Session) -> Option<(usize, usize)> {
        let Some(Row::Variable(s, v)) = row else {
            return None;
        };
        if session
            .mode()
            .shows_slider(&session.scenarios()[s].variables[v])
        {
            Some((s, v))
        } else {
            self.error_message = "This variable has no slider.".to_string();
            None
        }
    }

    fn start_editing(&mut self, target: EditTarget, buffer: String) {
        info_log!("start_editing() - {:?}", target);
        self.state = TuiState::Editing { target, buffer };
        self.status = "Editing - ENTER to save, ESC to cancel".to_string();
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        let TuiState::Editing { target, buffer } = &mut self.state else {
            return None;
        };
        let target = *target;
        match key.code {
            KeyCode::Esc => {
                self.state = TuiState::Browsing;
                self.status = "Edit cancelled".to_string();
                None
            }
            KeyCode::Enter => {
                let text = std::mem::take(buffer);
                self.state = TuiState::Browsing;
                self.status = "Saved".to_string();
                Some(match target {
                    EditTarget::Title(scenario) => UserAction::SetTitle {
                        scenario,
                        title: text,
                    },
                    EditTarget::Label(scenario, variable) => UserAction::SetLabel {
                        scenario,
                        variable,
                        label: text,
                    },
                    EditTarget::Value(scenario, variable) => UserAction::SetValue {
                        scenario,
                        variable,
                        raw: text,
                    },
                })
            }
            KeyCode::Backspace => {
                buffer.pop();
                None
            }
            KeyCode::Char(_) if Self::has_modifier_keys(&key) => None,
            KeyCode::Char(c) => {
                if let EditTarget::Value(..) = target {
                    if c.is_ascii_digit() && buffer.len() < MAX_VALUE_DIGITS {
                        buffer.push(c);
                    } else {
                        self.error_message = format!("Values are 0-{MAX_VALUE}.");
                    }
                } else if !c.is_control() {
                    buffer.push(c);
                }
                None
            }
            _ => None,
        }
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    session: &'a Session,
    controls: &'a Controls,
}

fn slider_bar(value: i32) -> String {
    let filled = (value.clamp(0, MAX_VALUE) * SLIDER_WIDTH / MAX_VALUE).clamp(0, SLIDER_WIDTH);
    let filled = usize::try_from(filled).unwrap_or(0);
    let empty = usize::try_from(SLIDER_WIDTH).unwrap_or(0) - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Main TUI interface component.
///
/// Manages terminal rendering and input handling.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    controls: Controls,
}

impl TuiInterface {
    pub fn new() -> crate::error::Result<Self> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            controls: Controls::new(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self, session: &Session) -> Result<(), io::Error> {
        self.controls.clamp_cursor(session);
        let ctx = RenderContext {
            session,
            controls: &self.controls,
        };
        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self, session: &Session) {
        if let Err(e) = self.draw(session) {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(8),    // Scenarios and outcomes
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        Self::render_title(f, chunks[0], ctx.session.mode());
        Self::render_scenarios(f, panels[0], ctx);
        Self::render_outcomes(f, panels[1], ctx.session.results());
        Self::render_status(f, chunks[2], ctx.controls);
        Self::render_instructions(f, chunks[3], ctx);
    }

    fn render_title(f: &mut Frame, area: Rect, mode: ScoringMode) {
        let title = Paragraph::new(format!(
            "FOLYMARKET PREDICTION SIMULATOR ({} mode)",
            mode.name()
        ))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn editing_text(controls: &Controls, target: EditTarget) -> Option<String> {
        match &controls.state {
            TuiState::Editing {
                target: editing,
                buffer,
            } if *editing == target => Some(format!("{buffer}_")),
            _ => None,
        }
    }

    fn variable_line<'a>(
        controls: &Controls,
        mode: ScoringMode,
        s: usize,
        v: usize,
        variable: &'a Variable,
    ) -> Vec<Span<'a>> {
        let mut spans = vec![Span::raw("    ")];
        for &flag in mode.flags() {
            let mark = if variable.flag(flag) { "[x]" } else { "[ ]" };
            spans.push(Span::raw(format!("{mark} {} ", flag.label(mode))));
        }
        let label = Self::editing_text(controls, EditTarget::Label(s, v)).unwrap_or_else(|| {
            if variable.label.is_empty() {
                "(unnamed)".to_string()
            } else {
                variable.label.clone()
            }
        });
        spans.push(Span::raw(label));
        if mode.shows_slider(variable) {
            let value = Self::editing_text(controls, EditTarget::Value(s, v))
                .unwrap_or_else(|| variable.value.to_string());
            let value = if mode == ScoringMode::Additive {
                format!("+{value}%")
            } else {
                value
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(slider_bar(variable.value), MESSAGE_STYLE));
            spans.push(Span::raw(format!(" {value}")));
        } else if mode == ScoringMode::Additive {
            spans.push(Span::styled(format!(" (+{}%)", variable.value), MUTED_STYLE));
        }
        spans
    }

    fn render_scenarios(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let session = ctx.session;
        let controls = ctx.controls;
        let mut lines = Vec::new();

        if session.scenarios().is_empty() {
            lines.push(Line::from(Span::styled(
                "No scenarios. Press A to add one.",
                MUTED_STYLE,
            )));
        }

        for (index, row) in rows(session).into_iter().enumerate() {
            let mut line = match row {
                Row::Title(s) => {
                    let scenario = &session.scenarios()[s];
                    let title = Self::editing_text(controls, EditTarget::Title(s))
                        .unwrap_or_else(|| scenario.display_title(s));
                    Line::from(vec![
                        Span::styled(format!("{}. ", s + 1), HEADER_STYLE),
                        Span::styled(title, HEADER_STYLE),
                    ])
                }
                Row::Variable(s, v) => {
                    let variable = &session.scenarios()[s].variables[v];
                    Line::from(Self::variable_line(controls, session.mode(), s, v, variable))
                }
            };
            if index == controls.cursor {
                line = line.style(SELECTED_STYLE);
            }
            lines.push(line);
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Scenarios").borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_outcomes(f: &mut Frame, area: Rect, results: &[Outcome]) {
        let mut lines = Vec::new();
        if results.is_empty() {
            lines.push(Line::from(Span::styled(
                "Press G to generate outcomes.",
                MUTED_STYLE,
            )));
        }
        for (i, outcome) in results.iter().enumerate() {
            let title = if outcome.title.trim().is_empty() {
                format!("Scenario #{}", i + 1)
            } else {
                outcome.title.clone()
            };
            lines.push(Line::from(Span::styled(title, HEADER_STYLE)));
            lines.push(Line::from(vec![
                Span::styled(format!("Yes: {}%", outcome.yes), YES_STYLE),
                Span::raw(" / "),
                Span::styled(format!("No: {}%", outcome.no), NO_STYLE),
            ]));
            lines.push(Line::from(Span::styled(
                format!("Total pressure: {}", outcome.pressure),
                MUTED_STYLE,
            )));
            if let Some(rationale) = outcome.rationale {
                lines.push(Line::from(Span::styled(rationale, MUTED_STYLE)));
            }
            lines.push(Line::from(""));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Outcomes").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, controls: &Controls) {
        let line = if controls.error_message.is_empty() {
            Line::from(Span::styled(controls.status.as_str(), MESSAGE_STYLE))
        } else {
            Line::from(Span::styled(controls.error_message.as_str(), ERROR_STYLE))
        };
        let paragraph =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let text = match (&ctx.controls.state, ctx.session.mode()) {
            (TuiState::Editing { .. }, _) => "Type to edit | ENTER: Save | ESC: Cancel",
            (TuiState::Browsing, ScoringMode::Additive) => {
                "↑↓: Move | ENTER: Edit | SPACE: Active | ←→/0-9: Weight | A: Add Scenario | V: Add Variable | G: Generate | C: Clear | U: Undo | ESC: Quit"
            }
            (TuiState::Browsing, ScoringMode::Pressure) => {
                "↑↓: Move | ENTER: Edit | SPACE: Pressure | ←→/0-9: Value | A: Add Scenario | V: Add Variable | G: Generate | C: Clear | U: Undo | ESC: Quit"
            }
            (TuiState::Browsing, ScoringMode::Weighted) => {
                "↑↓: Move | ENTER: Edit | SPACE: Pressure | I: Impactful | ←→/0-9: Value | A: Add Scenario | V: Add Variable | G: Generate | C: Clear | U: Undo | ESC: Quit"
            }
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self, session: &Session) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => {
                // Only process Press events, ignore Release and Repeat to avoid double input
                if key.kind != event::KeyEventKind::Press {
                    return Ok(None);
                }
                if let KeyCode::Char('\u{FFFD}') = key.code {
                    debug_log!("handle_input() - Ignoring replacement character");
                    return Ok(None);
                }
                debug_log!(
                    "handle_input() - Key event received: code={:?}, modifiers={:?}",
                    key.code,
                    key.modifiers
                );
                Ok(self.controls.handle_key(key, session))
            }
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

impl SessionInterface for TuiInterface {
    fn read_action(&mut self, session: &Session) -> Option<UserAction> {
        loop {
            if self.draw(session).is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }

            match self.handle_input(session) {
                Ok(Some(action)) => {
                    info_log!("read_action() - Action received: {:?}", action);
                    return Some(action);
                }
                Ok(None) => {}
                Err(e) => {
                    info_log!("read_action() - Error handling input ({}), returning Exit", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_scenarios(&mut self, session: &Session) {
        if !self.controls.is_editing() {
            self.controls.status = format!("{} scenario(s)", session.scenarios().len());
        }
        self.draw_or_log(session);
    }

    fn display_results(&mut self, session: &Session) {
        self.controls.status = format!("Generated {} outcome(s)", session.results().len());
        self.draw_or_log(session);
    }

    fn display_undo(&mut self, session: &Session, restored: bool) {
        if restored {
            self.controls.status = "Undone".to_string();
        } else {
            self.controls.error_message = "Nothing to undo.".to_string();
        }
        self.draw_or_log(session);
    }

    fn display_error(&mut self, error: &SessionError) {
        self.controls.error_message = error.to_string();
    }

    fn display_exit_message(&mut self) {
        self.controls.status = "Exiting...".to_string();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
