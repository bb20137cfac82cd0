use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pbtui_core::{
    api::{ApiError, DrawService, PowerballClient},
    entry::{
        CellView, CellVisual, EntryForm, EntryKey, FormEvent, Phase, PrefillHandle,
        PrefillRequest, SlotKind, SubmissionStatus, SubmitOutcome, SubmitStart, Ticket,
    },
    predictions::{PredictionBook, PredictionEntry, EMPTY_MESSAGE},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use crate::ball_font;

const TICK_RATE: Duration = Duration::from_millis(250);
const CELL_WIDTH: u16 = 11;
const CELL_HEIGHT: u16 = (ball_font::FONT_HEIGHT as u16) + 2;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Form,
    List,
}

enum AppEvent {
    Input(Event),
    Tick,
    SubmitFinished {
        ticket: Ticket,
        outcome: SubmitOutcome,
    },
    PredictionsLoaded(Result<usize, ApiError>),
}

/// Terminal front end: the entry form above the prediction list.
pub struct PbtuiApp {
    client: PowerballClient,
    form: EntryForm,
    form_events: mpsc::UnboundedReceiver<FormEvent>,
    prefill: PrefillHandle,
    book: PredictionBook,
    pane: Pane,
    list_state: ListState,
    note: Option<String>,
    fetching: bool,
    should_quit: bool,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: Option<mpsc::Receiver<AppEvent>>,
    theme: Theme,
}

impl PbtuiApp {
    pub fn new(client: PowerballClient) -> Self {
        let (events_tx, form_events) = mpsc::unbounded_channel();
        let form = EntryForm::new().with_event_sink(events_tx);
        let prefill = form.prefill_handle();
        let (event_tx, event_rx) = mpsc::channel(128);
        Self {
            client,
            form,
            form_events,
            prefill,
            book: PredictionBook::new(),
            pane: Pane::Form,
            list_state: ListState::default(),
            note: None,
            fetching: false,
            should_quit: false,
            event_tx,
            event_rx: Some(event_rx),
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let mut event_rx = self
            .event_rx
            .take()
            .context("event loop already started")?;
        spawn_input_thread(self.event_tx.clone());
        self.refresh_predictions();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
            self.pump_form();

            if self.should_quit {
                break;
            }
        }

        self.form.close();
        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.note = Some(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            Some(AppEvent::SubmitFinished { ticket, outcome }) => {
                let resolution = self.form.finish_submit(ticket, outcome);
                debug!(%ticket, ?resolution, "Submission resolved");
                true
            }
            Some(AppEvent::PredictionsLoaded(result)) => {
                self.fetching = false;
                match result {
                    Ok(count) => {
                        info!(count, "Prediction list refreshed");
                        self.note = Some(format!("Loaded {count} predictions"));
                        self.clamp_selection();
                    }
                    Err(err) => {
                        error!(?err, "Prediction fetch failed");
                        self.note = Some(format!("Failed to load predictions: {err}"));
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Apply queued prefills and forward submitted draws to the list.
    fn pump_form(&mut self) {
        if self.form.drain_prefills() > 0 {
            self.pane = Pane::Form;
        }
        while let Ok(event) = self.form_events.try_recv() {
            match event {
                FormEvent::Submitted(result) => {
                    self.book.record_submission(&result);
                    self.list_state.select(Some(0));
                }
            }
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match self.pane {
                Pane::Form => self.handle_form_key(key),
                Pane::List => self.handle_list_key(key),
            },
            Event::Paste(text) if self.pane == Pane::Form => {
                self.form.input_text(&text);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.should_quit = true;
            }
            return Ok(());
        }

        let entry_key = match key.code {
            KeyCode::Esc => {
                self.pane = Pane::List;
                self.note = None;
                return Ok(());
            }
            KeyCode::Enter => {
                self.start_submit();
                return Ok(());
            }
            KeyCode::Char(ch) => EntryKey::Char(ch),
            KeyCode::Backspace => EntryKey::Backspace,
            KeyCode::Left => EntryKey::Left,
            KeyCode::Right => EntryKey::Right,
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => EntryKey::BackTab,
            KeyCode::Tab => EntryKey::Tab,
            KeyCode::BackTab => EntryKey::BackTab,
            _ => return Ok(()),
        };
        self.note = None;
        self.form.handle_key(entry_key);
        Ok(())
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                self.should_quit = true;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.pane = Pane::Form,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home | KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::End | KeyCode::Char('G') => {
                let len = self.book.len();
                self.list_state.select(len.checked_sub(1));
            }
            KeyCode::Enter => {
                if let Some(entry) = self.selected_entry() {
                    if self.prefill.request(PrefillRequest::from(&entry.prediction)) {
                        self.note = Some(format!("Filled form with {}", entry.prediction.label()));
                    }
                }
            }
            KeyCode::Char('f') => {
                if let Some(entry) = self.selected_entry() {
                    if let Some(favorite) = self.book.toggle_favorite(entry.id) {
                        let verb = if favorite { "Favorited" } else { "Unfavorited" };
                        self.note = Some(format!("{verb} {}", entry.prediction.label()));
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(entry) = self.selected_entry() {
                    if self.book.remove(entry.id) {
                        info!(id = entry.id, "Prediction removed");
                        self.note = Some(format!("Removed {}", entry.prediction.label()));
                        self.clamp_selection();
                    }
                }
            }
            KeyCode::Char('r') => self.refresh_predictions(),
            _ => {}
        }
        Ok(())
    }

    fn start_submit(&mut self) {
        match self.form.begin_submit() {
            SubmitStart::Dispatched(pending) => {
                let sender = self.event_tx.clone();
                let client = self.client.clone();
                spawn(async move {
                    let outcome = client.submit_result(&pending.result).await;
                    let _ = sender
                        .send(AppEvent::SubmitFinished {
                            ticket: pending.ticket,
                            outcome,
                        })
                        .await;
                });
            }
            SubmitStart::Rejected(reason) => debug!(%reason, "Submit rejected locally"),
            SubmitStart::InFlight => {
                self.note = Some("Submission already in progress".to_string());
            }
            SubmitStart::Closed => {}
        }
    }

    fn refresh_predictions(&mut self) {
        if self.fetching {
            return;
        }
        let sender = self.event_tx.clone();
        self.fetching = true;
        self.note = Some("Loading predictions…".to_string());
        let client = self.client.clone();
        let book = self.book.clone();
        spawn(async move {
            let result = client.get_predictions().await.map(|predictions| {
                let count = predictions.len();
                book.replace_fetched(predictions);
                count
            });
            let _ = sender.send(AppEvent::PredictionsLoaded(result)).await;
        });
    }

    fn selected_entry(&self) -> Option<PredictionEntry> {
        let idx = self.list_state.selected()?;
        self.book.entries().get(idx).cloned()
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.book.len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }

    fn clamp_selection(&mut self) {
        let len = self.book.len();
        let selected = match self.list_state.selected() {
            _ if len == 0 => None,
            Some(idx) => Some(idx.min(len - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(CELL_HEIGHT + 2),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_form(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
        self.render_predictions(frame, chunks[2]);
        self.render_help(frame, chunks[3]);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let border = if self.pane == Pane::Form {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("Powerball Result");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = Vec::new();
        for _ in 0..5 {
            constraints.push(Constraint::Length(CELL_WIDTH));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(CELL_WIDTH));
        constraints.push(Constraint::Min(0));
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(inner);

        let views = self.form.views();
        for view in &views {
            let column = if view.kind == SlotKind::Bonus {
                columns[6]
            } else {
                columns[view.index]
            };
            self.render_cell(frame, column, view);
        }

        let plus_area = Rect {
            y: columns[5].y + columns[5].height / 2,
            height: 1u16.min(columns[5].height),
            ..columns[5]
        };
        frame.render_widget(
            Paragraph::new("+")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.muted)),
            plus_area,
        );
    }

    fn render_cell(&self, frame: &mut Frame, area: Rect, view: &CellView) {
        let base = if view.kind == SlotKind::Bonus {
            self.theme.danger
        } else {
            self.theme.primary_fg
        };
        let focused_pane = self.pane == Pane::Form;
        let border_style = match view.visual {
            CellVisual::Editing if focused_pane => Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
            CellVisual::Duplicate => Style::default().fg(self.theme.warning),
            CellVisual::Empty => Style::default().fg(self.theme.muted),
            _ => Style::default().fg(base),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(view.placeholder.clone(), border_style));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if view.display_text.is_empty() {
            let hint = if view.is_being_edited && focused_pane {
                "_"
            } else {
                ""
            };
            frame.render_widget(
                Paragraph::new(hint)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.muted)),
                center_row(inner),
            );
            return;
        }

        let mut text_style = Style::default().fg(if view.is_duplicate_highlighted {
            self.theme.warning
        } else {
            base
        });
        if view.is_selected && focused_pane {
            text_style = text_style.add_modifier(Modifier::REVERSED);
        }

        let digits = view.display_text.chars().count();
        let fits = inner.height as usize >= ball_font::FONT_HEIGHT
            && inner.width as usize >= ball_font::width(digits);
        if fits {
            let lines: Vec<Line> = ball_font::render(&view.display_text)
                .into_iter()
                .map(|row| Line::from(Span::styled(row, text_style)))
                .collect();
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled(view.display_text.clone(), text_style))
                    .alignment(Alignment::Center),
                center_row(inner),
            );
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let status = self.form.status();
        let (text, color) = match status {
            SubmissionStatus::Success => (status.to_string(), self.theme.success),
            status if status.is_error() => (status.to_string(), self.theme.danger),
            SubmissionStatus::Idle if self.form.phase() == Phase::CallingOut => {
                ("Submitting…".to_string(), self.theme.accent)
            }
            _ => (
                self.note.clone().unwrap_or_else(|| "Ready".to_string()),
                self.theme.primary_fg,
            ),
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_predictions(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.pane == Pane::List {
            self.theme.accent
        } else {
            self.theme.muted
        };
        let title = if self.fetching {
            "Predictions (loading…)".to_string()
        } else {
            format!("Predictions ({})", self.book.len())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);

        let entries = self.book.entries();
        if entries.is_empty() {
            let paragraph = Paragraph::new(EMPTY_MESSAGE)
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.muted))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let marker = if entry.favorite { "♥" } else { " " };
                let mut headline = vec![
                    Span::styled(
                        format!("{marker} "),
                        Style::default().fg(self.theme.danger),
                    ),
                    Span::styled(
                        entry.prediction.label(),
                        Style::default().fg(self.theme.primary_fg),
                    ),
                    Span::styled(
                        format!("  {:>3}%", entry.prediction.score_percent()),
                        Style::default().fg(self.theme.success),
                    ),
                ];
                if let Some(at) = entry.submitted_at() {
                    headline.push(Span::styled(
                        format!("  submitted {at}"),
                        Style::default().fg(self.theme.muted),
                    ));
                }
                let mut lines = vec![Line::from(headline)];
                if let Some(note) = entry.prediction.note() {
                    lines.push(Line::from(Span::styled(
                        format!("    {note}"),
                        Style::default()
                            .fg(self.theme.muted)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = match self.pane {
            Pane::Form => {
                "digits type • ←/→ Tab move • Backspace erase • Enter submit • Esc list • Ctrl+C quit"
            }
            Pane::List => {
                "↑/↓ select • Enter fill form • f favorite • d delete • r refresh • Esc form • q quit"
            }
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(self.theme.muted)),
            area,
        );
    }
}

fn center_row(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: 1u16.min(area.height),
        ..area
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
