use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use rand::rngs::ThreadRng;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use squad_terminal::answer::{AnswerNode, Inline, PlayerRecord};
use squad_terminal::ask_client::HttpAskClient;
use squad_terminal::config::{self, AskConfig};
use squad_terminal::facts::FadeStage;
use squad_terminal::html;
use squad_terminal::state::{apply_delta, AppState, AskCommand, Delta, Outcome, Phase};
use squad_terminal::{telemetry, worker};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<AskCommand>>,
    rng: ThreadRng,
}

impl App {
    fn new(config: AskConfig, cmd_tx: Option<mpsc::Sender<AskCommand>>) -> Self {
        Self {
            state: AppState::new(config),
            should_quit: false,
            cmd_tx,
            rng: rand::thread_rng(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('u') if ctrl => self.state.input.clear(),
            KeyCode::Char('e') if ctrl => self.export_answer(),
            KeyCode::Char(ch) if !ctrl => self.state.input.push(ch),
            KeyCode::Backspace => {
                self.state.input.pop();
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::F(1) => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Up => self.state.scroll_answer(-1),
            KeyCode::Down => self.state.scroll_answer(1),
            KeyCode::PageUp => self.state.scroll_answer(-5),
            KeyCode::PageDown => self.state.scroll_answer(5),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Some(submission) = self.state.begin_submission(Instant::now(), &mut self.rng) else {
            return;
        };
        let id = submission.id;
        let sent = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(submission.into()).is_ok());
        if !sent {
            apply_delta(
                &mut self.state,
                Delta::AskFailed {
                    id,
                    message: "request worker unavailable".to_string(),
                },
            );
        }
    }

    fn export_answer(&mut self) {
        if !self.state.answer_visible() || self.state.answer.is_empty() {
            self.state.push_log("[INFO] No answer to export yet");
            return;
        }
        let Some(path) = html::export_path() else {
            self.state.push_log("[WARN] No cache directory for export");
            return;
        };
        let question = self.state.last_question.clone().unwrap_or_default();
        match html::write_answer_document(&path, &question, &self.state.answer) {
            Ok(()) => self
                .state
                .push_log(format!("[INFO] Exported answer to {}", path.display())),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let cfg = AskConfig::from_env();
    let mut startup_logs = Vec::new();
    if let Some(path) = cfg.log_file.as_deref()
        && let Err(err) = telemetry::init_file_tracing(path)
    {
        startup_logs.push(format!("[WARN] Logging disabled: {err:#}"));
    }
    tracing::info!(url = %cfg.ask_url(), structured = cfg.structured_render, ticker = cfg.fact_ticker, "starting");

    let (tx, rx) = mpsc::channel();
    let cmd_tx = match HttpAskClient::from_config(&cfg) {
        Ok(client) => {
            let (cmd_tx, cmd_rx) = mpsc::channel();
            worker::spawn_ask_worker(tx, cmd_rx, Arc::new(client));
            Some(cmd_tx)
        }
        Err(err) => {
            startup_logs.push(format!("[WARN] HTTP client unavailable: {err:#}"));
            None
        }
    };

    let mut app = App::new(cfg, cmd_tx);
    app.state.push_log(format!("[INFO] Asking {}", app.state.config.ask_url()));
    for line in startup_logs {
        app.state.push_log(line);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        loop {
            match rx.try_recv() {
                Ok(delta) => apply_delta(&mut app.state, delta),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    app.state.worker_disconnected();
                    break;
                }
            }
        }

        app.state.tick(Instant::now(), &mut app.rng);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_input(frame, chunks[1], &app.state);
    render_status(frame, chunks[2], &app.state);
    render_answer(frame, chunks[3], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    let footer = Paragraph::new(
        "Enter Ask | PgUp/PgDn Scroll | Ctrl-U Clear | Ctrl-E Export | F1 Help | Esc Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[5]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let phase = match state.phase {
        Phase::Idle => "READY",
        Phase::Loading => "ASKING",
        Phase::Settled(Outcome::Rendered) => "ANSWERED",
        Phase::Settled(Outcome::Errored) => "ERROR",
    };
    let line1 = format!("  .-.  SQUAD TERMINAL | {phase}");
    let line2 = " /___\\".to_string();
    format!("{line1}\n{line2}")
}

fn render_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let style = if state.loading_visible() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    };
    let input = Paragraph::new(format!("> {}", state.input))
        .style(style)
        .block(Block::default().title("Question").borders(Borders::ALL));
    frame.render_widget(input, area);

    let typed = u16::try_from(state.input.chars().count()).unwrap_or(u16::MAX);
    let cursor_x = area.x.saturating_add(3).saturating_add(typed);
    if cursor_x < area.x.saturating_add(area.width.saturating_sub(1)) {
        frame.set_cursor(cursor_x, area.y + 1);
    }
}

fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL);
    if !state.loading_visible() {
        frame.render_widget(block, area);
        return;
    }

    let mut spans = vec![Span::styled(
        "Loading... ",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    if let (Some(ticker), Some(fact)) = (state.ticker.as_ref(), state.fact()) {
        let style = match ticker.fade(Instant::now()) {
            FadeStage::Entering => Style::default().fg(Color::DarkGray),
            FadeStage::Shown => Style::default().fg(Color::White),
        };
        spans.push(Span::styled(fact, style));
    }
    let status = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(status, area);
}

fn render_answer(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Answer").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if !state.answer_visible() {
        if state.phase == Phase::Idle {
            let hint = Paragraph::new("Ask about a Premier League squad, e.g. \"Show the full squad of Arsenal\"")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(hint, inner);
        }
        return;
    }

    let error = state.phase == Phase::Settled(Outcome::Errored);
    let mut text_lines: Vec<Line<'static>> = Vec::new();
    let mut cards: Vec<&PlayerRecord> = Vec::new();
    for node in state.answer.nodes() {
        match node {
            AnswerNode::Paragraph(inlines) => text_lines.extend(inline_lines(inlines, error)),
            AnswerNode::Card(card) => cards.push(card),
        }
    }

    if cards.is_empty() {
        let paragraph = Paragraph::new(Text::from(text_lines))
            .wrap(Wrap { trim: false })
            .scroll((state.answer_scroll, 0));
        frame.render_widget(paragraph, inner);
        return;
    }

    let intro_rows = u16::try_from(text_lines.len()).unwrap_or(u16::MAX);
    let intro_height = intro_rows.clamp(1, (inner.height / 3).max(1));
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(intro_height), Constraint::Min(1)])
        .split(inner);
    let intro = Paragraph::new(Text::from(text_lines)).wrap(Wrap { trim: false });
    frame.render_widget(intro, sections[0]);
    render_cards(frame, sections[1], &cards, usize::from(state.answer_scroll));
}

fn render_cards(frame: &mut Frame, area: Rect, cards: &[&PlayerRecord], skip: usize) {
    let skip = skip.min(cards.len().saturating_sub(1));
    let mut y = area.y;
    let bottom = area.y.saturating_add(area.height);
    let text_width = area.width.saturating_sub(2);
    for card in cards.iter().skip(skip) {
        let height = card_height(card, text_width);
        if y >= bottom {
            break;
        }
        let card_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height: height.min(bottom - y),
        };
        let title = Span::styled(
            format!(" {} ", card.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        );
        let lines = card
            .details
            .iter()
            .map(|(label, value)| detail_line(label, value))
            .collect::<Vec<_>>();
        let widget = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, card_area);
        y = y.saturating_add(height);
    }
}

fn card_height(card: &PlayerRecord, text_width: u16) -> u16 {
    card.wrapped_rows(text_width).saturating_add(2)
}

fn detail_line(label: &str, value: &str) -> Line<'static> {
    if label.is_empty() {
        return Line::from(value.to_string());
    }
    Line::from(vec![
        Span::styled(
            format!("{label}:"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {value}")),
    ])
}

fn inline_lines(inlines: &[Inline], error: bool) -> Vec<Line<'static>> {
    let base = if error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => current.push(Span::styled(text.clone(), base)),
            Inline::Strong(text) => {
                current.push(Span::styled(text.clone(), base.add_modifier(Modifier::BOLD)))
            }
            Inline::Break => lines.push(Line::from(std::mem::take(&mut current))),
        }
    }
    lines.push(Line::from(current));
    lines
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Squad Terminal - Help",
        "",
        "  Enter        Ask the typed question",
        "  Backspace    Delete a character",
        "  Ctrl-U       Clear the question",
        "  ↑/↓          Scroll the answer",
        "  PgUp/PgDn    Scroll faster",
        "  Ctrl-E       Export the answer as HTML",
        "  F1           Toggle help",
        "  Esc / Ctrl-C Quit",
        "",
        "Answers mentioning a \"full squad\" are shown as player cards.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
