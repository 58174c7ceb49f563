use crate::session::{ChatSession, RequestState};
use crate::ui::conversation::{
    get_help_text, ConversationComposer, ConversationHistory, ConversationResult, ParsedCommand,
    SlashCommand,
};
use crate::ui::sidebar::Sidebar;
use crate::ui::theme::ThemeMode;
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;

type Tui = Terminal<CrosstermBackend<Stdout>>;

const SCROLL_STEP: usize = 5;

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    /// A user turn was appended; draw, then wait for the reply
    AwaitReply,
    Quit,
}

/// Terminal front end around a [`ChatSession`].
///
/// The loop is explicit: read a key, mutate the session, draw. Replies are
/// awaited inline, so no key is read while a request is in flight.
pub struct App {
    session: ChatSession,
    composer: ConversationComposer,
    theme: ThemeMode,
    status: Option<String>,
    scroll: usize,
}

impl App {
    pub fn new(session: ChatSession, theme: ThemeMode) -> Self {
        Self {
            session,
            composer: ConversationComposer::new("Ask anything...", theme.palette()),
            theme,
            status: None,
            scroll: 0,
        }
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }

            let action = match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Paste(text) => {
                    self.handle_paste(&text);
                    AppAction::None
                }
                _ => AppAction::None,
            };

            match action {
                AppAction::None => {}
                AppAction::Quit => return Ok(()),
                AppAction::AwaitReply => {
                    terminal.draw(|frame| self.draw(frame))?;
                    self.session.resolve_reply().await;
                    self.scroll = 0;
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return AppAction::Quit,
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Char('t') if ctrl => {
                self.set_theme(self.theme.toggled());
                return AppAction::None;
            }
            KeyCode::Tab => {
                self.cycle_model(1);
                return AppAction::None;
            }
            KeyCode::BackTab => {
                self.cycle_model(-1);
                return AppAction::None;
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(SCROLL_STEP);
                return AppAction::None;
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                return AppAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ConversationResult::Submitted(text) => self.submit(&text),
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => AppAction::None,
        }
    }

    /// Pasted text goes into the composer as-is; embedded newlines never submit.
    pub fn handle_paste(&mut self, text: &str) {
        for c in text.chars().filter(|&c| c != '\r') {
            self.composer.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn submit(&mut self, text: &str) -> AppAction {
        match self.session.submit_user(text) {
            Ok(true) => {
                self.status = None;
                self.scroll = 0;
                AppAction::AwaitReply
            }
            Ok(false) => AppAction::None,
            Err(err) => {
                self.status = Some(err.to_string());
                AppAction::None
            }
        }
    }

    fn handle_slash_command(&mut self, command: ParsedCommand) -> AppAction {
        match command.command {
            SlashCommand::Model => match command.argument() {
                Some(query) => match self.session.select_model(query) {
                    Ok(entry) => self.status = Some(format!("Now chatting with {}", entry.label)),
                    Err(err) => self.status = Some(err.to_string()),
                },
                None => {
                    let labels: Vec<String> = self
                        .session
                        .catalog()
                        .labels()
                        .enumerate()
                        .map(|(i, label)| format!("{}. {}", i + 1, label))
                        .collect();
                    self.status = Some(format!("Models: {}", labels.join(" · ")));
                }
            },
            SlashCommand::Theme => {
                let target = command.theme_target().unwrap_or(self.theme.toggled());
                self.set_theme(target);
            }
            SlashCommand::Help => self.status = Some(get_help_text()),
            SlashCommand::Bye => return AppAction::Quit,
        }
        AppAction::None
    }

    fn cycle_model(&mut self, step: isize) {
        let entry = self.session.cycle_model(step);
        self.status = Some(format!("Now chatting with {}", entry.label));
    }

    fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
        self.composer.set_theme(theme.palette());
        tracing::debug!(dark = theme.is_dark(), "theme changed");
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn status_line(&self) -> String {
        match self.session.state() {
            RequestState::AwaitingReply => {
                format!("⏳ Thinking with {}...", self.session.model().label)
            }
            RequestState::Idle => self.status.clone().unwrap_or_else(|| {
                format!("Model: {} · /help for commands", self.session.model().label)
            }),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let palette = self.theme.palette();
        frame.render_widget(Block::default().style(palette.base()), frame.size());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(40)])
            .split(frame.size());

        frame.render_widget(
            Sidebar::new(self.session.catalog(), self.session.model().label, self.theme),
            columns[0],
        );

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(self.composer.height()),
            ])
            .split(columns[1]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "🤖 Multi-Model Chatbot",
                palette.base().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center),
            rows[0],
        );

        frame.render_widget(
            ConversationHistory::new(self.session.conversation().all(), palette).scrolled(self.scroll),
            rows[1],
        );

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(self.status_line(), palette.muted()))),
            rows[2],
        );

        frame.render_widget(&self.composer, rows[3]);
    }
}

pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    // Lets Shift+Enter arrive as a distinct key where the terminal supports it
    let _ = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    );
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Undo everything `setup_terminal` did. Safe to call more than once.
pub fn reset_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen, Show)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

/// Restore the screen before the panic message is printed, so it stays readable.
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = reset_terminal();
        original(info);
    }));
}

/// Runs `restore` when dropped: on return, on `?` and while unwinding.
pub struct RestoreOnDrop<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> RestoreOnDrop<F> {
    pub fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Take over the terminal, run the chat loop, and always hand the terminal back.
pub async fn run(session: ChatSession, theme: ThemeMode) -> Result<()> {
    install_panic_hook();
    let _restore = RestoreOnDrop::new(|| {
        if let Err(err) = reset_terminal() {
            tracing::warn!(error = ?err, "failed to restore terminal");
        }
    });

    let mut terminal = setup_terminal()?;
    App::new(session, theme).run(&mut terminal).await
}
