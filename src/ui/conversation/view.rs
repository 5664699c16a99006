use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::debug;

use crate::conversation::MessageId;
use crate::manager::ConversationManager;
use crate::state::{AppState, Theme};
use crate::ui::conversation::commands::{
    ParsedCommand, SlashCommand, get_help_text, parse_slash_command,
};
use crate::ui::conversation::composer::{Composer, ComposerResult};
use crate::ui::conversation::history::ConversationHistory;
use crate::ui::theme::Palette;

/// What the terminal loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    None,
    Exit,
}

/// Translates input into manager calls and draws the latest snapshot
pub struct ChatView {
    manager: Arc<ConversationManager>,
    composer: Composer,
    show_help: bool,
}

impl ChatView {
    pub fn new(manager: Arc<ConversationManager>) -> Self {
        Self {
            manager,
            composer: Composer::new("Type or paste text to detect, translate and summarize..."),
            show_help: false,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        if key.kind != KeyEventKind::Press {
            return ChatAction::None;
        }

        let state = self.manager.snapshot();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let menu_open_for = state
            .ui
            .selected
            .filter(|id| state.is_menu_open(*id));

        if self.show_help {
            self.show_help = false;
            if key.code == KeyCode::Esc {
                return ChatAction::None;
            }
        }

        match key.code {
            KeyCode::Char('c') if ctrl => return ChatAction::Exit,
            KeyCode::Char('l') if ctrl => {
                self.manager.toggle_theme();
                return ChatAction::None;
            }
            KeyCode::Char('t') if ctrl => {
                if let Some(id) = state.ui.selected {
                    self.manager.toggle_menu(id);
                }
                return ChatAction::None;
            }
            KeyCode::Char('s') if ctrl => {
                self.summarize_selected(&state);
                return ChatAction::None;
            }
            KeyCode::Up if !self.composer.is_palette_open() => {
                self.manager.select_previous();
                return ChatAction::None;
            }
            KeyCode::Down if !self.composer.is_palette_open() => {
                self.manager.select_next();
                return ChatAction::None;
            }
            KeyCode::Left | KeyCode::Right
                if menu_open_for.is_some() && self.composer.is_empty() =>
            {
                self.manager.cycle_target_language(key.code == KeyCode::Right);
                return ChatAction::None;
            }
            KeyCode::Enter if menu_open_for.is_some() && self.composer.is_empty() => {
                if let Some(id) = menu_open_for {
                    let target = state.ui.target_language.code().to_string();
                    self.spawn_translate(&state, id, target);
                }
                return ChatAction::None;
            }
            KeyCode::Esc if !self.composer.is_palette_open() => {
                if let Some(id) = menu_open_for {
                    self.manager.toggle_menu(id);
                } else if state.last_error.is_some() {
                    self.manager.dismiss_error();
                }
                return ChatAction::None;
            }
            // input stays in the composer until the in-flight call finishes
            KeyCode::Enter
                if state.is_processing()
                    && !self.composer.is_palette_open()
                    && self.input_waits_for_idle() =>
            {
                return ChatAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(text) => {
                self.spawn_submit(text);
                ChatAction::None
            }
            ComposerResult::Command(command) => self.run_command(command, &state),
            ComposerResult::None => ChatAction::None,
        }
    }

    /// Plain text and idle-only commands cannot run while a call is in flight
    fn input_waits_for_idle(&self) -> bool {
        match parse_slash_command(self.composer.content()) {
            Some(parsed) => parsed.command.needs_idle(),
            None => true,
        }
    }

    fn run_command(&mut self, command: ParsedCommand, state: &AppState) -> ChatAction {
        if command.command.needs_idle() && state.is_processing() {
            debug!(command = command.command.command(), "ignored while processing");
            return ChatAction::None;
        }

        match command.command {
            SlashCommand::Translate => {
                if let Some(id) = state.ui.selected {
                    let target = command
                        .argument()
                        .map(str::to_string)
                        .unwrap_or_else(|| state.ui.target_language.code().to_string());
                    self.spawn_translate(state, id, target);
                }
            }
            SlashCommand::Summarize => self.summarize_selected(state),
            SlashCommand::Languages => {
                if let Some(id) = state.ui.selected {
                    self.manager.toggle_menu(id);
                }
            }
            SlashCommand::Target => match command.argument() {
                Some(code) => {
                    let _ = self.manager.set_target_language(code);
                }
                None => {
                    self.manager.cycle_target_language(true);
                }
            },
            SlashCommand::Theme => self.manager.toggle_theme(),
            SlashCommand::Dismiss => self.manager.dismiss_error(),
            SlashCommand::Help => self.show_help = true,
            SlashCommand::Quit => return ChatAction::Exit,
        }
        ChatAction::None
    }

    fn summarize_selected(&self, state: &AppState) {
        if state.is_processing() {
            return;
        }
        let Some(id) = state.ui.selected else {
            return;
        };
        let manager = self.manager.clone();
        tokio::spawn(async move {
            if let Err(err) = manager.summarize(id).await {
                debug!(%err, "summarize finished with error");
            }
        });
    }

    fn spawn_translate(&self, state: &AppState, id: MessageId, target: String) {
        if state.is_processing() {
            return;
        }
        let manager = self.manager.clone();
        tokio::spawn(async move {
            if let Err(err) = manager.translate(id, &target).await {
                debug!(%err, "translate finished with error");
            }
        });
    }

    fn spawn_submit(&self, text: String) {
        let manager = self.manager.clone();
        tokio::spawn(async move {
            if let Err(err) = manager.submit(text).await {
                debug!(%err, "submit finished with error");
            }
        });
    }

    pub fn draw(&self, frame: &mut Frame, state: &AppState) {
        let palette = Palette::for_theme(state.ui.theme);
        let area = frame.size();
        let error_height = if state.last_error.is_some() { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),               // History
                Constraint::Length(1),            // Status
                Constraint::Length(error_height), // Error banner
                Constraint::Length(3),            // Composer
            ])
            .split(area);

        let languages = &self.manager.settings().languages;
        frame.render_widget(ConversationHistory::new(state, languages, palette), chunks[0]);
        frame.render_widget(
            Paragraph::new(status_line(state, palette)).style(palette.base()),
            chunks[1],
        );

        if let Some(error) = &state.last_error {
            let banner = Paragraph::new(Line::from(vec![
                Span::styled(
                    "✖ ",
                    Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
                ),
                Span::styled(error.to_string(), Style::default().fg(palette.error)),
                Span::styled("  (Esc to dismiss)", Style::default().fg(palette.muted)),
            ]))
            .block(Block::default().borders(Borders::ALL).style(palette.base().fg(palette.error)))
            .wrap(Wrap { trim: true });
            frame.render_widget(banner, chunks[2]);
        }

        let title = if state.is_processing() {
            "⏳ Processing...".to_string()
        } else {
            "✏ Message".to_string()
        };
        frame.render_widget(self.composer.widget(palette, title), chunks[3]);

        if self.show_help {
            let popup = centered(area, 70, 16);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(get_help_text())
                    .block(Block::default().borders(Borders::ALL).title("Help"))
                    .style(palette.base())
                    .wrap(Wrap { trim: false }),
                popup,
            );
        }
    }
}

fn status_line(state: &AppState, palette: Palette) -> Line<'static> {
    let activity = match state.operation() {
        Some(operation) => Span::styled(operation.describe(), Style::default().fg(palette.accent)),
        None => Span::styled("Ready", Style::default().fg(palette.muted)),
    };
    let theme = match state.ui.theme {
        Theme::Dark => "🌙 dark",
        Theme::Light => "☀ light",
    };

    Line::from(vec![
        Span::raw(" "),
        activity,
        Span::styled(
            format!(
                "  │ target: {}  │ messages: {}  │ {}",
                state.ui.target_language.display_name(),
                state.conversation.len(),
                theme
            ),
            Style::default().fg(palette.muted),
        ),
    ])
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::languages::Language;
    use crate::manager::ChatSettings;
    use crate::providers::{
        Detection, Detector, SourceLanguage, Summarizer, SummaryOptions, Translator,
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct SpanishDetector {
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl Detector for SpanishDetector {
        async fn detect(&self, _text: &str) -> Result<Detection, ProviderError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(Detection {
                language_code: "es".into(),
                confidence: 0.99,
            })
        }
    }

    struct TaggingTranslator;

    #[async_trait]
    impl Translator for TaggingTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &SourceLanguage,
            target: Language,
        ) -> Result<String, ProviderError> {
            Ok(format!("[{}] {}", target.code(), text))
        }
    }

    struct FixedSummarizer;

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(
            &self,
            _text: &str,
            _options: &SummaryOptions,
        ) -> Result<String, ProviderError> {
            Ok("- short".into())
        }
    }

    fn manager(gate: Option<Arc<Notify>>) -> Arc<ConversationManager> {
        Arc::new(ConversationManager::new(
            Arc::new(SpanishDetector { gate }),
            Arc::new(TaggingTranslator),
            Arc::new(FixedSummarizer),
            ChatSettings::default(),
        ))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(view: &mut ChatView, text: &str) {
        for c in text.chars() {
            view.handle_key(press(KeyCode::Char(c)));
        }
    }

    async fn wait_for(
        manager: &ConversationManager,
        ready: impl FnMut(&Arc<AppState>) -> bool,
    ) -> Arc<AppState> {
        let mut updates = manager.subscribe();
        let state = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(ready))
            .await
            .expect("state never reached")
            .expect("manager dropped");
        Arc::clone(&state)
    }

    #[tokio::test]
    async fn test_menu_keys_cycle_target_and_translate() {
        let manager = manager(None);
        let id = manager.submit("Hola amigos").await.unwrap();
        let mut view = ChatView::new(manager.clone());

        view.handle_key(ctrl('t'));
        assert!(manager.snapshot().is_menu_open(id));

        view.handle_key(press(KeyCode::Right));
        assert_eq!(manager.snapshot().ui.target_language, Language::Spanish);
        view.handle_key(press(KeyCode::Left));
        view.handle_key(press(KeyCode::Left));
        assert_eq!(manager.snapshot().ui.target_language, Language::Turkish);

        assert_eq!(view.handle_key(press(KeyCode::Enter)), ChatAction::None);
        let state = wait_for(&manager, |s| {
            s.conversation
                .get(id)
                .is_some_and(|m| m.translation(Language::Turkish).is_some())
        })
        .await;

        let message = state.conversation.get(id).unwrap();
        assert_eq!(message.translation(Language::Turkish), Some("[tr] Hola amigos"));
        assert!(!state.is_menu_open(id));
        assert!(view.composer.is_empty());
    }

    #[tokio::test]
    async fn test_esc_closes_menu_before_dismissing_error() {
        let manager = manager(None);
        let id = manager.submit("Hola").await.unwrap();
        let _ = manager.submit("   ").await;
        let mut view = ChatView::new(manager.clone());

        view.handle_key(ctrl('t'));
        view.handle_key(press(KeyCode::Esc));
        let state = manager.snapshot();
        assert!(!state.is_menu_open(id));
        assert!(state.last_error.is_some());

        view.handle_key(press(KeyCode::Esc));
        assert!(manager.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn test_input_waits_while_processing() {
        let gate = Arc::new(Notify::new());
        let manager = manager(Some(gate.clone()));
        let mut view = ChatView::new(manager.clone());

        type_text(&mut view, "Hola");
        view.handle_key(press(KeyCode::Enter));
        wait_for(&manager, |s| s.is_processing()).await;

        type_text(&mut view, "otra vez");
        view.handle_key(press(KeyCode::Enter));
        assert_eq!(view.composer.content(), "otra vez");

        let mut commands = ChatView::new(manager.clone());
        type_text(&mut commands, "/summarize");
        commands.handle_key(press(KeyCode::Enter));
        commands.handle_key(press(KeyCode::Enter));
        assert_eq!(commands.composer.content(), "/summarize ");

        // commands that do not call a provider still run
        let mut theme = ChatView::new(manager.clone());
        type_text(&mut theme, "/theme");
        theme.handle_key(press(KeyCode::Enter));
        theme.handle_key(press(KeyCode::Enter));
        assert!(theme.composer.is_empty());
        assert_eq!(manager.snapshot().ui.theme, Theme::Light);
        assert_eq!(manager.snapshot().conversation.len(), 1);

        gate.notify_one();
        wait_for(&manager, |s| !s.is_processing() && s.conversation.pending_count() == 0).await;

        commands.handle_key(press(KeyCode::Enter));
        assert!(commands.composer.is_empty());
        let state = wait_for(&manager, |s| {
            s.conversation.last().is_some_and(|m| m.summary.is_some())
        })
        .await;
        assert_eq!(state.conversation.last().unwrap().summary.as_deref(), Some("- short"));
    }
}
