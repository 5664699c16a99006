use crate::ui::conversation::commands::{
    CommandEntry, ParsedCommand, command_entries, parse_slash_command,
};
use crate::ui::theme::Palette;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// Text being edited. `cursor` is a byte offset that always sits on a char
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor: usize,
}

impl TextAreaState {
    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn previous_boundary(&self) -> Option<usize> {
        self.content[..self.cursor].char_indices().last().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        match self.previous_boundary() {
            Some(start) => {
                self.content.replace_range(start..self.cursor, "");
                self.cursor = start;
                true
            }
            None => false,
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        match self.next_boundary() {
            Some(end) => {
                self.content.replace_range(self.cursor..end, "");
                true
            }
            None => false,
        }
    }

    fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }
}

/// Single-line input with a slash-command palette
#[derive(Debug, Clone)]
pub struct Composer {
    state: TextAreaState,
    placeholder: String,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl Composer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.content.is_empty()
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if self.show_command_palette {
                    if self.apply_selected_command() {
                        return ComposerResult::None;
                    }
                }
                if !self.state.content.trim().is_empty() {
                    let content = self.state.take();
                    self.close_command_palette();
                    return match parse_slash_command(&content) {
                        Some(command) => ComposerResult::Command(command),
                        None => ComposerResult::Submitted(content),
                    };
                }
            }
            KeyCode::Up if self.show_command_palette => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette => self.move_command_selection(1),
            KeyCode::Esc if self.show_command_palette => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette => {
                self.apply_selected_command();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.insert_char(c);
                self.sync_palette();
            }
            KeyCode::Backspace => {
                if self.state.backspace() {
                    self.sync_palette();
                }
            }
            KeyCode::Delete => {
                if self.state.delete() {
                    self.sync_palette();
                }
            }
            KeyCode::Left => {
                if let Some(i) = self.state.previous_boundary() {
                    self.state.cursor = i;
                }
            }
            KeyCode::Right => {
                if let Some(i) = self.state.next_boundary() {
                    self.state.cursor = i;
                }
            }
            KeyCode::Home => self.state.cursor = 0,
            KeyCode::End => self.state.cursor = self.state.content.len(),
            _ => {}
        }

        ComposerResult::None
    }

    /// Open, refresh or close the palette to match the current text
    fn sync_palette(&mut self) {
        let content = &self.state.content;
        let typing_command = content.starts_with('/') && !content.contains(char::is_whitespace);
        if !typing_command {
            self.close_command_palette();
            return;
        }
        if !self.show_command_palette {
            self.show_command_palette = true;
            self.selected_command = Some(0);
        }
        self.refresh_command_palette();
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self) {
        let query = self.state.content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let len = self.filtered_commands.len() as isize;
        let current = self.selected_command.unwrap_or(0) as isize;
        self.selected_command = Some((current + delta).rem_euclid(len) as usize);
    }

    fn apply_selected_command(&mut self) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        self.state.content = format!("/{} ", entry.keyword);
        self.state.cursor = self.state.content.len();
        self.close_command_palette();
        true
    }

    pub fn widget(&self, palette: Palette, title: String) -> ComposerWidget<'_> {
        ComposerWidget {
            composer: self,
            palette,
            title,
        }
    }
}

pub struct ComposerWidget<'a> {
    composer: &'a Composer,
    palette: Palette,
    title: String,
}

impl Widget for ComposerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let composer = self.composer;
        let palette = self.palette;

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title)
            .style(palette.base().fg(palette.accent));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if composer.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                composer.placeholder.as_str(),
                Style::default().fg(palette.muted),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = composer.state.content.clone();
            content.insert(composer.state.cursor.min(content.len()), '▌');
            let line = Line::from(vec![Span::styled(content, Style::default().fg(palette.text))]);
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
        }

        if composer.show_command_palette && !composer.filtered_commands.is_empty() {
            let filtered = &composer.filtered_commands;
            let palette_height = (filtered.len().min(6) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };

            Clear.render(palette_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(palette.base().fg(palette.accent));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            for (index, entry) in filtered.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if composer.selected_command == Some(index) {
                    palette.highlight().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" - ", Style::default().fg(palette.muted)),
                    Span::styled(entry.description, Style::default().fg(palette.muted)),
                ]);
                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_submit_clears_input() {
        let mut composer = Composer::new("Type...");
        type_text(&mut composer, "Привет мир");
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ComposerResult::Submitted("Привет мир".to_string()));
        assert!(composer.is_empty());
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut composer = Composer::new("Type...");
        type_text(&mut composer, "   ");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);
        assert_eq!(composer.content(), "   ");
    }

    #[test]
    fn test_editing_respects_char_boundaries() {
        let mut composer = Composer::new("");
        type_text(&mut composer, "çağ");
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "çğ");
        composer.handle_key(press(KeyCode::Home));
        composer.handle_key(press(KeyCode::Delete));
        assert_eq!(composer.content(), "ğ");
        composer.handle_key(press(KeyCode::End));
        type_text(&mut composer, "ü");
        assert_eq!(composer.content(), "ğü");
    }

    #[test]
    fn test_palette_completes_command() {
        let mut composer = Composer::new("");
        type_text(&mut composer, "/su");
        assert!(composer.is_palette_open());

        composer.handle_key(press(KeyCode::Tab));
        assert_eq!(composer.content(), "/summarize ");
        assert!(!composer.is_palette_open());

        match composer.handle_key(press(KeyCode::Enter)) {
            ComposerResult::Command(parsed) => assert_eq!(parsed.command, SlashCommand::Summarize),
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_palette_closes_after_argument_space() {
        let mut composer = Composer::new("");
        type_text(&mut composer, "/translate fr");
        assert!(!composer.is_palette_open());
        match composer.handle_key(press(KeyCode::Enter)) {
            ComposerResult::Command(parsed) => assert_eq!(parsed.argument(), Some("fr")),
            other => panic!("expected command, got {:?}", other),
        }
    }
}
