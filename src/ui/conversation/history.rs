//! Conversation history display component

use crate::conversation::Message;
use crate::languages::Language;
use crate::state::AppState;
use crate::ui::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the message log of an [`AppState`] snapshot
pub struct ConversationHistory<'a> {
    state: &'a AppState,
    languages: &'a [Language],
    palette: Palette,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(state: &'a AppState, languages: &'a [Language], palette: Palette) -> Self {
        Self {
            state,
            languages,
            palette,
        }
    }

    /// Every line of the log, plus the line index where the selected message starts
    fn build_lines(&self, width: u16) -> (Vec<Line<'static>>, Option<usize>) {
        let mut all_lines = Vec::new();
        let mut selected_start = None;

        for message in self.state.conversation.iter() {
            if self.state.ui.selected == Some(message.id) {
                selected_start = Some(all_lines.len());
            }
            all_lines.append(&mut self.render_message(message, width));
            all_lines.push(Line::from(""));
        }

        (all_lines, selected_start)
    }

    /// Render a single message into lines
    fn render_message(&self, message: &Message, width: u16) -> Vec<Line<'static>> {
        let palette = self.palette;
        let content_width = width.saturating_sub(4) as usize;
        let is_selected = self.state.ui.selected == Some(message.id);
        let mut lines = Vec::new();

        let timestamp = message.created_at.format("%H:%M:%S").to_string();
        let marker = if is_selected { "▶" } else { " " };
        let header_style = if is_selected {
            palette.highlight().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} {} {} ", marker, message.id, timestamp), header_style),
            Span::styled("─".repeat(20), Style::default().fg(palette.muted)),
        ]));

        let text_style = if message.is_pending() {
            Style::default().fg(palette.user).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(palette.user)
        };
        for content_line in wrap_lines(&message.text, content_width) {
            lines.push(indented(content_line, text_style));
        }

        if message.is_pending() {
            lines.push(indented(
                "⏳ Detecting language...".to_string(),
                Style::default().fg(palette.muted),
            ));
            return lines;
        }

        let detected = match &message.detected_language {
            Some(language) => format!(
                "Detected: {} ({})",
                language.display_name,
                language.confidence_percent()
            ),
            None => "Detected: unknown".to_string(),
        };
        lines.push(indented(detected, Style::default().fg(palette.muted)));

        if let Some(summary) = &message.summary {
            let summary_style = Style::default().fg(palette.summary);
            lines.push(indented(
                "📝 Summary".to_string(),
                summary_style.add_modifier(Modifier::BOLD),
            ));
            for summary_line in wrap_lines(summary, content_width.saturating_sub(2)) {
                lines.push(indented(format!("  {}", summary_line), summary_style));
            }
        }

        for (language, translation) in &message.translations {
            let translation_style = Style::default().fg(palette.translation);
            lines.push(indented(
                format!("🌐 {}", language.display_name()),
                translation_style.add_modifier(Modifier::BOLD),
            ));
            for translated_line in wrap_lines(translation, content_width.saturating_sub(2)) {
                lines.push(indented(format!("  {}", translated_line), translation_style));
            }
        }

        if self.state.is_menu_open(message.id) {
            let mut spans = vec![Span::styled(
                "  Translate to: ",
                Style::default().fg(palette.muted),
            )];
            for language in self.languages {
                let style = if *language == self.state.ui.target_language {
                    palette.highlight()
                } else {
                    Style::default().fg(palette.text)
                };
                spans.push(Span::styled(format!(" {} ", language.display_name()), style));
            }
            lines.push(Line::from(spans));
        }

        lines
    }

    fn render_welcome(&self, inner_area: Rect, buf: &mut Buffer) {
        let palette = self.palette;
        let welcome_lines = vec![
            Line::from(vec![Span::styled(
                "Welcome to Parlo!",
                Style::default().fg(palette.accent),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Type any text to detect its language, then translate or summarize it.",
                Style::default().fg(palette.text),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Press Enter to send, / for commands, /help for keys.",
                Style::default().fg(palette.muted),
            )]),
        ];

        for (i, line) in welcome_lines.iter().enumerate() {
            if i < inner_area.height as usize {
                buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
            }
        }
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.palette.base());
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Conversation")
            .style(self.palette.base().fg(self.palette.muted));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.conversation.is_empty() {
            self.render_welcome(inner_area, buf);
            return;
        }

        let (all_lines, selected_start) = self.build_lines(inner_area.width);
        let height = inner_area.height as usize;
        let start = visible_start(all_lines.len(), height, selected_start);

        for (i, line) in all_lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

fn indented(text: String, style: Style) -> Line<'static> {
    Line::from(vec![Span::raw("  "), Span::styled(text, style)])
}

/// First line to draw: stick to the bottom unless that hides the selection
fn visible_start(total: usize, height: usize, selected_start: Option<usize>) -> usize {
    let bottom = total.saturating_sub(height);
    match selected_start {
        Some(selected) if selected < bottom => selected,
        _ => bottom,
    }
}

/// Wrap each line of `text` on its own, keeping the author's line breaks
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let lines: Vec<String> = text.lines().flat_map(|line| wrap_text(line, width)).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Wrap text to fit within the given width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + word_len + 1 > width {
            lines.push(std::mem::take(&mut current_line));
            current_len = 0;
        }
        if current_len > 0 {
            current_line.push(' ');
            current_len += 1;
        }
        current_line.push_str(word);
        current_len += word_len;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
