#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use chrono::Local;
use ratatui::prelude::Backend;
use ratatui::prelude::Margin;
use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::ScrollbarState;
use ratatui::Frame;

use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

const PAGE: u16 = 10;

fn message_lines(message: &Message, line_width: usize) -> Vec<Line<'static>> {
    let mut header_style = Style::default().add_modifier(Modifier::BOLD);
    let mut body_style = Style::default();
    match (&message.author, message.message_type()) {
        (_, MessageType::Error) => {
            header_style = header_style.fg(Color::Red);
            body_style = body_style.fg(Color::Red);
        }
        (Author::User, _) => header_style = header_style.fg(Color::Cyan),
        (Author::Assistant, _) => header_style = header_style.fg(Color::Magenta),
    }

    let timestamp = message
        .created_at
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();

    let mut lines = vec![Line::from(vec![
        Span::styled(message.author.to_string(), header_style),
        Span::styled(
            format!(" {timestamp}"),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    for line in message.as_string_lines(line_width.saturating_sub(2).max(1)) {
        lines.push(Line::from(Span::styled(format!("  {line}"), body_style)));
    }
    lines.push(Line::from(""));

    return lines;
}

/// Wrapped, scrollable rendering of the conversation.
#[derive(Default)]
pub struct Transcript {
    lines: Vec<Line<'static>>,
    rendered_key: Option<(usize, String, u16)>,
    viewport_length: u16,
    pub position: u16,
    scrollbar_state: ScrollbarState,
}

impl Transcript {
    /// Rewraps `messages` for `rect` when either changed. New messages scroll
    /// the view to the bottom.
    pub fn sync(&mut self, messages: &[Message], rect: Rect) {
        let last_id = messages
            .last()
            .map(|message| return message.id.to_string())
            .unwrap_or_default();
        let key = (messages.len(), last_id, rect.width);
        let content_changed = self
            .rendered_key
            .as_ref()
            .map_or(true, |rendered| return rendered.0 != key.0 || rendered.1 != key.1);

        if self.rendered_key.as_ref() != Some(&key) {
            let line_width = rect.width.saturating_sub(2) as usize;
            self.lines = messages
                .iter()
                .flat_map(|message| return message_lines(message, line_width))
                .collect();
            self.rendered_key = Some(key);
        }

        self.viewport_length = rect.height.saturating_sub(2);
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(self.len())
            .viewport_content_length(self.viewport_length);

        if content_changed {
            self.last();
        } else {
            self.position = self.position.min(self.max_position());
        }
    }

    pub fn len(&self) -> u16 {
        return u16::try_from(self.lines.len()).unwrap_or(u16::MAX);
    }

    fn max_position(&self) -> u16 {
        return self.len().saturating_sub(self.viewport_length);
    }

    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn up_page(&mut self) {
        for _ in 0..PAGE {
            self.up();
        }
    }

    pub fn down(&mut self) {
        self.position = self.position.saturating_add(1).min(self.max_position());
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn down_page(&mut self) {
        for _ in 0..PAGE {
            self.down();
        }
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn render<B: Backend>(&mut self, frame: &mut Frame<B>, rect: Rect) {
        frame.render_widget(
            Paragraph::new(self.lines.clone())
                .block(Block::default().borders(Borders::ALL).title("Chat"))
                .scroll((self.position, 0)),
            rect,
        );
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            rect.inner(&Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut self.scrollbar_state,
        );
    }
}
