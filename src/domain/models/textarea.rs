use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn default() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title("Describe the app you want to build")
                .padding(Padding::new(1, 1, 0, 0)),
        );

        return textarea;
    }

    /// A fresh text area pre-filled with `text`, used to reuse history prompts.
    pub fn with_text(text: &str) -> tui_textarea::TextArea<'a> {
        let mut textarea = TextArea::default();
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                textarea.insert_newline();
            }
            for char in line.chars() {
                textarea.insert_char(char);
            }
        }

        return textarea;
    }
}
