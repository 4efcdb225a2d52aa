use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;
use askbox_core::{ChatState, Controller, MAX_DRAFT_CHARS};
use crate::ui::chat_paragraph;

/// Input box grows with the draft between these heights (borders included)
pub const MIN_INPUT_HEIGHT: u16 = 3;
pub const MAX_INPUT_HEIGHT: u16 = 8;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Row and display column of a character cursor inside multi-line text
pub fn cursor_row_col(text: &str, cursor: usize) -> (usize, usize) {
    let before: String = text.chars().take(cursor).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(UnicodeWidthStr::width).unwrap_or(0);
    (row, col)
}

pub struct App {
    pub should_quit: bool,
    pub provider_label: String,
    controller: Controller,

    // Draft editing
    pub cursor: usize, // char position in the draft

    // Chat pane
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16, // inner height, set by the renderer
    pub chat_width: u16,  // inner width, set by the renderer
    pub chat_area: Option<Rect>, // for mouse hit-testing

    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(controller: Controller, provider_label: String) -> Self {
        Self {
            should_quit: false,
            provider_label,
            controller,
            cursor: 0,
            chat_scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
        }
    }

    pub fn state(&self) -> &ChatState {
        self.controller.state()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn draft(&self) -> &str {
        self.controller.state().draft()
    }

    pub fn draft_chars(&self) -> usize {
        self.draft().chars().count()
    }

    // Draft editing

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut buf));
    }

    /// Insert at the cursor, keeping only as much as fits under the limit
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let room = MAX_DRAFT_CHARS.saturating_sub(self.draft_chars());
        let accepted: String = text.chars().take(room).collect();
        if accepted.is_empty() {
            return;
        }

        let mut draft = self.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.insert_str(byte_pos, &accepted);
        self.cursor += accepted.chars().count();
        self.controller.update_draft(&draft);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let mut draft = self.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.remove(byte_pos);
        self.controller.update_draft(&draft);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.draft_chars() {
            return;
        }
        let mut draft = self.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.remove(byte_pos);
        self.controller.update_draft(&draft);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft_chars());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft_chars();
    }

    /// Box height for the current draft, between the min and max
    pub fn input_height(&self) -> u16 {
        let rows = self.draft().split('\n').count() as u16;
        (rows + 2).clamp(MIN_INPUT_HEIGHT, MAX_INPUT_HEIGHT)
    }

    // Conversation

    /// Try to send the draft. Returns the question to ask the provider when
    /// the submission was accepted.
    pub fn submit_draft(&mut self) -> Option<String> {
        let draft = self.draft().to_string();
        let question = self.controller.begin_submit(&draft)?;
        self.cursor = 0;
        self.follow_bottom = true;
        self.scroll_to_bottom();
        Some(question)
    }

    pub fn on_answer(&mut self, outcome: anyhow::Result<String>) {
        self.controller.resolve(outcome);
        if self.follow_bottom {
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.state().is_in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Scrolling

    fn max_scroll(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        let rows = chat_paragraph(self.state(), self.animation_frame).line_count(wrap_width);
        u16::try_from(rows).unwrap_or(u16::MAX).saturating_sub(visible_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max);
        self.follow_bottom = self.chat_scroll >= max;
    }

    pub fn page_rows(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askbox_core::StubProvider;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let controller = Controller::new(Arc::new(StubProvider::with_latency(Duration::ZERO)));
        App::new(controller, "stub".to_string())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut app = app();
        type_text(&mut app, "héllo");
        app.cursor_left();
        app.cursor_left();
        app.insert_char('ü');
        assert_eq!(app.draft(), "hélülo");

        app.backspace();
        app.cursor_home();
        app.delete();
        assert_eq!(app.draft(), "éllo");
        assert_eq!(app.cursor, 0);

        app.cursor_end();
        assert_eq!(app.cursor, 4);
        app.cursor_right();
        assert_eq!(app.cursor, 4);
    }

    #[test]
    fn test_insert_stops_at_limit() {
        let mut app = app();
        app.insert_str(&"a".repeat(MAX_DRAFT_CHARS - 2));
        app.insert_str("bcdef");
        assert_eq!(app.draft_chars(), MAX_DRAFT_CHARS);
        assert!(app.draft().ends_with("bc"));

        app.insert_char('z');
        assert_eq!(app.draft_chars(), MAX_DRAFT_CHARS);
        assert_eq!(app.cursor, MAX_DRAFT_CHARS);
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut app = app();
        app.insert_str("one\r\ntwo\rthree");
        assert_eq!(app.draft(), "one\ntwo\nthree");
    }

    #[test]
    fn test_input_grows_with_lines() {
        let mut app = app();
        assert_eq!(app.input_height(), MIN_INPUT_HEIGHT);
        app.insert_str("a\nb\nc");
        assert_eq!(app.input_height(), 5);
        app.insert_str(&"\n".repeat(20));
        assert_eq!(app.input_height(), MAX_INPUT_HEIGHT);
    }

    #[test]
    fn test_submit_resets_cursor_and_blocks_second_submit() {
        let mut app = app();
        type_text(&mut app, "What is a closure?");
        assert_eq!(app.submit_draft(), Some("What is a closure?".to_string()));
        assert_eq!(app.draft(), "");
        assert_eq!(app.cursor, 0);
        assert!(app.state().is_in_flight());

        type_text(&mut app, "X");
        assert_eq!(app.submit_draft(), None);
        assert_eq!(app.draft(), "X");

        app.on_answer(Err(anyhow::anyhow!("timeout")));
        assert!(!app.state().is_in_flight());
        assert!(app.state().conversation().last().unwrap().is_error());
    }

    #[test]
    fn test_blank_submit_keeps_cursor() {
        let mut app = app();
        type_text(&mut app, "   ");
        assert_eq!(app.submit_draft(), None);
        assert_eq!(app.cursor, 3);
        assert_eq!(app.draft(), "   ");
    }

    #[test]
    fn test_cursor_row_col() {
        assert_eq!(cursor_row_col("", 0), (0, 0));
        assert_eq!(cursor_row_col("abc", 2), (0, 2));
        assert_eq!(cursor_row_col("ab\ncdé\nf", 6), (1, 3));
        assert_eq!(cursor_row_col("ab\n", 3), (1, 0));
        // Columns are display cells, not chars
        assert_eq!(cursor_row_col("你好", 2), (0, 4));
        assert_eq!(cursor_row_col("a😀b", 2), (0, 3));
    }

    #[test]
    fn test_animation_only_ticks_in_flight() {
        let mut app = app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        type_text(&mut app, "q");
        app.submit_draft();
        app.tick_animation();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }

    #[test]
    fn test_scrolling_clamps_and_tracks_bottom() {
        let mut app = app();
        app.chat_height = 2;
        app.chat_width = 80;

        // Welcome message: role line, two content lines, blank line
        app.scroll_to_bottom();
        assert_eq!(app.chat_scroll, 2);

        app.scroll_up(5);
        assert_eq!(app.chat_scroll, 0);
        assert!(!app.follow_bottom);

        app.scroll_down(10);
        assert_eq!(app.chat_scroll, 2);
        assert!(app.follow_bottom);
    }
}
