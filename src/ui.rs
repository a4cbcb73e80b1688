use console::{Key, Term, style};
use std::io;
use std::ops::Range;

/// Cursor and viewport over a list of `len` rows.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    cursor: usize,
    offset: usize,
    len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            len,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.len {
            self.cursor += 1;
        }
    }

    /// Changes the row count, keeping the cursor on a valid row.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.offset = self.offset.min(self.cursor);
    }

    /// Rows to draw in a viewport of `height` lines, scrolled so the
    /// cursor stays visible.
    pub fn visible(&mut self, height: usize) -> Range<usize> {
        let height = height.max(1);
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
        self.offset..(self.offset + height).min(self.len)
    }
}

/// The terminal for one interactive run.
///
/// Hides the cursor while alive; restores it and clears the screen on drop.
pub struct UiSession {
    term: Term,
}

impl UiSession {
    pub fn new() -> io::Result<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return Err(io::Error::other("interactive mode needs a terminal"));
        }
        term.hide_cursor()?;
        Ok(Self { term })
    }

    /// (rows, columns)
    pub fn size(&self) -> (usize, usize) {
        let (rows, cols) = self.term.size();
        (rows as usize, cols as usize)
    }

    pub fn draw(&self, lines: &[String]) -> io::Result<()> {
        self.term.clear_screen()?;
        self.term.write_str(&lines.join("\n"))?;
        Ok(())
    }

    pub fn read_key(&self) -> io::Result<Key> {
        self.term.read_key()
    }

    /// Shows a centered notice and waits for one of `choices`.
    pub fn notice(&self, title: &str, body: &[&str], choices: &[(char, &str)]) -> io::Result<char> {
        let (rows, cols) = self.size();
        let mut lines = Vec::new();
        let block = 3 + body.len() + choices.len();
        lines.extend(std::iter::repeat_n(String::new(), rows.saturating_sub(block) / 2));
        let banner = style(format!(" {title} ")).bold().reverse().to_string();
        lines.push(center(&banner, title.len() + 2, cols));
        lines.push(String::new());
        for line in body {
            lines.push(center(line, line.len(), cols));
        }
        lines.push(String::new());
        for (key, label) in choices {
            let text = format!("Press '{key}' to {label}");
            lines.push(center(&style(&text).yellow().to_string(), text.len(), cols));
        }
        self.draw(&lines)?;

        loop {
            match self.read_key()? {
                Key::Char(c) => {
                    let c = c.to_ascii_lowercase();
                    if choices.iter().any(|(k, _)| *k == c) {
                        return Ok(c);
                    }
                }
                Key::Escape => {
                    if let Some((k, _)) = choices.iter().find(|(k, _)| *k == 'q') {
                        return Ok(*k);
                    }
                }
                _ => {}
            }
        }
    }
}

impl Drop for UiSession {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.clear_screen();
    }
}

fn center(text: &str, width: usize, cols: usize) -> String {
    format!("{}{}", " ".repeat(cols.saturating_sub(width) / 2), text)
}

/// Left text and right text on one row of `width` columns.
pub fn spread(left: &str, right: &str, width: usize) -> String {
    let right_width = console::measure_text_width(right);
    let room = width.saturating_sub(right_width + 2).max(4);
    let left = console::truncate_str(left, room, "...");
    let gap = width
        .saturating_sub(console::measure_text_width(&left) + right_width)
        .max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

pub fn rule(width: usize) -> String {
    "─".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_stays_inside_the_list() {
        let mut list = ListState::new(3);
        list.move_up();
        assert_eq!(list.cursor(), 0);
        list.move_down();
        list.move_down();
        list.move_down();
        assert_eq!(list.cursor(), 2);
    }

    #[test]
    fn shrinking_clamps_the_cursor() {
        let mut list = ListState::new(5);
        for _ in 0..4 {
            list.move_down();
        }
        list.set_len(2);
        assert_eq!(list.cursor(), 1);
        list.set_len(0);
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.visible(10), 0..0);
    }

    #[test]
    fn viewport_follows_the_cursor() {
        let mut list = ListState::new(10);
        assert_eq!(list.visible(4), 0..4);
        for _ in 0..5 {
            list.move_down();
        }
        assert_eq!(list.visible(4), 2..6);
        for _ in 0..4 {
            list.move_up();
        }
        assert_eq!(list.visible(4), 1..5);
    }

    #[test]
    fn viewport_near_the_end_is_cut_short() {
        let mut list = ListState::new(3);
        assert_eq!(list.visible(8), 0..3);
    }

    #[test]
    fn spread_fills_the_row() {
        let row = spread("[ ] Show.fcpbundle/day/Render Files", "3.3 MB", 50);
        assert_eq!(console::measure_text_width(&row), 50);
        assert!(row.ends_with("3.3 MB"));

        let narrow = spread("a very long folder name that will not fit", "1.0 GB", 20);
        assert!(narrow.contains("..."));
        assert!(narrow.ends_with("1.0 GB"));
    }
}
