use crate::bundle::is_hidden;
use crate::ui::{ListState, UiSession, rule};
use console::{Key, style};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CHROME_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_parent: bool,
}

/// `..` (unless at the filesystem root) then the visible child
/// directories of `dir`, by name. `None` when `dir` cannot be listed.
fn list_dirs(dir: &Path) -> Option<Vec<BrowserEntry>> {
    let mut children: Vec<BrowserEntry> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| !is_hidden(&e.file_name()))
            .filter(|e| e.path().is_dir())
            .map(|e| BrowserEntry {
                name: e.file_name().to_string_lossy().into_owned(),
                path: e.path(),
                is_parent: false,
            })
            .collect(),
        Err(err) => {
            log::debug!("cannot list {}: {}", dir.display(), err);
            return None;
        }
    };
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let mut entries = Vec::with_capacity(children.len() + 1);
    if let Some(parent) = dir.parent() {
        entries.push(BrowserEntry {
            name: "..".to_string(),
            path: parent.to_path_buf(),
            is_parent: true,
        });
    }
    entries.extend(children);
    Some(entries)
}

/// Picks the directory to scan by walking the filesystem.
pub struct Browser {
    current: PathBuf,
    entries: Vec<BrowserEntry>,
    readable: bool,
    list: ListState,
}

impl Browser {
    pub fn new(start: PathBuf) -> Self {
        let mut browser = Self {
            current: start,
            entries: Vec::new(),
            readable: true,
            list: ListState::default(),
        };
        browser.reload();
        browser
    }

    fn reload(&mut self) {
        match list_dirs(&self.current) {
            Some(entries) => {
                self.entries = entries;
                self.readable = true;
            }
            None => {
                self.entries.clear();
                self.readable = false;
            }
        }
        self.list = ListState::new(self.entries.len());
    }

    fn enter(&mut self, path: PathBuf) {
        self.current = path;
        self.reload();
    }

    fn open_current(&mut self) {
        if let Some(entry) = self.entries.get(self.list.cursor()) {
            let path = entry.path.clone();
            self.enter(path);
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.current.parent() {
            let parent = parent.to_path_buf();
            self.enter(parent);
        }
    }

    fn render_lines(&mut self, rows: usize, cols: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows);
        lines.push(
            style(" File Browser - Navigate to your FCP projects folder ")
                .cyan()
                .bold()
                .to_string(),
        );
        lines.push(style(format!(" {} ", self.current.display())).green().to_string());
        lines.push(rule(cols));

        let height = rows.saturating_sub(CHROME_ROWS);
        if self.entries.is_empty() {
            let notice = if self.readable {
                "  No folders here"
            } else {
                "  Empty directory or no permission"
            };
            lines.push(style(notice).red().to_string());
            lines.extend(std::iter::repeat_n(String::new(), height.saturating_sub(1)));
        } else {
            let range = self.list.visible(height);
            let shown = range.len();
            for idx in range {
                let entry = &self.entries[idx];
                let text = if entry.is_parent {
                    format!("  ↑ {} (go back)", entry.name)
                } else {
                    format!("  📁 {}", entry.name)
                };
                let text = console::truncate_str(&text, cols.saturating_sub(1), "...").into_owned();
                lines.push(if idx == self.list.cursor() {
                    style(text).reverse().bold().to_string()
                } else {
                    text
                });
            }
            lines.extend(std::iter::repeat_n(String::new(), height.saturating_sub(shown)));
        }

        lines.push(rule(cols));
        lines.push(
            style(" ↑/↓:Navigate | ENTER:Open | BACKSPACE:Back | s:Scan Here | q:Quit ")
                .yellow()
                .to_string(),
        );
        lines
    }

    /// Returns the directory to scan, or `None` when the user quits.
    pub fn run(&mut self, ui: &mut UiSession) -> io::Result<Option<PathBuf>> {
        loop {
            let (rows, cols) = ui.size();
            let lines = self.render_lines(rows, cols);
            ui.draw(&lines)?;

            match ui.read_key()? {
                Key::ArrowUp | Key::Char('k') => self.list.move_up(),
                Key::ArrowDown | Key::Char('j') => self.list.move_down(),
                Key::Enter | Key::ArrowRight => self.open_current(),
                Key::Backspace | Key::ArrowLeft => self.go_up(),
                Key::Char('s') | Key::Char('S') => return Ok(Some(self.current.clone())),
                Key::Escape | Key::Char('q') | Key::Char('Q') => return Ok(None),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(browser: &Browser) -> Vec<&str> {
        browser.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn lists_parent_then_visible_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Projects")).unwrap();
        fs::create_dir_all(dir.path().join("Archive")).unwrap();
        fs::create_dir_all(dir.path().join(".Trash")).unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let browser = Browser::new(dir.path().to_path_buf());
        assert_eq!(names(&browser), ["..", "Archive", "Projects"]);
        assert!(browser.entries[0].is_parent);
    }

    #[test]
    fn filesystem_root_has_no_parent_entry() {
        let root = Path::new("/");
        if let Some(entries) = list_dirs(root) {
            assert!(entries.iter().all(|e| !e.is_parent));
        }
    }

    #[test]
    fn enter_and_go_up_move_between_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Movies/Clients")).unwrap();

        let mut browser = Browser::new(dir.path().to_path_buf());
        browser.list.move_down();
        browser.open_current();
        assert_eq!(browser.current, dir.path().join("Movies"));
        assert_eq!(names(&browser), ["..", "Clients"]);
        assert_eq!(browser.list.cursor(), 0);

        browser.go_up();
        assert_eq!(browser.current, dir.path());
    }

    #[test]
    fn unreadable_directory_shows_a_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut browser = Browser::new(dir.path().join("missing"));
        assert!(browser.entries.is_empty());

        let lines = browser.render_lines(10, 80);
        assert_eq!(lines.len(), 10);
        assert!(lines[3].contains("no permission"));
    }
}
