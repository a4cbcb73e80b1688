use crate::catalog::{Catalog, FolderId};
use crate::cleaner::{self, CleanResult};
use crate::format::format_size;
use crate::ui::{ListState, UiSession, rule, spread};
use console::{Key, style};
use std::collections::BTreeSet;
use std::io;

/// Rows taken by everything except the item list.
const CHROME_ROWS: usize = 6;

/// How the list was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// Back to the directory browser.
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    Toggle,
    ToggleAll,
    DeleteSelected,
    DeleteAll,
    Back,
    Quit,
    Ignore,
}

fn action_for(key: &Key, allow_back: bool) -> Action {
    match key {
        Key::ArrowUp | Key::Char('k') => Action::Up,
        Key::ArrowDown | Key::Char('j') => Action::Down,
        Key::Char(' ') | Key::Enter => Action::Toggle,
        Key::Char('a') => Action::ToggleAll,
        Key::Char('d') => Action::DeleteSelected,
        Key::Char('D') => Action::DeleteAll,
        Key::Char('b') | Key::Char('B') if allow_back => Action::Back,
        Key::Escape | Key::Char('q') | Key::Char('Q') => Action::Quit,
        _ => Action::Ignore,
    }
}

/// Full-screen multi-select list over the live folders of a catalog.
pub struct Selector<'a> {
    catalog: &'a mut Catalog,
    items: Vec<FolderId>,
    selected: BTreeSet<FolderId>,
    list: ListState,
    status: Option<String>,
    allow_back: bool,
}

impl<'a> Selector<'a> {
    pub fn new(catalog: &'a mut Catalog, allow_back: bool) -> Self {
        let items = catalog.live_ids();
        let list = ListState::new(items.len());
        Self {
            catalog,
            items,
            selected: BTreeSet::new(),
            list,
            status: None,
            allow_back,
        }
    }

    fn total_size(&self) -> u64 {
        self.catalog.size_of(&self.items)
    }

    fn selected_size(&self) -> u64 {
        let ids: Vec<FolderId> = self.selected.iter().copied().collect();
        self.catalog.size_of(&ids)
    }

    fn current(&self) -> Option<FolderId> {
        self.items.get(self.list.cursor()).copied()
    }

    fn toggle_current(&mut self) {
        if let Some(id) = self.current() {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        }
    }

    fn toggle_all(&mut self) {
        if self.selected.len() == self.items.len() {
            self.selected.clear();
        } else {
            self.selected = self.items.iter().copied().collect();
        }
    }

    /// The selection, or the row under the cursor when nothing is selected.
    fn delete_targets(&self) -> Vec<FolderId> {
        if self.selected.is_empty() {
            self.current().into_iter().collect()
        } else {
            self.items
                .iter()
                .copied()
                .filter(|id| self.selected.contains(id))
                .collect()
        }
    }

    fn delete(&mut self, ids: &[FolderId]) -> CleanResult {
        let result = cleaner::clean(&mut *self.catalog, ids);
        self.apply(&result);
        result
    }

    fn apply(&mut self, result: &CleanResult) {
        for (id, _) in &result.deleted {
            self.selected.remove(id);
        }
        let catalog = &*self.catalog;
        self.items.retain(|&id| !catalog.get(id).deleted);
        self.list.set_len(self.items.len());

        self.status = Some(match result.failed.as_slice() {
            [] => format!(
                "Deleted {} folders, freed {}",
                result.deleted.len(),
                format_size(result.total_cleaned())
            ),
            [(id, reason)] if result.deleted.is_empty() => {
                format!("Failed: {}: {}", self.catalog.get(*id).label, reason)
            }
            failed => format!(
                "Deleted {} folders, {} failed (first: {})",
                result.deleted.len(),
                failed.len(),
                failed[0].1
            ),
        });
    }

    fn render_lines(&mut self, rows: usize, cols: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows);
        let title = " Final Cut Pro Cleaner ";
        lines.push(format!(
            "{}{}",
            " ".repeat(cols.saturating_sub(title.len()) / 2),
            style(title).cyan().bold()
        ));
        lines.push(
            style(format!(
                " Items: {} | Total: {} | Selected: {} ",
                self.items.len(),
                format_size(self.total_size()),
                format_size(self.selected_size())
            ))
            .green()
            .to_string(),
        );
        lines.push(rule(cols));

        let height = rows.saturating_sub(CHROME_ROWS);
        let range = self.list.visible(height);
        let shown = range.len();
        for idx in range {
            let id = self.items[idx];
            let entry = self.catalog.get(id);
            let mark = if self.selected.contains(&id) { "[x]" } else { "[ ]" };
            let line = spread(
                &format!("{} {}", mark, entry.display_name()),
                &format_size(entry.size_bytes),
                cols.saturating_sub(1),
            );
            lines.push(if idx == self.list.cursor() {
                style(line).reverse().bold().to_string()
            } else if self.selected.contains(&id) {
                style(line).yellow().to_string()
            } else {
                line
            });
        }
        lines.extend(std::iter::repeat_n(String::new(), height.saturating_sub(shown)));

        lines.push(rule(cols));
        let back = if self.allow_back { " | b:Back" } else { "" };
        lines.push(
            style(format!(
                " ↑/↓:Navigate | SPACE:Select | a:All | d:Delete | D:Delete All{back} | q:Quit "
            ))
            .cyan()
            .to_string(),
        );
        let status = match (&self.status, self.current()) {
            (Some(status), _) => status.clone(),
            (None, Some(id)) => {
                let entry = self.catalog.get(id);
                format!(" {} ({})", entry.path.display(), entry.kind.description())
            }
            (None, None) => String::new(),
        };
        lines.push(status);
        lines
    }

    fn render(&mut self, ui: &UiSession) -> io::Result<()> {
        let (rows, cols) = ui.size();
        let lines = self.render_lines(rows, cols);
        ui.draw(&lines)
    }

    fn confirm(&mut self, ui: &UiSession, prompt: String) -> io::Result<bool> {
        self.status = Some(style(format!("{prompt} [y/n]")).red().bold().to_string());
        self.render(ui)?;
        let answer = loop {
            match ui.read_key()? {
                Key::Char('y') | Key::Char('Y') => break true,
                Key::Char('n') | Key::Char('N') | Key::Escape => break false,
                _ => {}
            }
        };
        self.status = None;
        Ok(answer)
    }

    fn delete_with_confirmation(&mut self, ui: &UiSession, ids: Vec<FolderId>) -> io::Result<()> {
        let prompt = match ids.as_slice() {
            [] => return Ok(()),
            [id] => {
                let entry = self.catalog.get(*id);
                format!("Delete {} ({})?", entry.label, format_size(entry.size_bytes))
            }
            many if many.len() == self.items.len() => format!(
                "Delete ALL {} folders ({})?",
                many.len(),
                format_size(self.catalog.size_of(many))
            ),
            many => format!(
                "Delete {} folders ({})?",
                many.len(),
                format_size(self.catalog.size_of(many))
            ),
        };
        if self.confirm(ui, prompt)? {
            self.delete(&ids);
        }
        Ok(())
    }

    fn all_done(&self, ui: &UiSession) -> io::Result<Exit> {
        let mut choices = vec![('q', "quit")];
        if self.allow_back {
            choices.insert(0, ('b', "go back to the browser"));
        }
        let key = ui.notice(
            "ALL DONE!",
            &["All cleanable folders processed."],
            &choices,
        )?;
        Ok(if key == 'b' { Exit::Back } else { Exit::Quit })
    }

    pub fn run(mut self, ui: &mut UiSession) -> io::Result<Exit> {
        loop {
            if self.items.is_empty() {
                return self.all_done(ui);
            }
            self.render(ui)?;

            match action_for(&ui.read_key()?, self.allow_back) {
                Action::Up => {
                    self.status = None;
                    self.list.move_up();
                }
                Action::Down => {
                    self.status = None;
                    self.list.move_down();
                }
                Action::Toggle => self.toggle_current(),
                Action::ToggleAll => self.toggle_all(),
                Action::DeleteSelected => {
                    let targets = self.delete_targets();
                    self.delete_with_confirmation(ui, targets)?;
                }
                Action::DeleteAll => {
                    let targets = self.items.clone();
                    self.delete_with_confirmation(ui, targets)?;
                }
                Action::Back => return Ok(Exit::Back),
                Action::Quit => return Ok(Exit::Quit),
                Action::Ignore => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DATE_MARKER;
    use crate::scanner::analyze;
    use std::fs::{self, File};
    use std::path::Path;

    fn catalog_in(root: &Path) -> Catalog {
        let bundle = root.join("Show.fcpbundle");
        let date = bundle.join("day");
        fs::create_dir_all(&date).unwrap();
        fs::write(date.join(DATE_MARKER), b"").unwrap();
        let sizes = [
            ("Analysis Files", 100u64),
            ("Render Files", 200),
            ("Transcoded Media", 300),
        ];
        for (kind, len) in sizes {
            fs::create_dir_all(date.join(kind)).unwrap();
            File::create(date.join(kind).join("media"))
                .unwrap()
                .set_len(len)
                .unwrap();
        }
        Catalog::from_reports(&[analyze(&bundle, None)])
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for(&Key::ArrowDown, false), Action::Down);
        assert_eq!(action_for(&Key::Char('k'), false), Action::Up);
        assert_eq!(action_for(&Key::Enter, false), Action::Toggle);
        assert_eq!(action_for(&Key::Char('D'), false), Action::DeleteAll);
        assert_eq!(action_for(&Key::Char('b'), false), Action::Ignore);
        assert_eq!(action_for(&Key::Char('b'), true), Action::Back);
        assert_eq!(action_for(&Key::Escape, true), Action::Quit);
    }

    #[test]
    fn delete_targets_prefer_the_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = catalog_in(dir.path());
        let mut selector = Selector::new(&mut catalog, false);

        let first = selector.items[0];
        assert_eq!(selector.delete_targets(), vec![first]);

        selector.list.move_down();
        selector.toggle_current();
        selector.list.move_down();
        selector.toggle_current();
        assert_eq!(selector.delete_targets(), selector.items[1..].to_vec());
        assert_eq!(selector.selected_size(), 500);
    }

    #[test]
    fn toggle_all_flips_between_everything_and_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = catalog_in(dir.path());
        let mut selector = Selector::new(&mut catalog, false);

        selector.toggle_current();
        selector.toggle_all();
        assert_eq!(selector.selected.len(), 3);
        selector.toggle_all();
        assert!(selector.selected.is_empty());
    }

    #[test]
    fn deleting_removes_rows_and_keeps_the_cursor_valid() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = catalog_in(dir.path());
        let mut selector = Selector::new(&mut catalog, false);

        selector.list.move_down();
        selector.list.move_down();
        let last = selector.items[2];
        let result = selector.delete(&[last]);

        assert_eq!(result.total_cleaned(), 300);
        assert_eq!(selector.items.len(), 2);
        assert_eq!(selector.list.cursor(), 1);
        assert_eq!(selector.total_size(), 300);
        assert!(selector.status.as_deref().unwrap().starts_with("Deleted 1 folders"));
        assert!(!dir.path().join("Show.fcpbundle/day/Transcoded Media").exists());

        drop(selector);
        assert_eq!(catalog.live_ids().len(), 2);
    }

    #[test]
    fn render_fits_the_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = catalog_in(dir.path());
        let mut selector = Selector::new(&mut catalog, true);

        let lines = selector.render_lines(9, 60);
        assert_eq!(lines.len(), 9);
        assert!(lines[3].contains("Show.fcpbundle/day/Analysis Files"));
        assert!(lines[4].contains("Render Files"));
        assert!(lines[5].contains("Transcoded Media"));
        assert!(lines[7].contains("b:Back"));
        assert!(lines[1].contains("Items: 3"));
    }
}
