use crate::catalog::Catalog;
use crate::cleaner::CleanResult;
use crate::format::format_size;
use crate::scanner::BundleReport;
use colored::Colorize;

const WIDTH: usize = 70;

fn sized(bytes: u64, lower_bound: bool) -> String {
    if lower_bound {
        format!(">= {}", format_size(bytes))
    } else {
        format_size(bytes)
    }
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

/// The size report printed before any deletion.
///
/// Folders already removed this session are tagged so the report can be
/// shown again from the menu.
pub fn render_report(reports: &[BundleReport], catalog: &Catalog) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(WIDTH);

    line(&mut out, &heavy);
    line(&mut out, "Cleanup report".bold().to_string());
    line(&mut out, &heavy);

    let mut shown = 0;
    let mut total = 0;
    let mut any_lower_bound = false;
    for report in reports.iter().filter(|r| r.cleanable_size() > 0) {
        shown += 1;
        total += report.cleanable_size();
        let lower = report.is_lower_bound();
        any_lower_bound |= lower;

        line(&mut out, "");
        line(&mut out, format!("[{}] {}", shown, report.name.bold()));
        line(&mut out, format!("    Path: {}", report.path.display()));
        for project in report.date_projects() {
            line(&mut out, "");
            line(&mut out, format!("    {}", project.name.cyan()));
            for (kind, folder) in &project.folders {
                let tag = if catalog.is_deleted(&folder.path) {
                    format!(" {}", "(deleted)".dimmed())
                } else {
                    String::new()
                };
                line(
                    &mut out,
                    format!(
                        "      • {}: {}{}",
                        kind.dir_name(),
                        sized(folder.size_bytes, lower),
                        tag
                    ),
                );
            }
        }
        line(&mut out, "");
        line(
            &mut out,
            format!(
                "    Cleanable: {}",
                sized(report.cleanable_size(), lower).green().bold()
            ),
        );
        if lower {
            line(
                &mut out,
                format!(
                    "    {}",
                    "Some paths could not be read; sizes are lower bounds.".yellow()
                ),
            );
        }
        line(&mut out, format!("    {}", "─".repeat(WIDTH - 10)));
    }

    line(&mut out, "");
    line(&mut out, &heavy);
    line(&mut out, format!("Bundles with cleanable folders: {}", shown));
    line(
        &mut out,
        format!(
            "Total reclaimable: {}",
            sized(total, any_lower_bound).green().bold()
        ),
    );
    line(&mut out, &heavy);
    out
}

/// One line per folder of a finished batch, then the totals.
pub fn render_clean_result(catalog: &Catalog, result: &CleanResult) -> String {
    let mut out = String::new();
    for (id, outcome) in &result.deleted {
        let name = catalog.get(*id).display_name();
        match outcome.note() {
            Some(note) => line(&mut out, format!("  {} {} ({})", "✓".green(), name, note)),
            None => line(&mut out, format!("  {} {}", "✓".green(), name)),
        }
    }
    if !result.failed.is_empty() {
        line(&mut out, format!("\n{}", "Failed to delete:".red()));
        for (id, reason) in &result.failed {
            let name = catalog.get(*id).display_name();
            line(&mut out, format!("  {} {} - {}", "✗".red(), name, reason));
        }
    }
    line(
        &mut out,
        format!(
            "\n{} Freed {} in {} folders",
            "Done!".green().bold(),
            format_size(result.total_cleaned()).green().bold(),
            result.deleted.len().to_string().green()
        ),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DATE_MARKER;
    use crate::cleaner;
    use crate::scanner::{SkipReason, Skipped, analyze};
    use std::fs::{self, File};

    fn reports_in(root: &std::path::Path) -> Vec<BundleReport> {
        let show = root.join("Show.fcpbundle/Day 1");
        fs::create_dir_all(show.join("Render Files")).unwrap();
        fs::write(show.join(DATE_MARKER), b"").unwrap();
        File::create(show.join("Render Files/r.mov"))
            .unwrap()
            .set_len(3_500_000)
            .unwrap();
        fs::create_dir_all(root.join("Empty.fcpbundle")).unwrap();

        vec![
            analyze(&root.join("Empty.fcpbundle"), None),
            analyze(&root.join("Show.fcpbundle"), None),
        ]
    }

    #[test]
    fn report_lists_only_cleanable_bundles() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let reports = reports_in(dir.path());
        let catalog = Catalog::from_reports(&reports);

        let text = render_report(&reports, &catalog);
        assert!(text.contains("[1] Show.fcpbundle"));
        assert!(!text.contains("Empty.fcpbundle"));
        assert!(text.contains("• Render Files: 3.3 MB"));
        assert!(text.contains("Bundles with cleanable folders: 1"));
        assert!(text.contains("Total reclaimable: 3.3 MB"));
        assert!(!text.contains("(deleted)"));
    }

    #[test]
    fn report_marks_folders_removed_this_session() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let reports = reports_in(dir.path());
        let mut catalog = Catalog::from_reports(&reports);
        let ids = catalog.live_ids();

        let result = cleaner::clean(&mut catalog, &ids);
        let text = render_report(&reports, &catalog);
        assert!(text.contains("Render Files: 3.3 MB (deleted)"));

        let summary = render_clean_result(&catalog, &result);
        assert!(summary.contains("Show.fcpbundle/Day 1/Render Files"));
        assert!(summary.contains("Freed 3.3 MB in 1 folders"));
    }

    #[test]
    fn unreadable_paths_mark_sizes_as_lower_bounds() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut reports = reports_in(dir.path());
        let show = &mut reports[1];
        show.skipped.push(Skipped {
            path: show.path.join("Day 1/Render Files/locked"),
            reason: SkipReason::PermissionDenied,
        });
        let catalog = Catalog::from_reports(&reports);

        let text = render_report(&reports, &catalog);
        assert!(text.contains("• Render Files: >= 3.3 MB"));
        assert!(text.contains("Cleanable: >= 3.3 MB"));
        assert!(text.contains("Some paths could not be read; sizes are lower bounds."));
        assert!(text.contains("Total reclaimable: >= 3.3 MB"));
    }

    #[test]
    fn vanished_paths_do_not_mark_lower_bounds() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut reports = reports_in(dir.path());
        let show = &mut reports[1];
        show.skipped.push(Skipped {
            path: show.path.join("Day 1/Render Files/gone.mov"),
            reason: SkipReason::Vanished,
        });
        let catalog = Catalog::from_reports(&reports);

        let text = render_report(&reports, &catalog);
        assert!(!text.contains(">="));
        assert!(!text.contains("lower bounds"));
    }
}
