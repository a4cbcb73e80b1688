use crate::catalog::{Catalog, FolderId};
use crate::cleaner::{self, delete_folder};
use crate::format::format_size;
use crate::report::{render_clean_result, render_report};
use crate::scanner::BundleReport;
use colored::Colorize;
use dialoguer::{Confirm, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    DeleteOne,
    DeleteBundle,
    DeleteEverything,
    ShowReport,
    Quit,
}

impl Choice {
    fn all() -> [Choice; 5] {
        [
            Choice::DeleteOne,
            Choice::DeleteBundle,
            Choice::DeleteEverything,
            Choice::ShowReport,
            Choice::Quit,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Choice::DeleteOne => "Delete one folder",
            Choice::DeleteBundle => "Delete every folder in a bundle",
            Choice::DeleteEverything => "Delete everything",
            Choice::ShowReport => "Show the report again",
            Choice::Quit => "Quit",
        }
    }
}

/// A prompt that fails (no terminal, Ctrl-C) reads as "no".
fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn pick(prompt: &str, items: &[String]) -> Option<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()
        .ok()
        .flatten()
}

fn pick_bundle(catalog: &Catalog) -> Option<usize> {
    let bundles = catalog.bundles();
    let items: Vec<String> = bundles
        .iter()
        .map(|b| format!("{} ({}, {} folders)", b.name, format_size(b.live_size), b.live_count))
        .collect();
    pick("Bundle", &items).map(|i| bundles[i].bundle)
}

fn folder_items(catalog: &Catalog, ids: &[FolderId]) -> Vec<String> {
    ids.iter()
        .map(|&id| {
            let entry = catalog.get(id);
            format!("{} ({})", entry.label, format_size(entry.size_bytes))
        })
        .collect()
}

fn delete_one(catalog: &mut Catalog) {
    let Some(bundle) = pick_bundle(catalog) else {
        return;
    };
    let ids = catalog.bundle_ids(bundle);
    let Some(index) = pick("Folder", &folder_items(catalog, &ids)) else {
        return;
    };

    let id = ids[index];
    let entry = catalog.get(id);
    if !confirm(&format!("Delete {}?", entry.display_name())) {
        return;
    }

    println!("{} {}...", "Deleting".red().bold(), entry.label);
    let size = entry.size_bytes;
    let outcome = delete_folder(&entry.path);
    if outcome.succeeded() {
        catalog.mark_deleted(id);
        println!("{} Freed {}", "Done!".green().bold(), format_size(size).green().bold());
    } else {
        println!("{} {}", "Failed:".red(), outcome.reason());
    }
}

fn delete_bundle(catalog: &mut Catalog) {
    let Some(bundle) = pick_bundle(catalog) else {
        return;
    };
    let ids = catalog.bundle_ids(bundle);

    println!("\nThese folders will be deleted:");
    for item in folder_items(catalog, &ids) {
        println!("  • {}", item);
    }
    println!(
        "\nSpace to reclaim: {}",
        format_size(catalog.size_of(&ids)).green().bold()
    );

    if confirm("Delete them?") {
        let result = cleaner::clean(catalog, &ids);
        print!("{}", render_clean_result(catalog, &result));
    }
}

fn delete_everything(catalog: &mut Catalog) {
    let ids = catalog.live_ids();
    println!(
        "\nAll {} folders in {} bundles will be deleted ({}).",
        ids.len(),
        catalog.bundles().len(),
        format_size(catalog.size_of(&ids)).green().bold()
    );

    if !confirm("Delete every cleanable folder?") {
        println!("{}", "Cancelled.".yellow());
        return;
    }
    if !confirm("Final confirmation - this cannot be undone. Continue?") {
        println!("{}", "Cancelled.".yellow());
        return;
    }

    delete_all(catalog);
}

/// Deletes every live folder, bundle by bundle, without asking.
pub fn delete_all(catalog: &mut Catalog) {
    let ids = catalog.live_ids();
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut freed = 0;

    for summary in catalog.bundles() {
        println!("\n{} {}", "Processing".cyan().bold(), summary.name);
        let bundle_ids: Vec<FolderId> = ids
            .iter()
            .copied()
            .filter(|&id| catalog.get(id).bundle == summary.bundle)
            .collect();
        let result = cleaner::clean(catalog, &bundle_ids);
        freed += result.freed;
        deleted.extend(result.deleted);
        failed.extend(result.failed);
    }

    let result = cleaner::CleanResult {
        deleted,
        failed,
        freed,
    };
    print!("{}", render_clean_result(catalog, &result));
}

/// The numbered menu shown after the report when neither `--auto` nor
/// `--dry-run` was given.
pub fn run(reports: &[BundleReport], catalog: &mut Catalog) {
    loop {
        if catalog.live_ids().is_empty() {
            println!("\n{}", "Nothing left to clean.".green());
            return;
        }

        println!();
        let labels: Vec<String> = Choice::all().iter().map(|c| c.label().to_string()).collect();
        let choice = pick("What would you like to do?", &labels)
            .map(|i| Choice::all()[i])
            .unwrap_or(Choice::Quit);

        match choice {
            Choice::DeleteOne => delete_one(catalog),
            Choice::DeleteBundle => delete_bundle(catalog),
            Choice::DeleteEverything => delete_everything(catalog),
            Choice::ShowReport => print!("{}", render_report(reports, catalog)),
            Choice::Quit => {
                println!("\n{}", "Bye.".cyan());
                return;
            }
        }
    }
}
