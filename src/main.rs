mod browser;
mod bundle;
mod catalog;
mod cleaner;
mod error;
mod format;
mod menu;
mod paths;
mod progress;
mod report;
mod scanner;
mod selector;
mod ui;

use browser::Browser;
use catalog::Catalog;
use clap::Parser;
use colored::Colorize;
use error::Result;
use format::format_size;
use progress::{ScanProgress, scan_root};
use selector::{Exit, Selector};
use std::path::{Path, PathBuf};
use ui::UiSession;

#[derive(Parser)]
#[command(name = "fcpclean")]
#[command(
    about = "Reclaim disk space from Final Cut Pro libraries by deleting regenerable render, analysis and transcoded media folders"
)]
#[command(version)]
struct Cli {
    /// Directory to scan (defaults to current directory)
    path: Option<PathBuf>,

    /// Delete every cleanable folder without asking
    #[arg(short = 'y', long, conflicts_with = "dry_run")]
    auto: bool,

    /// Report sizes without deleting anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Full-screen list with per-folder selection
    #[arg(long, conflicts_with_all = ["auto", "dry_run"])]
    tui: bool,

    /// Pick the directory in a file browser first, then open the list
    #[arg(long, conflicts_with_all = ["auto", "dry_run", "tui"])]
    browse: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run_batch(cli: &Cli, root: PathBuf) {
    println!("{} {}", "Scanning".cyan().bold(), root.display());
    if cli.dry_run {
        println!("{}", "Dry run - nothing will be deleted".yellow());
    } else if cli.auto {
        println!("{}", "Auto mode - deleting without confirmation".yellow());
    }

    let mut progress = ScanProgress::spinner();
    let scan = scan_root(&root, &mut progress);
    progress.finish();

    if scan.bundles.is_empty() {
        println!("\n{}", "No .fcpbundle bundles found.".yellow());
        return;
    }
    println!(
        "Found {} bundles in {:.1}s\n",
        scan.bundles.len().to_string().green().bold(),
        progress.elapsed().as_secs_f64()
    );

    let mut catalog = Catalog::from_reports(&scan.reports);
    print!("{}", report::render_report(&scan.reports, &catalog));

    if cli.dry_run {
        println!("\n{}", "Dry run - nothing was deleted.".yellow());
        return;
    }

    if catalog.live_ids().is_empty() {
        println!("\n{}", "Nothing to clean - these libraries are already tidy.".green());
        return;
    }

    if cli.auto {
        println!(
            "\n{} {} folders ({})...",
            "Deleting".red().bold(),
            catalog.live_ids().len(),
            format_size(catalog.live_size())
        );
        menu::delete_all(&mut catalog);
    } else {
        menu::run(&scan.reports, &mut catalog);
    }
}

/// Scans `root` behind a loading screen and opens the list. When there
/// is nothing to list, a notice asks whether to go back or quit.
fn scan_and_select(ui: &mut UiSession, root: &Path, allow_back: bool) -> Result<Exit> {
    let (rows, cols) = ui.size();
    let mut loading: Vec<String> = vec![String::new(); rows / 2];
    for msg in [
        "Searching for .fcpbundle bundles...",
        "Analyzing projects...",
        "Calculating sizes...",
    ] {
        loading.push(format!("{}{}", " ".repeat(cols.saturating_sub(msg.len()) / 2), msg));
    }
    ui.draw(&loading)?;

    let scan = scan_root(root, &mut ScanProgress::hidden());
    let mut choices = vec![('q', "quit")];
    if allow_back {
        choices.insert(0, ('b', "go back"));
    }

    if scan.bundles.is_empty() {
        let key = ui.notice(
            "NO PROJECTS FOUND",
            &["No .fcpbundle bundles in this location."],
            &choices,
        )?;
        return Ok(if key == 'b' { Exit::Back } else { Exit::Quit });
    }

    let mut catalog = Catalog::from_reports(&scan.reports);
    if catalog.live_ids().is_empty() {
        let key = ui.notice(
            "NO CLEANABLE FOLDERS",
            &[
                "No Analysis Files, Render Files, or Transcoded Media found.",
                "These projects are already clean!",
            ],
            &choices,
        )?;
        return Ok(if key == 'b' { Exit::Back } else { Exit::Quit });
    }

    Ok(Selector::new(&mut catalog, allow_back).run(ui)?)
}

fn run_tui(root: PathBuf) -> Result<()> {
    let mut ui = UiSession::new()?;
    scan_and_select(&mut ui, &root, false)?;
    Ok(())
}

fn run_browse(start: PathBuf) -> Result<()> {
    let mut ui = UiSession::new()?;
    let mut current = start;
    loop {
        let Some(dir) = Browser::new(current.clone()).run(&mut ui)? else {
            return Ok(());
        };
        current = dir;
        if scan_and_select(&mut ui, &current, true)? == Exit::Quit {
            return Ok(());
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let requested = match (&cli.path, cli.browse) {
        (Some(path), _) => path.clone(),
        (None, true) => dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        (None, false) => PathBuf::from("."),
    };

    let root = paths::validate_root(&requested).unwrap_or_else(|err| {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    });
    log::debug!("scan root {}", root.display());

    let outcome = if cli.browse {
        run_browse(root)
    } else if cli.tui {
        run_tui(root)
    } else {
        run_batch(&cli, root);
        Ok(())
    };

    if let Err(err) = outcome {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
