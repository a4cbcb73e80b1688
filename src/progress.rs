use crate::format::format_size;
use crate::scanner::{self, BundleReport, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Spinner and counters for one discover-then-analyze pass.
pub struct ScanProgress {
    bar: ProgressBar,
    bundles_found: usize,
    bundles_analyzed: usize,
    total_size: u64,
    started: Instant,
}

impl ScanProgress {
    /// A spinner on stderr. Draws nothing when stderr is not a terminal.
    pub fn spinner() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(bar)
    }

    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            bundles_found: 0,
            bundles_analyzed: 0,
            total_size: 0,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary(&self) -> String {
        format!(
            "Found: {} | Analyzed: {} | Size: {}",
            self.bundles_found,
            self.bundles_analyzed,
            format_size(self.total_size)
        )
    }

    fn analyzed(&mut self, report: &BundleReport) {
        self.bundles_analyzed += 1;
        self.total_size += report.cleanable_size();
        self.bar.set_message(self.summary());
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub struct Scan {
    pub bundles: Vec<PathBuf>,
    pub reports: Vec<BundleReport>,
}

/// Discovers every bundle under `root` and analyzes each one.
pub fn scan_root(root: &Path, progress: &mut ScanProgress) -> Scan {
    progress.bar.set_message("Searching for .fcpbundle bundles...");
    let discovered = scanner::discover(root);
    if !discovered.skipped.is_empty() {
        log::info!(
            "{} paths under {} could not be searched",
            discovered.skipped.len(),
            root.display()
        );
    }
    progress.bundles_found = discovered.value.len();

    let mut reports = Vec::with_capacity(discovered.value.len());
    for bundle in &discovered.value {
        let name = bundle
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bar = &progress.bar;
        let mut current = String::new();
        let mut on_event = |event: ScanEvent<'_>| match event {
            ScanEvent::Measuring { date_project, kind } => {
                current = format!("{name}: {date_project}/{}", kind.dir_name());
                bar.set_message(format!("Analyzing {current}..."));
            }
            ScanEvent::Files { files, bytes } => {
                bar.set_message(format!(
                    "Analyzing {current}... {files} files, {}",
                    format_size(bytes)
                ));
            }
        };
        let report = scanner::analyze(bundle, Some(&mut on_event));
        progress.analyzed(&report);
        reports.push(report);
    }

    Scan {
        bundles: discovered.value,
        reports,
    }
}
