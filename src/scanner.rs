use crate::bundle::{ArtifactKind, has_date_marker, is_bundle_name, is_hidden};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Progress callbacks fire after this many files have been sized.
const PROGRESS_EVERY: u64 = 100;

/// Why a path was left out of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    PermissionDenied,
    /// Removed by someone else between listing and stat.
    Vanished,
    Io(String),
}

impl SkipReason {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            io::ErrorKind::NotFound => SkipReason::Vanished,
            _ => SkipReason::Io(err.to_string()),
        }
    }

    /// Whether skipping this path may have hidden bytes that still exist.
    pub fn undercounts(&self) -> bool {
        !matches!(self, SkipReason::Vanished)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl Skipped {
    fn from_io(path: &Path, err: &io::Error) -> Self {
        let skipped = Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::from_io(err),
        };
        log::debug!("skipping {}", skipped);
        skipped
    }

    fn from_walk(fallback: &Path, err: &walkdir::Error) -> Self {
        let path = err.path().unwrap_or(fallback);
        match err.io_error() {
            Some(io_err) => Skipped::from_io(path, io_err),
            None => {
                let skipped = Skipped {
                    path: path.to_path_buf(),
                    reason: SkipReason::Io(err.to_string()),
                };
                log::debug!("skipping {}", skipped);
                skipped
            }
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::PermissionDenied => write!(f, "{}: permission denied", self.path.display()),
            SkipReason::Vanished => write!(f, "{}: vanished during scan", self.path.display()),
            SkipReason::Io(msg) => write!(f, "{}: {}", self.path.display(), msg),
        }
    }
}

/// A best-effort scan result: whatever could be read, plus what could not.
#[derive(Debug, Clone)]
pub struct Measured<T> {
    pub value: T,
    pub skipped: Vec<Skipped>,
}

/// Progress notifications emitted while a bundle is analyzed.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    Measuring {
        date_project: &'a str,
        kind: ArtifactKind,
    },
    Files {
        files: u64,
        bytes: u64,
    },
}

#[derive(Debug, Clone)]
pub struct FolderMeasurement {
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct DateProject {
    pub name: String,
    pub path: PathBuf,
    pub folders: BTreeMap<ArtifactKind, FolderMeasurement>,
}

impl DateProject {
    fn new(path: &Path) -> Self {
        Self {
            name: file_name_lossy(path),
            path: path.to_path_buf(),
            folders: BTreeMap::new(),
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.folders.values().map(|f| f.size_bytes).sum()
    }
}

/// Everything cleanable inside one bundle.
///
/// `cleanable_size` is kept equal to the sum of every folder in every
/// dated project; projects only enter through `push_date_project`.
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub name: String,
    pub path: PathBuf,
    date_projects: Vec<DateProject>,
    cleanable_size: u64,
    pub skipped: Vec<Skipped>,
}

impl BundleReport {
    pub fn new(path: &Path) -> Self {
        Self {
            name: file_name_lossy(path),
            path: path.to_path_buf(),
            date_projects: Vec::new(),
            cleanable_size: 0,
            skipped: Vec::new(),
        }
    }

    /// Adds a dated project. Projects without cleanable folders are dropped.
    pub fn push_date_project(&mut self, project: DateProject) {
        if project.folders.is_empty() {
            return;
        }
        self.cleanable_size += project.size_bytes();
        self.date_projects.push(project);
    }

    pub fn date_projects(&self) -> &[DateProject] {
        &self.date_projects
    }

    pub fn cleanable_size(&self) -> u64 {
        self.cleanable_size
    }

    /// True when unreadable paths may have hidden part of the real size.
    pub fn is_lower_bound(&self) -> bool {
        self.skipped.iter().any(|s| s.reason.undercounts())
    }
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Finds every `.fcpbundle` directory below `root`, sorted by path.
///
/// Bundles nested inside other bundles are reported too.
pub fn discover(root: &Path) -> Measured<Vec<PathBuf>> {
    let mut bundles = Vec::new();
    let mut skipped = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped.push(Skipped::from_walk(root, &err));
                continue;
            }
        };

        if entry.file_type().is_dir() && is_bundle_name(entry.file_name()) {
            log::debug!("found bundle {}", entry.path().display());
            bundles.push(entry.into_path());
        }
    }

    bundles.sort();
    Measured {
        value: bundles,
        skipped,
    }
}

/// Lists the dated projects directly inside a bundle, sorted by path.
pub fn find_date_projects(bundle: &Path) -> Measured<Vec<PathBuf>> {
    let mut projects = Vec::new();
    let mut skipped = Vec::new();

    let entries = match fs::read_dir(bundle) {
        Ok(entries) => entries,
        Err(err) => {
            skipped.push(Skipped::from_io(bundle, &err));
            return Measured {
                value: projects,
                skipped,
            };
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped.push(Skipped::from_io(bundle, &err));
                continue;
            }
        };

        if is_hidden(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => {}
            Ok(_) => continue,
            Err(err) => {
                skipped.push(Skipped::from_io(&path, &err));
                continue;
            }
        }

        match has_date_marker(&path) {
            Ok(true) => projects.push(path),
            Ok(false) => {}
            Err(err) => skipped.push(Skipped::from_io(&path, &err)),
        }
    }

    projects.sort();
    Measured {
        value: projects,
        skipped,
    }
}

/// Sums the sizes of every non-hidden regular file under `path`.
///
/// Hidden directories are not descended into. Unreadable subtrees are
/// skipped, so the total is a lower bound whenever `skipped` reports an
/// undercounting reason.
pub fn measure_folder(
    path: &Path,
    mut on_progress: Option<&mut dyn FnMut(u64, u64)>,
) -> Measured<u64> {
    let mut total = 0u64;
    let mut files = 0u64;
    let mut skipped = Vec::new();

    let walker = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skipped.push(Skipped::from_walk(path, &err));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let len = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(err) => {
                skipped.push(Skipped::from_walk(entry.path(), &err));
                continue;
            }
        };

        total += len;
        files += 1;

        if files % PROGRESS_EVERY == 0 {
            if let Some(cb) = on_progress.as_deref_mut() {
                cb(files, total);
            }
        }
    }

    Measured {
        value: total,
        skipped,
    }
}

/// Measures every artifact folder in every dated project of `bundle`.
pub fn analyze(
    bundle: &Path,
    mut on_progress: Option<&mut dyn FnMut(ScanEvent<'_>)>,
) -> BundleReport {
    let mut report = BundleReport::new(bundle);
    let dates = find_date_projects(bundle);
    report.skipped.extend(dates.skipped);

    for date_path in dates.value {
        let mut project = DateProject::new(&date_path);
        log::debug!("checking dated project {}", project.path.display());

        for kind in ArtifactKind::all() {
            let folder = date_path.join(kind.dir_name());
            match fs::symlink_metadata(&folder) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => continue,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    report.skipped.push(Skipped::from_io(&folder, &err));
                    continue;
                }
            }

            let measured = match on_progress.as_deref_mut() {
                Some(cb) => {
                    cb(ScanEvent::Measuring {
                        date_project: &project.name,
                        kind,
                    });
                    let mut forward =
                        |files: u64, bytes: u64| cb(ScanEvent::Files { files, bytes });
                    measure_folder(&folder, Some(&mut forward))
                }
                None => measure_folder(&folder, None),
            };
            report.skipped.extend(measured.skipped);

            if measured.value > 0 {
                project.folders.insert(
                    kind,
                    FolderMeasurement {
                        path: folder,
                        size_bytes: measured.value,
                    },
                );
            }
        }

        report.push_date_project(project);
    }

    log::info!(
        "analyzed {}: {} cleanable bytes in {} dated projects",
        report.name,
        report.cleanable_size(),
        report.date_projects().len()
    );
    report
}
