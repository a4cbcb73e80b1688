use std::ffi::OsStr;
use std::path::Path;

/// Suffix of a Final Cut Pro library. Libraries are directories on disk.
pub const BUNDLE_SUFFIX: &str = ".fcpbundle";

/// File whose presence marks a direct child of a bundle as a dated project.
pub const DATE_MARKER: &str = "CurrentVersion.fcpevent";

/// Folders Final Cut Pro regenerates on demand and that are safe to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    Analysis,
    Render,
    Transcoded,
}

impl ArtifactKind {
    /// Folder name inside a dated project.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Analysis => "Analysis Files",
            ArtifactKind::Render => "Render Files",
            ArtifactKind::Transcoded => "Transcoded Media",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ArtifactKind::Analysis => "analysis cache",
            ArtifactKind::Render => "render cache",
            ArtifactKind::Transcoded => "optimized and proxy media",
        }
    }

    pub fn all() -> Vec<ArtifactKind> {
        vec![
            ArtifactKind::Analysis,
            ArtifactKind::Render,
            ArtifactKind::Transcoded,
        ]
    }
}

/// Names are compared as raw bytes, so names that are not valid UTF-8
/// still match.
pub fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}

pub fn is_bundle_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(BUNDLE_SUFFIX.as_bytes())
}

/// Whether `dir` directly contains the dated-project marker.
///
/// Errors while probing (usually a missing search permission on `dir`)
/// surface as `Err` so the caller can record them.
pub fn has_date_marker(dir: &Path) -> std::io::Result<bool> {
    dir.join(DATE_MARKER).try_exists()
}
