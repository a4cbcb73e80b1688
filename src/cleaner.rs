use crate::catalog::{Catalog, FolderId};
use std::fs;
use std::io;
use std::path::Path;

/// Result of one delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    /// The folder was gone before we got to it.
    AlreadyDeleted,
    Failed { reason: String },
}

impl DeletionOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, DeletionOutcome::Failed { .. })
    }

    /// Failure reason; empty on success.
    pub fn reason(&self) -> &str {
        match self {
            DeletionOutcome::Failed { reason } => reason,
            _ => "",
        }
    }

    pub fn note(&self) -> Option<&'static str> {
        match self {
            DeletionOutcome::AlreadyDeleted => Some("Already deleted"),
            _ => None,
        }
    }
}

/// Recursively removes `path`. Never asks for confirmation.
pub fn delete_folder(path: &Path) -> DeletionOutcome {
    let outcome = match fs::remove_dir_all(path) {
        Ok(()) => DeletionOutcome::Deleted,
        Err(err) => classify(path, &err),
    };

    match &outcome {
        DeletionOutcome::Deleted => log::info!("deleted {}", path.display()),
        DeletionOutcome::AlreadyDeleted => log::info!("{} was already gone", path.display()),
        DeletionOutcome::Failed { reason } => {
            log::warn!("could not delete {}: {}", path.display(), reason)
        }
    }
    outcome
}

fn classify(path: &Path, err: &io::Error) -> DeletionOutcome {
    match err.kind() {
        io::ErrorKind::PermissionDenied => DeletionOutcome::Failed {
            reason: "Permission denied - check file permissions".to_string(),
        },
        // A child vanishing mid-removal also reports NotFound; only the
        // folder itself being gone counts as done.
        io::ErrorKind::NotFound if !matches!(path.try_exists(), Ok(true)) => {
            DeletionOutcome::AlreadyDeleted
        }
        _ => DeletionOutcome::Failed {
            reason: format!("OS error: {}", err),
        },
    }
}

pub struct CleanResult {
    pub deleted: Vec<(FolderId, DeletionOutcome)>,
    pub failed: Vec<(FolderId, String)>,
    pub freed: u64,
}

impl CleanResult {
    pub fn total_cleaned(&self) -> u64 {
        self.freed
    }
}

/// Deletes each folder in turn, marking successes in the catalog.
///
/// A failure is recorded and the batch carries on.
pub fn clean(catalog: &mut Catalog, ids: &[FolderId]) -> CleanResult {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut freed = 0;

    for &id in ids {
        let outcome = delete_folder(&catalog.get(id).path);
        if outcome.succeeded() {
            freed += catalog.get(id).size_bytes;
            catalog.mark_deleted(id);
            deleted.push((id, outcome));
        } else {
            failed.push((id, outcome.reason().to_string()));
        }
    }

    CleanResult {
        deleted,
        failed,
        freed,
    }
}
