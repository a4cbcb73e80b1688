use crate::bundle::ArtifactKind;
use crate::scanner::BundleReport;
use std::path::{Path, PathBuf};

/// Stable handle to one folder in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FolderId(usize);

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Index of the owning bundle in the reports the catalog was built from.
    pub bundle: usize,
    pub bundle_name: String,
    /// `<date project>/<folder name>`
    pub label: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub deleted: bool,
}

impl CatalogEntry {
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.bundle_name, self.label)
    }
}

/// Summary of one bundle's remaining folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub bundle: usize,
    pub name: String,
    pub live_size: u64,
    pub live_count: usize,
}

/// Flat arena of every cleanable folder across a scan.
///
/// Views keep `FolderId`s and look entries up here, so marking a folder
/// deleted is seen by every view at once.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_reports(reports: &[BundleReport]) -> Self {
        let mut entries = Vec::new();
        for (bundle, report) in reports.iter().enumerate() {
            for project in report.date_projects() {
                for (kind, folder) in &project.folders {
                    entries.push(CatalogEntry {
                        bundle,
                        bundle_name: report.name.clone(),
                        label: format!("{}/{}", project.name, kind.dir_name()),
                        kind: *kind,
                        path: folder.path.clone(),
                        size_bytes: folder.size_bytes,
                        deleted: false,
                    });
                }
            }
        }
        Self { entries }
    }

    pub fn get(&self, id: FolderId) -> &CatalogEntry {
        &self.entries[id.0]
    }

    pub fn live_ids(&self) -> Vec<FolderId> {
        self.ids_where(|_| true)
    }

    pub fn bundle_ids(&self, bundle: usize) -> Vec<FolderId> {
        self.ids_where(|e| e.bundle == bundle)
    }

    fn ids_where(&self, keep: impl Fn(&CatalogEntry) -> bool) -> Vec<FolderId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.deleted && keep(*e))
            .map(|(i, _)| FolderId(i))
            .collect()
    }

    /// Bundles that still have folders to clean, in scan order.
    pub fn bundles(&self) -> Vec<BundleSummary> {
        let mut summaries: Vec<BundleSummary> = Vec::new();
        for entry in self.entries.iter().filter(|e| !e.deleted) {
            match summaries.last_mut() {
                Some(last) if last.bundle == entry.bundle => {
                    last.live_size += entry.size_bytes;
                    last.live_count += 1;
                }
                _ => summaries.push(BundleSummary {
                    bundle: entry.bundle,
                    name: entry.bundle_name.clone(),
                    live_size: entry.size_bytes,
                    live_count: 1,
                }),
            }
        }
        summaries
    }

    pub fn mark_deleted(&mut self, id: FolderId) {
        self.entries[id.0].deleted = true;
    }

    pub fn is_deleted(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.deleted && e.path == path)
    }

    pub fn live_size(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| !e.deleted)
            .map(|e| e.size_bytes)
            .sum()
    }

    pub fn size_of(&self, ids: &[FolderId]) -> u64 {
        ids.iter().map(|&id| self.get(id).size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DATE_MARKER;
    use crate::scanner::analyze;
    use std::fs::{self, File};

    fn bundle_with(root: &Path, name: &str, folders: &[(&str, &str, u64)]) -> BundleReport {
        let bundle = root.join(name);
        for (date, kind, len) in folders {
            let date_dir = bundle.join(date);
            fs::create_dir_all(date_dir.join(kind)).unwrap();
            fs::write(date_dir.join(DATE_MARKER), b"").unwrap();
            File::create(date_dir.join(kind).join("media"))
                .unwrap()
                .set_len(*len)
                .unwrap();
        }
        analyze(&bundle, None)
    }

    fn fixture() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let reports = vec![
            bundle_with(
                dir.path(),
                "A.fcpbundle",
                &[("d1", "Render Files", 10), ("d1", "Analysis Files", 5)],
            ),
            bundle_with(dir.path(), "B.fcpbundle", &[("d2", "Transcoded Media", 20)]),
        ];
        let catalog = Catalog::from_reports(&reports);
        (dir, catalog)
    }

    #[test]
    fn flattens_reports_in_kind_order() {
        let (_dir, catalog) = fixture();
        let labels: Vec<String> = catalog
            .live_ids()
            .into_iter()
            .map(|id| catalog.get(id).display_name())
            .collect();
        assert_eq!(
            labels,
            [
                "A.fcpbundle/d1/Analysis Files",
                "A.fcpbundle/d1/Render Files",
                "B.fcpbundle/d2/Transcoded Media",
            ]
        );
        assert_eq!(catalog.live_size(), 35);
    }

    #[test]
    fn deleted_entries_leave_every_view() {
        let (_dir, mut catalog) = fixture();
        let first = catalog.bundle_ids(0)[0];
        catalog.mark_deleted(first);

        assert_eq!(catalog.live_ids().len(), 2);
        assert_eq!(catalog.bundle_ids(0).len(), 1);
        assert_eq!(catalog.live_size(), 30);
        assert_eq!(
            catalog.bundles(),
            vec![
                BundleSummary {
                    bundle: 0,
                    name: "A.fcpbundle".to_string(),
                    live_size: 10,
                    live_count: 1,
                },
                BundleSummary {
                    bundle: 1,
                    name: "B.fcpbundle".to_string(),
                    live_size: 20,
                    live_count: 1,
                },
            ]
        );
    }

    #[test]
    fn fully_cleaned_bundle_drops_out_of_summaries() {
        let (_dir, mut catalog) = fixture();
        let gone = catalog.bundle_ids(1);
        for &id in &gone {
            catalog.mark_deleted(id);
        }
        let names: Vec<String> = catalog.bundles().into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["A.fcpbundle"]);
        // Ids stay valid after deletion.
        assert!(catalog.get(gone[0]).deleted);
    }
}
