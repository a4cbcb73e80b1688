use crate::error::{Error, Result, RootProblem};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Expands a leading `~` component to the home directory. Any other
/// path comes back unchanged, byte for byte.
pub fn expand_tilde(input: &Path) -> PathBuf {
    match (input.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => input.to_path_buf(),
    }
}

/// Checks that `input` names a readable directory and returns its
/// canonical form.
pub fn validate_root(input: &Path) -> Result<PathBuf> {
    if input.as_os_str().is_empty() {
        return Err(invalid(input, RootProblem::Empty));
    }

    let path = expand_tilde(input);
    let canonical = match path.canonicalize() {
        Ok(p) => p,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            return Err(invalid(&path, RootProblem::PermissionDenied));
        }
        Err(_) => return Err(invalid(&path, RootProblem::Missing)),
    };

    if !canonical.is_dir() {
        return Err(invalid(&canonical, RootProblem::NotADirectory));
    }
    if let Err(err) = fs::read_dir(&canonical) {
        log::debug!("cannot list {}: {}", canonical.display(), err);
        return Err(invalid(&canonical, RootProblem::PermissionDenied));
    }

    Ok(canonical)
}

fn invalid(path: &Path, reason: RootProblem) -> Error {
    Error::InvalidRoot {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(result: Result<PathBuf>) -> RootProblem {
        match result {
            Err(Error::InvalidRoot { reason, .. }) => reason,
            other => panic!("expected an invalid root, got {other:?}"),
        }
    }

    #[test]
    fn accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = validate_root(dir.path()).unwrap();
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn rejects_missing_file_and_empty_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, b"x").unwrap();

        assert_eq!(problem(validate_root(&dir.path().join("nope"))), RootProblem::Missing);
        assert_eq!(problem(validate_root(&file)), RootProblem::NotADirectory);
        assert_eq!(problem(validate_root(Path::new(""))), RootProblem::Empty);
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_name() {
        let dir = tempfile::tempdir().unwrap();
        let spaced = dir.path().join(" Edits ");
        fs::create_dir(&spaced).unwrap();

        let root = validate_root(&spaced).unwrap();
        assert_eq!(root.file_name().unwrap(), " Edits ");
        assert_eq!(
            problem(validate_root(&dir.path().join("Edits"))),
            RootProblem::Missing
        );
    }

    #[cfg(unix)]
    #[test]
    fn accepts_non_utf8_directory_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join(OsStr::from_bytes(b"Cl\xffients"));
        if fs::create_dir(&odd).is_err() {
            // Some filesystems only store UTF-8 names.
            return;
        }

        let root = validate_root(&odd).unwrap();
        assert_eq!(root.file_name().unwrap().as_bytes(), b"Cl\xffients");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~")), home);
            assert_eq!(expand_tilde(Path::new("~/Movies")), home.join("Movies"));
        }
        assert_eq!(expand_tilde(Path::new("/tmp/~x")), PathBuf::from("/tmp/~x"));
        assert_eq!(expand_tilde(Path::new("~x/Movies")), PathBuf::from("~x/Movies"));
    }
}
