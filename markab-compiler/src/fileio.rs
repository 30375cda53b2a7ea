//! Path resolution for `load" path"` directives. Same allow-list and
//! working-directory containment policy `markab-vm`'s `IOLOAD` applies at
//! run time (`markab-vm/src/interpreter/fileio.rs`), reapplied here because
//! compile-time `load"` reads the host filesystem directly rather than
//! going through the VM's memory-backed counted strings.

use std::path::{Path, PathBuf};

use crate::error::CompileError;

pub fn resolve_include(working_dir: &Path, allowlist: &[regex::Regex], raw_path: &str) -> Result<PathBuf, CompileError> {
    let reject = || CompileError::Io {
        path: PathBuf::from(raw_path),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "path rejected by the load allow-list"),
    };

    if !allowlist.iter().any(|pattern| pattern.is_match(raw_path)) {
        return Err(reject());
    }

    let candidate = working_dir.join(raw_path);
    let canonical_dir = working_dir.canonicalize().map_err(|_| reject())?;
    let parent = candidate.parent().unwrap_or(working_dir);
    let canonical_parent = parent.canonicalize().map_err(|_| reject())?;
    if !canonical_parent.starts_with(&canonical_dir) {
        return Err(reject());
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_path_outside_the_allowlist() {
        let dir = tempfile::tempdir().unwrap();
        let allowlist = vec![regex::Regex::new(r".+\.mkb$").unwrap()];
        assert!(resolve_include(dir.path(), &allowlist, "secrets.txt").is_err());
    }

    #[test]
    fn accepts_a_matching_path_inside_the_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("core.mkb"), b"").unwrap();
        let allowlist = vec![regex::Regex::new(r".+\.mkb$").unwrap()];
        let resolved = resolve_include(dir.path(), &allowlist, "core.mkb").unwrap();
        assert!(resolved.ends_with("core.mkb"));
    }
}
