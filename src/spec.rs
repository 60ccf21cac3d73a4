use crate::t_args;
use crate::types::TestCase;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Enumerate the spec corpus in `dir`.
///
/// Only the top level is listed and no extension filter is applied; any
/// directories found there are skipped. Cases come back sorted by file name
/// and carry absolute paths.
pub fn load_specs(dir: &Path) -> Result<Vec<TestCase>> {
    let root = fs::canonicalize(dir)
        .with_context(|| t_args!("spec-dir-unreadable", "dir" => dir.display()))?;

    let mut cases = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| t_args!("spec-dir-unreadable", "dir" => root.display()))?;
        if entry.file_type().is_dir() {
            debug!(path = %entry.path().display(), "skipping directory in spec corpus");
            continue;
        }
        let id = entry.file_name().to_string_lossy().into_owned();
        cases.push(TestCase::new(id, entry.path()));
    }
    debug!(count = cases.len(), dir = %root.display(), "loaded specs");
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_files_sorted_with_absolute_paths() -> Result<()> {
        let dir = tempdir()?;
        for name in ["while.bitsy", "add.bitsy", "Makefile", "loop.bitsy"] {
            fs::write(dir.path().join(name), "{ 1 }")?;
        }
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("deep.bitsy"), "{ 1 }")?;

        let cases = load_specs(dir.path())?;
        let ids: Vec<&str> = cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Makefile", "add.bitsy", "loop.bitsy", "while.bitsy"]);
        assert!(cases.iter().all(|c| c.path.is_absolute()));
        assert_eq!(cases[1].base_name(), "add");
        Ok(())
    }

    #[test]
    fn empty_directory_has_no_cases() -> Result<()> {
        let dir = tempdir()?;
        assert!(load_specs(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(load_specs(&missing).is_err());
    }
}
