//! Discovery of page sources under a content directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Recursively collects every file ending in `.{extension}` under `root`.
///
/// The returned list is sorted so that runs and reports are deterministic.
pub fn discover_sources<P: AsRef<Path>>(
    root: P,
    extension: &str,
) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_extension(path, extension) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/two.typ"), "").unwrap();
        fs::write(dir.path().join("one.typ"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = discover_sources(dir.path(), "typ").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b/two.typ", "one.typ"]);
    }
}
