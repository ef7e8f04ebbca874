//! Recursive discovery of schema documents.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect the `.json` files under `root` in lexical order. `root` may also
/// be a single file. Unreadable entries and non-JSON files are reported to
/// standard error and skipped; the walk itself never fails.
pub fn schema_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root);
                eprintln!("{}: {err}", path.display());
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let path = entry.into_path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            eprintln!("{}: skipping non-JSON file", path.display());
            continue;
        }
        files.push(path);
    }
    files
}
