use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use super::OutputWriter;

/// `dir` 以下の YAML ファイルを列挙する
///
/// シンボリックリンクは辿らない。ツールが書き出したファイルは除く。
pub(super) fn yaml_files(dir: &Path, output: &OutputWriter) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Failed to read directory entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_yaml(path) && !output.is_generated(path))
        .collect()
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
