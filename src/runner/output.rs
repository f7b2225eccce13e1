use std::{
    ffi::OsString,
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

pub const DEFAULT_SIBLING_SUFFIX: &str = "_new";
pub const DEFAULT_BACKUP_SUFFIX: &str = "_old";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `<name>_new` を隣に書き出す
    #[default]
    Sibling,
    /// 元のファイルを `<name>_old` に退避して置き換える
    InPlace,
}

/// 変換結果の書き出し先を決めて、一時ファイル経由で書き込む
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputWriter {
    mode: OutputMode,
    sibling_suffix: String,
    backup_suffix: String,
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new(
            OutputMode::default(),
            DEFAULT_SIBLING_SUFFIX,
            DEFAULT_BACKUP_SUFFIX,
        )
    }
}

impl OutputWriter {
    pub fn new(
        mode: OutputMode,
        sibling_suffix: impl Into<String>,
        backup_suffix: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            sibling_suffix: sibling_suffix.into(),
            backup_suffix: backup_suffix.into(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// このツールが書き出したファイルか
    pub fn is_generated(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };

        [&self.sibling_suffix, &self.backup_suffix]
            .into_iter()
            .any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
    }

    /// 書き込んだファイルのパスを返す
    pub fn write(&self, path: &Path, content: &str) -> Result<PathBuf> {
        match self.mode {
            OutputMode::Sibling => {
                let target = with_suffix(path, &self.sibling_suffix);

                let temp = temp_file(&target, content)?;
                temp.persist(&target)
                    .map_err(|err| Error::io(&target, err.error))?;

                Ok(target)
            }
            OutputMode::InPlace => {
                let backup = with_suffix(path, &self.backup_suffix);

                // 書き込みに失敗した場合に元ファイルが残るよう、退避は一時ファイルの作成後に行う
                let temp = temp_file(path, content)?;

                fs::rename(path, &backup).map_err(|err| Error::io(&backup, err))?;

                temp.persist(path)
                    .map_err(|err| Error::io(path, err.error))?;

                Ok(path.to_path_buf())
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);

    path.with_file_name(name)
}

/// `target` と同じディレクトリに内容を書き込んだ一時ファイルを作る
fn temp_file(target: &Path, content: &str) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;

    temp.write_all(content.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|err| Error::io(temp.path(), err))?;

    Ok(temp)
}
