//! ディレクトリ単位の変換処理
//!
//! ファイルごとに 分割 -> パース -> ルーティング -> 検証 -> シリアライズ -> 書き込み を行う。

mod output;
mod walker;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info};
use rayon::prelude::*;

use crate::{
    document::{parse_document, split_documents},
    error::{Error, Result},
    router::ResourceRouter,
    serialize,
    template::{Preprocess, TemplatePreprocessor},
    validation::ResourceValidator,
};

pub use self::output::{OutputMode, OutputWriter, DEFAULT_BACKUP_SUFFIX, DEFAULT_SIBLING_SUFFIX};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files_scanned: usize,
    pub files_written: usize,
    pub files_unchanged: usize,
    pub files_failed: usize,
    pub documents: usize,
    pub skipped_documents: usize,
    pub resources: usize,
    pub findings: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) scanned: {} written, {} unchanged, {} failed. \
             {} document(s), {} skipped. {} resource(s) written, {} validation finding(s)",
            self.files_scanned,
            self.files_written,
            self.files_unchanged,
            self.files_failed,
            self.documents,
            self.skipped_documents,
            self.resources,
            self.findings,
        )
    }
}

impl Summary {
    fn record(&mut self, file: FileReport) {
        if file.resources > 0 {
            self.files_written += 1;
        } else {
            self.files_unchanged += 1;
        }

        self.documents += file.documents;
        self.skipped_documents += file.skipped_documents;
        self.resources += file.resources;
        self.findings += file.findings;
    }
}

/// 1 ファイル分の処理結果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FileReport {
    documents: usize,
    skipped_documents: usize,
    resources: usize,
    findings: usize,
}

pub struct TransformationRunner {
    preprocessor: Box<dyn Preprocess + Send + Sync>,
    router: ResourceRouter,
    validator: Option<ResourceValidator>,
    output: OutputWriter,
    parallel: bool,
}

impl fmt::Debug for TransformationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformationRunner")
            .field("router", &self.router)
            .field("validator", &self.validator)
            .field("output", &self.output)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl TransformationRunner {
    pub fn new(router: ResourceRouter) -> Self {
        Self {
            preprocessor: Box::new(TemplatePreprocessor),
            router,
            validator: None,
            output: OutputWriter::default(),
            parallel: false,
        }
    }

    pub fn preprocessor(mut self, preprocessor: impl Preprocess + Send + Sync + 'static) -> Self {
        self.preprocessor = Box::new(preprocessor);
        self
    }

    /// `None` の場合は検証しない
    pub fn validator(mut self, validator: Option<ResourceValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn output(mut self, output: OutputWriter) -> Self {
        self.output = output;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// ファイル単位の I/O エラーは集計して続行する。スキーマが見つからないなどの環境の問題は中断する。
    pub fn run(&self, dir: &Path) -> Result<Summary> {
        if !dir.is_dir() {
            return Err(Error::io(
                dir,
                std::io::Error::other("not a directory"),
            ));
        }

        info!("Processing directory: {}", dir.display());

        let files = walker::yaml_files(dir, &self.output);

        // 環境の問題が起きたら残りのファイルには手を付けない
        let visit = |path: PathBuf| match self.process_file(&path) {
            Err(err) if err.is_infrastructure() => Err(err),
            result => Ok((path, result)),
        };

        let results: Vec<(PathBuf, Result<FileReport>)> = if self.parallel {
            files.into_par_iter().map(visit).collect::<Result<_>>()?
        } else {
            files.into_iter().map(visit).collect::<Result<_>>()?
        };

        let mut summary = Summary {
            files_scanned: results.len(),
            ..Default::default()
        };

        for (path, result) in results {
            match result {
                Ok(report) => summary.record(report),
                Err(err) => {
                    error!("Failed to process {}: {}", path.display(), err);
                    summary.files_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    fn process_file(&self, path: &Path) -> Result<FileReport> {
        info!("Processing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;

        let mut report = FileReport::default();
        let mut resources = Vec::new();

        for raw in split_documents(&content) {
            report.documents += 1;

            let Some(document) = parse_document(&*self.preprocessor, raw) else {
                report.skipped_documents += 1;
                continue;
            };

            let converted = self.router.route(&document);

            if converted.is_empty() {
                report.skipped_documents += 1;
                continue;
            }

            if let Some(validator) = &self.validator {
                for resource in &converted {
                    report.findings += validator.validate_resource(resource)?.len();
                }
            }

            resources.extend(converted);
        }

        if resources.is_empty() {
            debug!("    No resources produced, leaving {} untouched", path.display());
            return Ok(report);
        }

        let yaml = serialize::to_yaml(&resources)?;
        let written = self.output.write(path, &yaml)?;

        info!(
            "    Wrote {} resource(s) to {}",
            resources.len(),
            written.display()
        );

        report.resources = resources.len();

        Ok(report)
    }
}
