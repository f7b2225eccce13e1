use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::{json::JsonEncoder, pattern::PatternEncoder},
};
use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::config::LoggingConfig;

const CONSOLE_PATTERN: &str = "{h({l:<5})} {m}{n}";

pub struct Logger;

impl Logger {
    /// 標準エラーに出力する。ファイルが指定されていれば JSON でも書き出す。
    pub fn init(config: &LoggingConfig) -> Result<(), anyhow::Error> {
        let level_filter = level_filter(env::var("RUST_LOG").ok().as_deref(), &config.level)?;

        let config = build_config(level_filter, config.file.as_deref())?;

        log4rs::init_config(config)?;

        Ok(())
    }
}

/// RUST_LOG > 設定ファイル > info
fn level_filter(env: Option<&str>, configured: &str) -> Result<LevelFilter, anyhow::Error> {
    let level = [env, Some(configured)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|level| !level.is_empty())
        .unwrap_or("info");

    Ok(LevelFilter::from_str(level)?)
}

fn build_config(level_filter: LevelFilter, file: Option<&Path>) -> Result<Config, anyhow::Error> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let mut builder = Config::builder().appender(Appender::builder().build("console", Box::new(console)));
    let mut root = Root::builder().appender("console");

    if let Some(path) = file {
        let logfile = FileAppender::builder()
            .append(false)
            .encoder(Box::new(JsonEncoder::new()))
            .build(path)?;

        builder = builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    Ok(builder.build(root.build(level_filter))?)
}
