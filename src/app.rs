use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use log::info;

use crate::{
    cmd::Command,
    config::Config,
    handler::HandlerRegistry,
    router::ResourceRouter,
    runner::{Summary, TransformationRunner},
    validation::{ResourceValidator, SchemaCache, SchemaDirectory},
};

pub struct App;

impl App {
    pub fn run(cmd: Command, config: Config) -> Result<Summary> {
        if !cmd.dir.is_dir() {
            bail!("{} is not a directory", cmd.dir.display());
        }

        let registry = HandlerRegistry::builtin(config.mapping.profile)
            .context("Failed to register handlers")?;

        let runner = TransformationRunner::new(ResourceRouter::new(registry))
            .validator(build_validator(&config))
            .output(config.output.writer())
            .parallel(config.runner.parallel);

        info!(
            "Profile: {}, output: {:?}, validation: {}",
            config.mapping.profile,
            config.output.mode,
            if config.validation.enabled { "enabled" } else { "disabled" }
        );

        let summary = runner
            .run(&cmd.dir)
            .with_context(|| format!("Failed to transform {}", cmd.dir.display()))?;

        info!("{}", summary);

        Ok(summary)
    }
}

fn build_validator(config: &Config) -> Option<ResourceValidator> {
    if !config.validation.enabled {
        return None;
    }

    let validator = match &config.validation.schema_dir {
        Some(dir) => ResourceValidator::new(
            Box::new(SchemaDirectory::new(dir)),
            Arc::new(SchemaCache::default()),
        ),
        None => ResourceValidator::bundled(),
    };

    Some(validator)
}
