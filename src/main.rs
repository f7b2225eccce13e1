use anyhow::Result;

use remesh::{app::App, cmd::Command, config::Config, logging::Logger};

fn main() -> Result<()> {
    let cmd = Command::init();

    let mut config = Config::load(cmd.config_load_option())?;

    cmd.override_config(&mut config);

    Logger::init(&config.logging)?;

    App::run(cmd, config)?;

    Ok(())
}
