use bevy::{log::LogPlugin, prelude::*};
use std::env;

use simlink::{
    plugins::{frame_runner, BridgePlugin, SandboxPlugin},
    sandbox::ArenaSim,
    server::BridgeConfig,
    systems::Orchestrator,
    utils::HOST_FRAME_RATE,
};

/// Runs the sandbox arena behind the shared-memory bridge.
///
/// Usage: `simlink_host [config.yaml]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match env::args().nth(1) {
        Some(path) => BridgeConfig::load(&path)?,
        None => BridgeConfig::default(),
    };
    let orchestrator = Orchestrator::open(config)?;

    let exit = App::new()
        .add_plugins(MinimalPlugins.set(frame_runner(HOST_FRAME_RATE)))
        .add_plugins(LogPlugin::default())
        .add_plugins(SandboxPlugin)
        .insert_resource(orchestrator)
        .add_plugins(BridgePlugin::<ArenaSim>::default())
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("host exited with code {code}").into()),
    }
}
