//! Mowve It
//!
//! Runs the game against the headless devices with a short attract-mode
//! script: open the first level, drive around for a while, then quit.

use std::process::ExitCode;

use mowve_engine::audio::headless::HeadlessAudio;
use mowve_engine::config::Config;
use mowve_engine::foundation::logging;
use mowve_engine::input::{KeyCode, ScriptedInput};
use mowve_engine::render::headless::HeadlessRenderer;
use mowve_engine::{Collaborators, Engine};
use mowve_it::assets::BuiltinLoader;
use mowve_it::{Game, GameConfig};

const CONFIG_PATH: &str = "mowve_it.toml";

fn attract_mode() -> ScriptedInput {
    ScriptedInput::new()
        .idle(30)
        // "New Game"
        .click(512, 64)
        .idle(10)
        .hold(KeyCode::Up, 90)
        .hold(KeyCode::Left, 20)
        .tap(KeyCode::Space)
        .hold(KeyCode::Up, 120)
        .tap(KeyCode::Num3)
        .hold(KeyCode::Right, 40)
        .then_quit()
}

fn main() -> ExitCode {
    logging::init();
    log::info!("Starting Mowve It");

    let config = GameConfig::load_or_default(CONFIG_PATH).unwrap_or_else(|err| {
        log::warn!("Ignoring {CONFIG_PATH}: {err}");
        GameConfig::default()
    });

    let engine_config = config.engine.clone();
    let collaborators = Collaborators {
        loader: Box::new(BuiltinLoader::new()),
        renderer: Box::new(HeadlessRenderer::new(engine_config.viewport_width, engine_config.viewport_height)),
        audio: Box::new(HeadlessAudio::new()),
        input: Box::new(attract_mode()),
    };
    let mut engine = Engine::new(engine_config, collaborators);
    let mut game = Game::new(config);

    match engine.run(&mut game) {
        Ok(()) => {
            log::info!("Game exited cleanly after {} frames", engine.frame_count());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Game error: {err}");
            ExitCode::FAILURE
        }
    }
}
