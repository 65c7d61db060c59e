//! The game as an engine application
//!
//! [`Game`] owns the active context, the live settings and the spawn random
//! source. Commands queued during a frame are applied here at the top of the
//! next one, which is the only place contexts are created or destroyed.

use mowve_engine::assets::loader::preload_sound;
use mowve_engine::assets::{Asset, AssetError};
use mowve_engine::audio::volume_to_millibels;
use mowve_engine::foundation::math::{colour, Rect};
use mowve_engine::input::KeyCode;
use mowve_engine::render::{DeviceState, PointLight};
use mowve_engine::scene::{Container, Lifecycle};
use mowve_engine::{AppError, Application, Engine, ModalWait, Services};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assets::{names, SOUNDS};
use crate::commands::{Command, GameOverReason};
use crate::config::GameConfig;
use crate::contexts::{Context, HelpPages, MainGame, MainMenu, OptionsMenu, PauseMenu};
use crate::frame::Frame;
use crate::levels::LevelSpec;
use crate::objects::MowerKind;

const LOAD_BACKGROUND: u32 = 0xff22_1100;
const LOADING: &str = "Loading...\n\nPlease wait...";

const CONGRATULATIONS_BACKGROUND: u32 = 0xff88_ccff;
const CONGRATULATIONS_TEXT: u32 = 0xff77_3300;
const GAME_OVER_BACKGROUND: u32 = 0xffff_8888;
const END_BACKGROUND: u32 = 0xffff_8877;
const END_TEXT: u32 = 0xff00_7788;

/// Mowve It
pub struct Game {
    settings: GameConfig,
    rng: StdRng,
    context: Option<Context>,
}

impl Game {
    /// Game using `settings`; spawns are reproducible when a seed is set
    pub fn new(settings: GameConfig) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            settings,
            rng,
            context: None,
        }
    }

    /// Active context
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Live settings
    pub fn settings(&self) -> &GameConfig {
        &self.settings
    }

    /// Destroy the active context and make `next` active
    fn switch_to(&mut self, engine: &mut Engine<Command>, mut next: Context) -> Result<(), AppError> {
        let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
        if let Some(old) = self.context.take() {
            old.destroy(&mut frame);
        }
        if let Err(err) = next.create(&mut frame) {
            next.destroy(&mut frame);
            return Err(err.into());
        }
        self.context = Some(next);
        Ok(())
    }

    fn pause(&mut self, engine: &mut Engine<Command>) -> Result<(), AppError> {
        match self.context.take() {
            Some(game @ Context::Game(_)) => {
                let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
                let mut pause = Context::Pause(PauseMenu::new(game));
                if let Err(err) = pause.create(&mut frame) {
                    pause.destroy(&mut frame);
                    return Err(err.into());
                }
                self.context = Some(pause);
            }
            other => {
                log::debug!("Nothing to pause");
                self.context = other;
            }
        }
        Ok(())
    }

    fn resume(&mut self, engine: &mut Engine<Command>) {
        match self.context.take() {
            Some(Context::Pause(pause)) => {
                let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
                self.context = Some(pause.resume(&mut frame));
            }
            other => {
                log::debug!("Nothing to resume");
                self.context = other;
            }
        }
    }

    fn start_level(&mut self, engine: &mut Engine<Command>, number: u8) -> Result<(), AppError> {
        let spec = LevelSpec::get(number).ok_or_else(|| AppError::GameLogic(format!("No level {number}")))?;
        draw_load_screen(engine);

        // a pause queued in the frame the level ended still holds the game
        let paused_game = matches!(
            &self.context,
            Some(Context::Pause(pause)) if pause.suspended().as_game().is_some()
        );
        if paused_game {
            self.resume(engine);
        }

        if let Some(game) = self.context.as_mut().and_then(Context::as_game_mut) {
            let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
            return Ok(game.start_level(spec, &mut frame)?);
        }
        let lives = self.settings.gameplay.starting_lives;
        self.switch_to(engine, Context::Game(MainGame::new(spec, lives)))
    }

    fn switch_mower(&mut self, engine: &mut Engine<Command>, kind: MowerKind) -> Result<(), AppError> {
        let Some(game) = self.context.as_mut().and_then(Context::as_game_mut) else {
            return Ok(());
        };
        let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
        Ok(game.switch_mower(kind, &mut frame)?)
    }

    fn start_music(&self, services: &mut Services<'_, Command>) -> Result<(), AppError> {
        let buffer = services
            .resources
            .get_by_name(names::SND_LOOP)
            .and_then(Asset::as_sound)
            .map(|sound| sound.buffer)
            .ok_or_else(|| AppError::GameLogic("Background music is not loaded".into()))?;
        services.audio.play(buffer, true)?;
        services
            .audio
            .set_volume(buffer, volume_to_millibels(self.settings.audio.music_volume))?;
        Ok(())
    }
}

/// Present the loading box once, outside the frame loop
fn draw_load_screen(engine: &mut Engine<Command>) {
    let services = engine.services();
    let area = centred_box(services.viewport(), 200, 100);
    let renderer = services.renderer;
    renderer.begin_frame();
    renderer.fill_rect(area, LOAD_BACKGROUND);
    renderer.draw_text(LOADING, area, colour::WHITE);
    renderer.end_frame();
    let state = renderer.present();
    if state != DeviceState::Ok {
        log::debug!("Load screen present returned {state:?}");
    }
}

fn centred_box(viewport: Rect, half_width: i32, half_height: i32) -> Rect {
    Rect::centred(
        (viewport.left + viewport.right) / 2,
        (viewport.top + viewport.bottom) / 2,
        half_width,
        half_height,
    )
}

/// The blocking screen shown for a level outcome
fn outcome_screen(command: &Command, viewport: Rect) -> Option<ModalWait<Command>> {
    let banner = centred_box(viewport, 400, 100);
    let modal = match *command {
        Command::LevelComplete { level, score } => ModalWait {
            message: format!("Congratulations.\n\nScore: {score}.\n\nPress ENTER to proceed to next level."),
            area: banner,
            background: CONGRATULATIONS_BACKGROUND,
            text_colour: CONGRATULATIONS_TEXT,
            dismiss: KeyCode::Enter,
            then: LevelSpec::get(level)
                .and_then(LevelSpec::next)
                .map_or(Command::EndGame { score }, |next| Command::StartLevel(next.number)),
        },
        Command::GameOver { reason, score } => {
            let headline = match reason {
                GameOverReason::Timeout => "Time's up! Game over.",
                GameOverReason::NoLives => "No more lives! Game over.",
            };
            ModalWait {
                message: format!("{headline}\n\nScore: {score}.\n\nPress ENTER to exit."),
                area: banner,
                background: GAME_OVER_BACKGROUND,
                text_colour: colour::BLACK,
                dismiss: KeyCode::Enter,
                then: Command::ShowMainMenu,
            }
        }
        Command::EndGame { score } => ModalWait {
            message: format!(
                "You have completed the game.\n\nFinal score: {score}.\n\nThanks for playing!\n\n\n\
                 Press SPACE to return to the Start Menu."
            ),
            area: viewport,
            background: END_BACKGROUND,
            text_colour: END_TEXT,
            dismiss: KeyCode::Space,
            then: Command::ShowMainMenu,
        },
        _ => return None,
    };
    Some(modal)
}

impl Application for Game {
    type Request = Command;

    fn initialize(&mut self, engine: &mut Engine<Command>) -> Result<(), AppError> {
        log::info!("Loading startup resources");
        let mut services = engine.services();
        for (name, id) in SOUNDS {
            preload_sound(services.resources, &mut *services.loader, &mut *services.audio, name, id)?;
        }

        let light = PointLight::default();
        let handle = services.resources.create(Asset::Light(light));
        if let Err(err) = services.resources.add(handle, names::GLOBAL_LIGHT) {
            services.resources.release_ref(handle).ok();
            return Err(AssetError::from(err).into());
        }
        services.renderer.set_light(0, &light);
        self.start_music(&mut services)?;

        engine.request(Command::ShowMainMenu)?;
        Ok(())
    }

    fn apply(&mut self, engine: &mut Engine<Command>, request: Command) -> Result<(), AppError> {
        log::debug!("Applying {request:?}");
        match request {
            Command::ShowMainMenu => self.switch_to(engine, Context::MainMenu(MainMenu::new())),
            Command::ShowHelp => self.switch_to(engine, Context::Help(HelpPages::new())),
            Command::ShowOptions => self.switch_to(engine, Context::Options(OptionsMenu::new())),
            Command::Pause => self.pause(engine),
            Command::Resume => {
                self.resume(engine);
                Ok(())
            }
            Command::StartLevel(number) => self.start_level(engine, number),
            Command::SwitchMower(kind) => self.switch_mower(engine, kind),
            Command::Quit => {
                engine.quit();
                Ok(())
            }
            outcome @ (Command::LevelComplete { .. } | Command::GameOver { .. } | Command::EndGame { .. }) => {
                let viewport = engine.services().viewport();
                if let Some(modal) = outcome_screen(&outcome, viewport) {
                    engine.begin_modal(modal);
                }
                Ok(())
            }
        }
    }

    fn is_active(&self) -> bool {
        self.context.is_some()
    }

    fn handle_input(&mut self, services: &mut Services<'_, Command>) {
        if let Some(context) = self.context.as_mut() {
            let mut frame = Frame::new(services.reborrow(), &mut self.settings, &mut self.rng);
            Container::handle_input(context, &mut frame);
        }
    }

    fn update(&mut self, services: &mut Services<'_, Command>) -> Result<(), AppError> {
        if let Some(context) = self.context.as_mut() {
            let mut frame = Frame::new(services.reborrow(), &mut self.settings, &mut self.rng);
            Container::update(context, &mut frame);
        }
        Ok(())
    }

    fn render(&mut self, services: &mut Services<'_, Command>) {
        if let Some(context) = self.context.as_ref() {
            let mut frame = Frame::new(services.reborrow(), &mut self.settings, &mut self.rng);
            Container::render(context, &mut frame);
        }
    }

    fn on_device_reset(&mut self, services: &mut Services<'_, Command>) {
        let light = services
            .resources
            .get_by_name(names::GLOBAL_LIGHT)
            .and_then(Asset::as_light)
            .copied();
        if let Some(light) = light {
            services.renderer.set_light(0, &light);
        }
    }

    fn cleanup(&mut self, engine: &mut Engine<Command>) {
        if let Some(context) = self.context.take() {
            let mut frame = Frame::new(engine.services(), &mut self.settings, &mut self.rng);
            context.destroy(&mut frame);
        }
        log::info!("Game cleanup complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::BuiltinLoader;
    use crate::contexts::ContextKind;
    use mowve_engine::audio::headless::HeadlessAudio;
    use mowve_engine::input::{InputEvent, ScriptedInput};
    use mowve_engine::render::headless::HeadlessRenderer;
    use mowve_engine::scene::Identity;
    use mowve_engine::{Collaborators, EngineConfig};

    fn engine(input: ScriptedInput) -> Engine<Command> {
        let config = EngineConfig {
            modal_poll_ms: 0,
            ..EngineConfig::default()
        };
        Engine::new(
            config,
            Collaborators {
                loader: Box::new(BuiltinLoader::new()),
                renderer: Box::new(HeadlessRenderer::new(1024, 768)),
                audio: Box::new(HeadlessAudio::new()),
                input: Box::new(input),
            },
        )
    }

    fn game() -> Game {
        Game::new(GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        })
    }

    fn kind(game: &Game) -> Option<ContextKind> {
        game.context().map(Identity::kind)
    }

    #[test]
    fn test_startup_shows_main_menu() {
        let mut engine = engine(ScriptedInput::new());
        let mut game = game();
        game.initialize(&mut engine).unwrap();
        assert!(engine.resources().find_by_name(names::GLOBAL_LIGHT).is_some());
        assert!(!game.is_active());

        engine.tick(&mut game).unwrap();
        assert_eq!(kind(&game), Some(ContextKind::MainMenu));
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_new_game_click_starts_level_one() {
        let input = ScriptedInput::new().idle(1).click(512, 64);
        let mut engine = engine(input);
        let mut game = game();
        game.initialize(&mut engine).unwrap();

        for _ in 0..4 {
            engine.tick(&mut game).unwrap();
        }
        let level = game.context().and_then(Context::as_game).map(|game| game.level().number);
        assert_eq!(level, Some(1));
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_pause_and_resume_keep_the_level() {
        let input = ScriptedInput::new()
            .idle(1)
            .tap(KeyCode::Escape)
            .idle(1)
            .tap(KeyCode::Space)
            .idle(1);
        let mut engine = engine(input);
        let mut game = game();
        game.initialize(&mut engine).unwrap();
        engine.request(Command::StartLevel(1)).unwrap();

        engine.tick(&mut game).unwrap();
        engine.tick(&mut game).unwrap();
        let id = game.context().map(Identity::id);

        engine.tick(&mut game).unwrap();
        engine.tick(&mut game).unwrap();
        assert_eq!(kind(&game), Some(ContextKind::Pause));

        engine.tick(&mut game).unwrap();
        engine.tick(&mut game).unwrap();
        engine.tick(&mut game).unwrap();
        assert_eq!(kind(&game), Some(ContextKind::MainGame));
        assert_eq!(game.context().map(Identity::id), id);
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_level_complete_waits_for_enter_then_chains() {
        let input = ScriptedInput::new()
            .idle(2)
            .frame([InputEvent::KeyDown(KeyCode::Enter)])
            .frame([InputEvent::KeyUp(KeyCode::Enter)]);
        let mut engine = engine(input);
        let mut game = game();
        game.initialize(&mut engine).unwrap();
        engine.request(Command::StartLevel(1)).unwrap();
        engine.tick(&mut game).unwrap();

        engine.request(Command::LevelComplete { level: 1, score: 77 }).unwrap();
        engine.tick(&mut game).unwrap();
        let modal = engine.modal().unwrap();
        assert_eq!(modal.then, Command::StartLevel(2));
        assert!(modal.message.contains("Score: 77."));

        engine.tick(&mut game).unwrap();
        assert!(engine.modal().is_none());
        engine.tick(&mut game).unwrap();
        let level = game.context().and_then(Context::as_game).map(|game| game.level().number);
        assert_eq!(level, Some(2));
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_pause_in_completion_frame_keeps_the_game() {
        let input = ScriptedInput::new()
            .idle(2)
            .frame([InputEvent::KeyDown(KeyCode::Enter)])
            .frame([InputEvent::KeyUp(KeyCode::Enter)]);
        let mut engine = engine(input);
        let mut game = game();
        game.initialize(&mut engine).unwrap();
        engine.request(Command::StartLevel(1)).unwrap();
        engine.tick(&mut game).unwrap();

        let id = game.context().map(Identity::id);
        let score = game.context().and_then(Context::as_game).map(|game| game.level().score);
        assert!(score.is_some_and(|score| score > 0));

        // ESC and the last tile land in the same frame
        engine.request(Command::Pause).unwrap();
        engine.request(Command::LevelComplete { level: 1, score: 0 }).unwrap();
        engine.tick(&mut game).unwrap();
        assert_eq!(kind(&game), Some(ContextKind::Pause));
        assert!(engine.modal().is_some());

        engine.tick(&mut game).unwrap();
        engine.tick(&mut game).unwrap();
        assert_eq!(kind(&game), Some(ContextKind::MainGame));
        assert_eq!(game.context().map(Identity::id), id);
        let level = game.context().and_then(Context::as_game).map(MainGame::level).unwrap();
        assert_eq!(level.number, 2);
        assert!(level.score >= score.unwrap());
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_last_level_leads_to_end_game() {
        let viewport = Rect::new(0, 0, 1024, 768);
        let modal = outcome_screen(&Command::LevelComplete { level: 4, score: 900 }, viewport).unwrap();
        assert_eq!(modal.then, Command::EndGame { score: 900 });

        let end = outcome_screen(&Command::EndGame { score: 900 }, viewport).unwrap();
        assert_eq!(end.dismiss, KeyCode::Space);
        assert_eq!(end.area, viewport);
        assert!(end.message.contains("Final score: 900."));

        let lost = outcome_screen(
            &Command::GameOver {
                reason: GameOverReason::NoLives,
                score: 0,
            },
            viewport,
        )
        .unwrap();
        assert!(lost.message.starts_with("No more lives!"));
        assert_eq!(lost.then, Command::ShowMainMenu);
        assert!(outcome_screen(&Command::Quit, viewport).is_none());
    }

    #[test]
    fn test_startup_preloads_every_sound() {
        let mut engine = engine(ScriptedInput::new());
        let mut game = game();
        game.initialize(&mut engine).unwrap();
        for (name, _) in SOUNDS {
            let sound = engine.resources().get_by_name(name).and_then(Asset::as_sound);
            assert!(sound.is_some(), "{name} not loaded");
        }
        game.cleanup(&mut engine);
    }

    #[test]
    fn test_escape_on_main_menu_quits() {
        let mut engine = engine(ScriptedInput::new().idle(1).tap(KeyCode::Escape));
        let mut game = game();
        engine.run(&mut game).unwrap();
        assert!(!engine.is_running());
        assert!(game.context().is_none());
    }
}
