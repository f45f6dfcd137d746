/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use log::{info, trace, warn};

use config::{GameConfig, SpeedConfig};
use sim::event::GameEvent;
use sim::step;
use sim::world::Game;
use ui::anim::Animation;
use ui::gamepad::GamepadState;
use ui::input::{Command, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let (config, config_error) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Logging disabled: {e}");
    }
    if let Some(e) = &config_error {
        warn!("{e}; using default settings");
    }

    let mut game: Game = Game::new(config.game.seed, config.game.win_target);
    info!(
        "new game: target {}, seed {:?}\n{}",
        config.game.win_target, config.game.seed, game.board
    );

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
    if let Some(e) = config_error {
        eprintln!("config.toml ignored: {e}");
    }

    info!("exit: score {}, best {}, {} moves", game.score(), game.best, game.moves);
    println!();
    if game.is_over() {
        println!("Game over.");
    }
    println!("Final Score: {}", game.score());
    println!("Best:        {}", game.best.max(game.score()));
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    let mut anim = Some(Animation::from_spawns(&game.opening, &config.speed));

    loop {
        kb.drain_events()?;
        gp.update();
        for &cmd in gp.commands() {
            kb.push(cmd);
        }

        if kb.quit_requested() {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            if let Some(a) = anim.as_mut() {
                a.advance();
            }
            last_tick = Instant::now();
        }

        if kb.restart_pending() {
            if let Some(a) = anim.as_mut() {
                a.finish();
            }
        }

        // One command per finished animation; the rest stay queued.
        if anim.as_ref().map_or(true, Animation::is_done) {
            if let Some(cmd) = kb.next_command() {
                anim = apply_command(game, cmd, sound, &config.speed);
            }
        }

        renderer.render(game, anim.as_ref())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Run one command against the game. Returns the animation to play, if any.
fn apply_command(
    game: &mut Game,
    cmd: Command,
    sound: Option<&SoundEngine>,
    speed: &SpeedConfig,
) -> Option<Animation> {
    match cmd {
        Command::Move(direction) => {
            let events = step::step(game, direction);
            process_sound_events(sound, &events);
            if matches!(events.as_slice(), [] | [GameEvent::Blocked { .. }]) {
                return None;
            }
            game.last_move.as_ref().map(|result| Animation::from_move(result, speed))
        }
        Command::KeepPlaying => {
            let events = step::keep_playing(game);
            process_sound_events(sound, &events);
            None
        }
        Command::Restart => {
            step::restart(game);
            Some(Animation::from_spawns(&game.opening, speed))
        }
        Command::Quit => None,
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        trace!("{event}");
    }
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };

    // One move sound: the biggest merge if there was one, else the slide.
    let top_merge = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Merged { value, .. } => Some(*value),
            _ => None,
        })
        .max();
    match top_merge {
        Some(value) => sfx.play_merge(value),
        None if events.iter().any(|e| matches!(e, GameEvent::Slid { .. })) => sfx.play_slide(),
        None => {}
    }

    for event in events {
        match event {
            GameEvent::Won { .. } => sfx.play_win(),
            GameEvent::Lost { .. } => sfx.play_lose(),
            _ => {}
        }
    }
}
