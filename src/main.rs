/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::{FrameInput, InputSource, Key};
use sim::level::Campaign;
use sim::session::{Screen, Session};
use ui::gamepad::{Action, GamepadState};
use ui::input::{Controls, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    logging::init(&config.log);
    for w in &config.warnings {
        log::warn!("config: {w}");
    }

    let campaign = Campaign::load(&config.levels_dir);
    if campaign.is_empty() {
        log::error!("no playable levels");
        eprintln!("No playable levels found.");
        return;
    }
    log::info!("{} level(s) in the campaign", campaign.len());
    let mut session = Session::new(campaign, config.sim.clone());

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Kong Climber!");
    if let Screen::GameOver { score, .. } = session.screen {
        println!("Final Score: {score}");
    }
}

/// Edge-triggered presses seen between two simulation ticks.
/// The loop polls input faster than it steps, so presses are latched
/// until the next tick consumes them.
#[derive(Default)]
struct Latch {
    jump: bool,
    fire: bool,
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut latch = Latch::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(session, &kb, &gp) {
            break;
        }

        let controls = Controls { keyboard: &kb, gamepad: &gp };
        if session.screen == Screen::Playing && !session.paused {
            latch.jump |= controls.was_pressed(Key::Jump);
            latch.fire |= controls.was_pressed(Key::Fire);
        }

        if last_tick.elapsed() >= tick_rate {
            if session.screen == Screen::Playing && !session.paused {
                let mut input = FrameInput::from_source(&controls);
                input.jump = std::mem::take(&mut latch.jump);
                input.fire = std::mem::take(&mut latch.fire);

                let events = session.tick(&input);
                for e in &events {
                    log::debug!("event: {e:?}");
                }
                if let Some(sfx) = sound {
                    sfx.play_events(&events);
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];

/// Screen-level keys. Returns true when the player asked to quit.
fn handle_meta(session: &mut Session, kb: &InputState, gp: &GamepadState) -> bool {
    let controls = Controls { keyboard: kb, gamepad: gp };
    let confirm = controls.was_pressed(Key::Confirm);
    let cancel = controls.was_pressed(Key::Cancel);

    match session.screen {
        Screen::Title => {
            if cancel {
                return true;
            }
            if confirm {
                session.start(0, 0);
            } else if let Some(n) = digit_pressed(kb) {
                session.start(n - 1, 0);
            }
        }
        Screen::Playing => {
            if kb.any_pressed(KEYS_PAUSE) || gp.pressed(Action::Pause) {
                session.toggle_pause();
                log::info!("paused: {}", session.paused);
            } else if cancel {
                session.back_to_title();
            }
        }
        Screen::GameOver { .. } => {
            if confirm {
                session.start(0, 0);
            } else if cancel {
                session.back_to_title();
            }
        }
    }
    false
}

/// Level number key ('1'..='9') pressed on the title screen.
fn digit_pressed(kb: &InputState) -> Option<usize> {
    ('1'..='9')
        .find(|&c| kb.was_pressed(KeyCode::Char(c)))
        .and_then(|c| c.to_digit(10))
        .map(|d| d as usize)
}
