/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::assets::TraitTable;
use sim::level::{self, WorldDef, WorldError};
use sim::step;
use sim::world::{GameSession, Phase};
use ui::input::InputState;
use ui::renderer::Renderer;

/// 60 simulation ticks per second.
const TICK_RATE: Duration = Duration::from_micros(16_667);
const FRAME_SLEEP: Duration = Duration::from_millis(4);

fn main() {
    // Logging goes to stderr before the terminal enters raw mode;
    // enable with RUST_LOG=info (or debug).
    env_logger::init();

    let config = GameConfig::load();
    let table = TraitTable::load(&config.assets_dir);

    // First world file on disk wins; the embedded world is the fallback.
    let (name, def) = match level::scan_worlds(&config.worlds_dir).into_iter().next() {
        Some((name, path)) => match WorldDef::from_path(&path) {
            Ok(def) => (name, def),
            Err(e) => {
                eprintln!("Failed to load world {}: {e}", path.display());
                return;
            }
        },
        None => level::embedded_world(),
    };

    // A failed build aborts before gameplay — never a partial world.
    let session = match level::build_session(&def, &name, &table, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("World construction failed: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let crates = match game_loop(session, &def, &name, &table, &config, &mut renderer) {
        Ok(crates) => {
            if let Err(e) = renderer.cleanup() {
                eprintln!("Terminal cleanup failed: {e}");
            }
            crates
        }
        Err(e) => {
            let _ = renderer.cleanup();
            eprintln!("Game error: {e}");
            return;
        }
    };

    println!();
    println!("Thanks for playing Shorebound!");
    println!("Crates collected: {crates}");
}

fn game_loop(
    mut session: GameSession,
    def: &WorldDef,
    name: &str,
    table: &TraitTable,
    config: &GameConfig,
    renderer: &mut Renderer,
) -> Result<u32, Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();

        if input.quit_requested() {
            break;
        }

        // Phase transitions are edge-triggered on Enter
        if input.was_pressed(KeyCode::Enter) {
            match session.phase {
                Phase::Title => session.phase = Phase::Playing,
                Phase::Dead => {
                    session = respawn(&session, def, name, table, config)?;
                }
                Phase::Playing => {}
            }
        }
        // Full restart, checkpoint progress discarded
        if input.was_pressed(KeyCode::Char('r')) {
            let crates = session.crates_collected;
            session = level::build_session(def, name, table, config)?;
            session.phase = Phase::Playing;
            log::info!("world restarted (had {crates} crates)");
        }

        if last_tick.elapsed() >= TICK_RATE {
            if session.phase == Phase::Playing {
                let events = step::step(&mut session, input.frame_input());
                for event in &events {
                    log::debug!("tick {}: {:?}", session.tick, event);
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(&session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(session.crates_collected)
}

/// Rebuild the session after death, scrolled back to the last
/// checkpoint when one was reached.
fn respawn(
    dead: &GameSession,
    def: &WorldDef,
    name: &str,
    table: &TraitTable,
    config: &GameConfig,
) -> Result<GameSession, WorldError> {
    let checkpoint = dead.checkpoint_scroll;
    let mut session = level::build_session(def, name, table, config)?;
    if let Some((sx, sy)) = checkpoint {
        session.catalog.scroll(sx, sy);
        session.checkpoint_scroll = Some((sx, sy));
    }
    session.phase = Phase::Playing;
    Ok(session)
}
