//! Paddle Battle headless runner
//!
//! Plays a few matches with a ball-tracking player against the AI and logs
//! the results. Usage: `paddle-battle [save-dir] [level] [seed]`.
//! Without a save dir progress lives in memory only. `PADDLE_BATTLE_FIELD`
//! may point at a JSON field layout.

use paddle_battle::audio::LogSink;
use paddle_battle::persistence::{self, FileStore, MemoryStore, Storage};
use paddle_battle::sim::FieldGeometry;
use paddle_battle::{GameStatus, MatchStateMachine, Session};

/// Frames before a match is abandoned (about ten minutes at 60 fps)
const MAX_FRAMES: u32 = 36_000;
const MATCHES: u32 = 3;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let storage: Box<dyn Storage> = match args.next() {
        Some(dir) if dir != "-" => {
            log::info!("Saving progress to {}", dir);
            Box::new(FileStore::new(dir))
        }
        _ => Box::new(MemoryStore::new()),
    };
    let level = args.next().and_then(|s| s.parse::<u32>().ok());
    let seed = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(42);

    let machine = MatchStateMachine::load(storage);
    let mut session = Session::new(machine, load_field(), seed, LogSink);

    match level {
        Some(level) => session.start_level(level),
        None => session.start_game(),
    }

    for played in 1..=MATCHES {
        let frames = play_match(&mut session);
        let state = session.machine().state();
        log::info!(
            "Match {} (level {}): {:?} {}-{} after {} frames",
            played,
            state.current_level,
            state.winner,
            state.player_score,
            state.ai_score,
            frames
        );

        if state.status == GameStatus::GameOver {
            session
                .machine_mut()
                .submit_high_score("CPU", format!("seed-{}", seed));
        }
        let failed = session.flush_persistence();
        if failed > 0 {
            log::warn!("{} saves failed", failed);
        }

        if played < MATCHES {
            session.next_level();
        }
    }

    match persistence::load_stats(session.machine().storage()) {
        Ok(stats) => log::info!(
            "Totals: {} played, {} won, best streak {}",
            stats.total_games_played,
            stats.total_wins,
            stats.best_win_streak
        ),
        Err(e) => log::warn!("Could not read stats: {}", e),
    }
}

fn load_field() -> FieldGeometry {
    let Ok(path) = std::env::var("PADDLE_BATTLE_FIELD") else {
        return FieldGeometry::default();
    };
    match std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| FieldGeometry::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(field) => field,
        Err(e) => {
            log::warn!("Ignoring field layout {}: {}", path, e);
            FieldGeometry::default()
        }
    }
}

/// Run until the match ends; the player paddle chases the ball with some lag
fn play_match(session: &mut Session) -> u32 {
    let mut frames = 0;
    while frames < MAX_FRAMES && session.machine().state().status == GameStatus::Playing {
        let sim = session.simulation();
        let width = sim.player_paddle_width();
        let current = sim.state().player_paddle_x;
        let target = sim.state().ball_pos.x - width / 2.0;
        let next = current + (target - current) * 0.2;

        session.frame(None, Some(next));
        frames += 1;
    }
    frames
}
