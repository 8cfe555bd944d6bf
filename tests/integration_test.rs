use glam::Vec2;
use paddle_battle::audio::{FeedbackError, FeedbackSink, HapticKind, SoundEffect};
use paddle_battle::persistence::{self, FileStore, MemoryStore};
use paddle_battle::sim::{FieldGeometry, Side};
use paddle_battle::{Difficulty, GameStatus, HighScores, MatchStateMachine, Session};

#[derive(Default)]
struct Recorder {
    sounds: Vec<SoundEffect>,
    haptics: Vec<HapticKind>,
}

impl FeedbackSink for Recorder {
    fn play(&mut self, effect: SoundEffect, _volume: f32) -> Result<(), FeedbackError> {
        self.sounds.push(effect);
        Ok(())
    }

    fn vibrate(&mut self, kind: HapticKind) -> Result<(), FeedbackError> {
        self.haptics.push(kind);
        Ok(())
    }
}

fn memory_session(seed: u64) -> Session<Recorder> {
    let machine = MatchStateMachine::load(Box::new(MemoryStore::new()));
    Session::new(machine, FieldGeometry::default(), seed, Recorder::default())
}

/// Put the ball just past the AI's goal line so the next frame scores
fn force_player_point(session: &mut Session<Recorder>) {
    let state = session.simulation_mut().state_mut();
    state.ball_pos = Vec2::new(200.0, 5.0);
    state.ball_vel = Vec2::new(0.0, -1.0);
    session.frame(None, None);
}

fn tracking_input(session: &Session<Recorder>) -> f32 {
    let sim = session.simulation();
    sim.state().ball_pos.x - sim.player_paddle_width() / 2.0
}

#[test]
fn test_long_rally_invariants() {
    let mut session = memory_session(11);
    session.start_level(30);
    let field = *session.simulation().field();
    let target = session.machine().winning_score();

    for _ in 0..20_000 {
        let x = tracking_input(&session);
        let snap = session.frame(Some(16.67), Some(x));

        assert!(snap.ball.x >= field.ball_radius - 1e-3);
        assert!(snap.ball.x <= field.width - field.ball_radius + 1e-3);
        assert!(snap.player_paddle.x >= 0.0);
        assert!(snap.player_paddle.x + snap.player_paddle_width <= field.width + 1e-3);
        assert!(snap.ai_paddle.x >= 0.0);
        assert!(snap.ai_paddle.x + snap.ai_paddle_width <= field.width + 1e-3);

        let state = session.machine().state();
        assert!(state.player_score <= target);
        assert!(state.ai_score <= target);
        if state.status == GameStatus::GameOver {
            assert!(state.winner.is_some());
            break;
        }
        assert_eq!(state.status, GameStatus::Playing);
    }
}

#[test]
fn test_same_seed_same_match() {
    let mut a = memory_session(99);
    let mut b = memory_session(99);
    a.start_level(5);
    b.start_level(5);

    for frame in 0..3_000 {
        let delta = if frame % 3 == 0 { Some(33.3) } else { None };
        let xa = tracking_input(&a);
        let xb = tracking_input(&b);
        assert_eq!(a.frame(delta, Some(xa)), b.frame(delta, Some(xb)));
    }
    assert_eq!(a.machine().state(), b.machine().state());
    assert_eq!(a.sink().sounds, b.sink().sounds);
}

#[test]
fn test_campaign_progress_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let machine = MatchStateMachine::load(Box::new(FileStore::new(dir.path())));
        let mut session = Session::new(machine, FieldGeometry::default(), 3, Recorder::default());
        session.set_difficulty(Difficulty::Hard);
        session.start_level(1);
        for _ in 0..5 {
            force_player_point(&mut session);
        }
        assert_eq!(session.machine().state().status, GameStatus::GameOver);
        assert_eq!(session.machine().state().winner, Some(Side::Player));

        session
            .machine_mut()
            .submit_high_score("ACE", "2026-10-19");
        session.next_level();
        assert_eq!(session.flush_persistence(), 0);

        assert!(session.sink().sounds.contains(&SoundEffect::GameWin));
        assert!(session.sink().haptics.contains(&HapticKind::Success));
    }

    let machine = MatchStateMachine::load(Box::new(FileStore::new(dir.path())));
    let state = machine.state();
    assert_eq!(state.current_level, 2);
    assert_eq!(state.highest_level_unlocked, 2);
    assert_eq!(state.stars_for(1), 3);
    assert_eq!(state.difficulty, Difficulty::Hard);

    let stats = persistence::load_stats(machine.storage()).unwrap();
    assert_eq!(stats.total_games_played, 1);
    assert_eq!(stats.perfect_levels, 1);

    let scores = HighScores::load(machine.storage()).unwrap();
    assert_eq!(scores.top().map(|e| e.name.as_str()), Some("ACE"));
    assert_eq!(scores.top().map(|e| e.difficulty), Some(Difficulty::Hard));
}

#[test]
fn test_corrupted_save_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", persistence::keys::PROGRESS)), "{oops").unwrap();

    let machine = MatchStateMachine::load(Box::new(FileStore::new(dir.path())));
    assert_eq!(machine.state().current_level, 1);
    assert_eq!(machine.state().highest_level_unlocked, 1);

    let mut session = Session::new(machine, FieldGeometry::default(), 1, Recorder::default());
    session.start_level(1);
    session.frame(None, None);
    assert_eq!(session.machine().state().status, GameStatus::Playing);
}

#[test]
fn test_last_level_replays() {
    let mut session = memory_session(5);
    session.start_level(100);
    assert!(session.machine().state().level_config.as_ref().is_some_and(|c| c.is_boss()));
    for _ in 0..15 {
        force_player_point(&mut session);
    }
    assert_eq!(session.machine().state().status, GameStatus::GameOver);

    session.next_level();
    assert_eq!(session.machine().state().current_level, 100);
    assert_eq!(session.machine().state().status, GameStatus::Playing);
    assert_eq!(session.machine().state().highest_level_unlocked, 100);
}
