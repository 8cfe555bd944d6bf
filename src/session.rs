//! Frame driver
//!
//! Glues the [`MatchLoop`] to the [`MatchStateMachine`]: keeps the loop's
//! tuning in sync with the active level, routes scoring events into the
//! state machine and forwards every event to the feedback backend.
//!
//! Saves queued by the state machine are flushed on the frame a match ends.
//! Hosts that want them written sooner (e.g. when backgrounded) call
//! [`Session::flush_persistence`].

use crate::audio::{AudioManager, FeedbackSink, LogSink};
use crate::consts::REFERENCE_FRAME_MS;
use crate::game::{GameStatus, MatchStateMachine};
use crate::level::Difficulty;
use crate::sim::{FieldGeometry, GameEvent, LoopParams, MatchLoop, Side, Snapshot};

/// One running game: state machine, simulation and feedback backend
pub struct Session<S: FeedbackSink = LogSink> {
    machine: MatchStateMachine,
    sim: MatchLoop,
    audio: AudioManager,
    sink: S,
    /// Config generation the loop was last tuned for
    synced_generation: Option<u64>,
}

impl<S: FeedbackSink> Session<S> {
    pub fn new(machine: MatchStateMachine, field: FieldGeometry, seed: u64, sink: S) -> Self {
        let audio = AudioManager::from_settings(machine.settings());
        let mut sim = MatchLoop::new(field, seed);
        sim.center();
        let mut session = Self {
            machine,
            sim,
            audio,
            sink,
            synced_generation: None,
        };
        session.sync_params();
        session
    }

    pub fn machine(&self) -> &MatchStateMachine {
        &self.machine
    }

    /// State machine access for menu/settings operations
    pub fn machine_mut(&mut self) -> &mut MatchStateMachine {
        &mut self.machine
    }

    pub fn simulation(&self) -> &MatchLoop {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut MatchLoop {
        &mut self.sim
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Retune the loop if the active level config was replaced
    fn sync_params(&mut self) {
        let generation = self.machine.config_generation();
        if self.synced_generation == Some(generation) {
            return;
        }
        let params = self
            .machine
            .state()
            .level_config
            .as_ref()
            .map_or_else(LoopParams::default, |config| LoopParams::from(config));
        log::debug!("Loop params now {:?}", params);
        self.sim.load_params(params);
        self.synced_generation = Some(generation);
    }

    fn dispatch_machine_events(&mut self) {
        for event in self.machine.drain_events() {
            self.audio.handle(&event, &mut self.sink);
        }
    }

    /// Fresh rally: paddles centered, ball served toward the AI
    fn reset_rally(&mut self) {
        self.sync_params();
        self.sim.center();
        self.sim.serve(Side::Ai);
        self.sim.set_playing(true);
        self.dispatch_machine_events();
    }

    /// Start a match at the current level
    pub fn start_game(&mut self) {
        self.machine.start_game();
        self.reset_rally();
    }

    pub fn start_level(&mut self, level: u32) {
        self.machine.start_level(level);
        self.reset_rally();
    }

    pub fn next_level(&mut self) {
        self.machine.next_level();
        self.reset_rally();
    }

    pub fn pause(&mut self) {
        self.machine.pause_game();
        self.sim.set_playing(false);
    }

    pub fn resume(&mut self) {
        self.machine.resume_game();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.machine.set_difficulty(difficulty);
    }

    /// Apply queued saves; returns how many failed
    pub fn flush_persistence(&mut self) -> usize {
        self.machine.flush_persistence()
    }

    /// Advance one frame
    ///
    /// `delta_ms` falls back to the 60 fps frame time when absent or invalid.
    /// `player_paddle_x` is the latest touch position, if it moved.
    pub fn frame(&mut self, delta_ms: Option<f32>, player_paddle_x: Option<f32>) -> Snapshot {
        let delta = delta_ms
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(REFERENCE_FRAME_MS);

        self.sync_params();
        self.audio.apply_settings(self.machine.settings());

        if let Some(x) = player_paddle_x {
            self.sim.set_player_paddle_x(x);
        }

        let playing = self.machine.state().status == GameStatus::Playing;
        self.sim.set_playing(playing);
        self.sim.step(delta);
        self.machine.record_play_time(delta);

        for event in self.sim.drain_events() {
            match event {
                GameEvent::Score(Side::Player) => self.machine.increment_player_score(),
                GameEvent::Score(Side::Ai) => self.machine.increment_ai_score(),
                _ => {}
            }
            self.audio.handle(&event, &mut self.sink);
        }
        self.dispatch_machine_events();

        if self.machine.state().status != GameStatus::Playing {
            self.sim.set_playing(false);
        }
        if !playing || self.machine.state().status != GameStatus::GameOver {
            return self.sim.snapshot();
        }

        let failed = self.machine.flush_persistence();
        if failed > 0 {
            log::warn!("{} saves failed at match end", failed);
        }
        self.sim.snapshot()
    }
}
