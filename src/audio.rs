//! Audio and haptic feedback
//!
//! The simulation only emits [`GameEvent`]s. This module maps them to named
//! sounds and vibration patterns and hands them to a host-provided backend.
//! Backend failures are cosmetic and always swallowed.

use thiserror::Error;

use crate::settings::Settings;
use crate::sim::{GameEvent, Side};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Ball hits either paddle
    PaddleHit,
    /// Ball hits a side wall
    WallBounce,
    PlayerScore,
    AiScore,
    GameStart,
    GameWin,
    GameLose,
    MenuSelect,
    LevelUp,
}

impl SoundEffect {
    /// Asset name used by sound backends
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::PaddleHit => "paddleHit",
            SoundEffect::WallBounce => "wallBounce",
            SoundEffect::PlayerScore => "playerScore",
            SoundEffect::AiScore => "aiScore",
            SoundEffect::GameStart => "gameStart",
            SoundEffect::GameWin => "gameWin",
            SoundEffect::GameLose => "gameLose",
            SoundEffect::MenuSelect => "menuSelect",
            SoundEffect::LevelUp => "levelUp",
        }
    }
}

/// Vibration patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
    Success,
    Warning,
    Error,
}

#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("Feedback device unavailable: {0}")]
    Unavailable(String),
}

/// Host audio/haptics backend
pub trait FeedbackSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), FeedbackError>;
    fn vibrate(&mut self, kind: HapticKind) -> Result<(), FeedbackError>;
}

/// Sound and haptic pattern for an event
pub fn feedback_for(event: &GameEvent) -> (SoundEffect, Option<HapticKind>) {
    match event {
        GameEvent::PaddleHit { is_player: true } => {
            (SoundEffect::PaddleHit, Some(HapticKind::Medium))
        }
        GameEvent::PaddleHit { is_player: false } => {
            (SoundEffect::PaddleHit, Some(HapticKind::Light))
        }
        GameEvent::WallBounce => (SoundEffect::WallBounce, Some(HapticKind::Light)),
        GameEvent::Score(Side::Player) => (SoundEffect::PlayerScore, Some(HapticKind::Success)),
        GameEvent::Score(Side::Ai) => (SoundEffect::AiScore, Some(HapticKind::Error)),
        GameEvent::GameStart => (SoundEffect::GameStart, None),
        GameEvent::GameWin => (SoundEffect::GameWin, Some(HapticKind::Success)),
        GameEvent::GameLose => (SoundEffect::GameLose, Some(HapticKind::Error)),
        GameEvent::MenuSelect => (SoundEffect::MenuSelect, Some(HapticKind::Light)),
        GameEvent::LevelUp => (SoundEffect::LevelUp, None),
    }
}

/// Audio manager for the game
///
/// Applies volume and vibration preferences before reaching the backend.
#[derive(Debug, Clone)]
pub struct AudioManager {
    sfx_volume: f32,
    vibration_enabled: bool,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AudioManager {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sfx_volume: settings.sfx_gain(),
            vibration_enabled: settings.vibration_enabled,
            muted: false,
        }
    }

    /// Re-read preferences after a settings change
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.sfx_gain();
        self.vibration_enabled = settings.vibration_enabled;
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    /// Forward one event to the backend, ignoring device errors
    pub fn handle(&self, event: &GameEvent, sink: &mut dyn FeedbackSink) {
        let (effect, haptic) = feedback_for(event);

        let vol = self.effective_volume();
        if vol > 0.0 {
            if let Err(e) = sink.play(effect, vol) {
                log::debug!("Sound {} skipped: {}", effect.name(), e);
            }
        }

        if let (true, Some(kind)) = (self.vibration_enabled, haptic) {
            if let Err(e) = sink.vibrate(kind) {
                log::debug!("Haptic {:?} skipped: {}", kind, e);
            }
        }
    }
}

/// Backend that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink;

impl FeedbackSink for LogSink {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), FeedbackError> {
        log::trace!("play {} @ {:.2}", effect.name(), volume);
        Ok(())
    }

    fn vibrate(&mut self, kind: HapticKind) -> Result<(), FeedbackError> {
        log::trace!("vibrate {:?}", kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<(SoundEffect, f32)>,
        haptics: Vec<HapticKind>,
        broken: bool,
    }

    impl FeedbackSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), FeedbackError> {
            if self.broken {
                return Err(FeedbackError::Unavailable("no device".into()));
            }
            self.sounds.push((effect, volume));
            Ok(())
        }

        fn vibrate(&mut self, kind: HapticKind) -> Result<(), FeedbackError> {
            if self.broken {
                return Err(FeedbackError::Unavailable("no motor".into()));
            }
            self.haptics.push(kind);
            Ok(())
        }
    }

    #[test]
    fn test_event_mapping() {
        let audio = AudioManager::default();
        let mut sink = Recorder::default();
        audio.handle(&GameEvent::PaddleHit { is_player: true }, &mut sink);
        audio.handle(&GameEvent::Score(Side::Ai), &mut sink);
        audio.handle(&GameEvent::LevelUp, &mut sink);

        let sounds: Vec<_> = sink.sounds.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            sounds,
            [SoundEffect::PaddleHit, SoundEffect::AiScore, SoundEffect::LevelUp]
        );
        assert_eq!(sink.haptics, [HapticKind::Medium, HapticKind::Error]);
    }

    #[test]
    fn test_preferences_respected() {
        let settings = Settings {
            sfx_volume: 0.5,
            vibration_enabled: false,
            ..Settings::default()
        };
        let mut audio = AudioManager::from_settings(&settings);
        let mut sink = Recorder::default();
        audio.handle(&GameEvent::WallBounce, &mut sink);
        assert_eq!(sink.sounds, [(SoundEffect::WallBounce, 0.5)]);
        assert!(sink.haptics.is_empty());

        audio.set_muted(true);
        audio.handle(&GameEvent::WallBounce, &mut sink);
        assert_eq!(sink.sounds.len(), 1);
    }

    #[test]
    fn test_backend_errors_ignored() {
        let audio = AudioManager::default();
        let mut sink = Recorder {
            broken: true,
            ..Default::default()
        };
        audio.handle(&GameEvent::GameWin, &mut sink);
        assert!(sink.sounds.is_empty());
    }
}
