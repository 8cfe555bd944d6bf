//! Game settings and preferences
//!
//! Persisted separately from campaign progress.

use serde::{Deserialize, Serialize};

use crate::level::Difficulty;
use crate::persistence::store::{load_record, merge_record};
use crate::persistence::{Storage, StorageError, keys};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Haptic feedback on hits and scores
    pub vibration_enabled: bool,
    pub difficulty: Difficulty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.7,
            sfx_volume: 1.0,
            vibration_enabled: true,
            difficulty: Difficulty::Medium,
        }
    }
}

/// Partial settings update; `None` fields keep their stored value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sfx_volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibration_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl Settings {
    /// Apply a patch in memory, clamping volumes to [0, 1]
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.music_volume {
            self.music_volume = v.clamp(0.0, 1.0);
        }
        if let Some(v) = patch.sfx_volume {
            self.sfx_volume = v.clamp(0.0, 1.0);
        }
        if let Some(enabled) = patch.vibration_enabled {
            self.vibration_enabled = enabled;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
    }

    /// Effective sfx gain (0 when muted)
    pub fn sfx_gain(&self) -> f32 {
        self.sfx_volume.clamp(0.0, 1.0)
    }

    pub fn load(store: &dyn Storage) -> Result<Self, StorageError> {
        load_record(store, keys::SETTINGS)
    }

    pub fn save(store: &mut dyn Storage, patch: &SettingsPatch) -> Result<(), StorageError> {
        merge_record(store, keys::SETTINGS, patch)
    }
}
