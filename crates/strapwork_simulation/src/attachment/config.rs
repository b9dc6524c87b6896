//! Tuning параметры attachment

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Максимальная дистанция attach/detach (метры)
pub const DEFAULT_INTERACTION_RANGE: f32 = 1.4;

/// Cooldown на non-forced detach: 15 тиков = 0.25 сек при 60Hz
pub const DEFAULT_DETACH_COOLDOWN_TICKS: u64 = 15;

/// Параметры attachment (resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
#[serde(default)]
pub struct AttachConfig {
    /// Дистанция между attachable и anchor, в пределах которой разрешены attach/detach
    pub interaction_range: f32,
    /// Сколько тиков после transition нельзя отстегнуться (non-forced)
    pub detach_cooldown_ticks: u64,
}

impl Default for AttachConfig {
    fn default() -> Self {
        Self {
            interaction_range: DEFAULT_INTERACTION_RANGE,
            detach_cooldown_ticks: DEFAULT_DETACH_COOLDOWN_TICKS,
        }
    }
}
