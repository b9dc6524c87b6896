//! Strapwork Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: buckle/strap attachment (кресла, ремни, скамейки).
//!
//! Движок (input, физика, рендер, сеть) — внешний слой:
//! - пишет `AttachIntent` или вызывает orchestration напрямую
//! - читает `AttachStateChanged` для репликации
//! - опрашивает `can_move` / `can_change_direction` / `can_fall`

use bevy::app::FixedMain;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod attachment;
pub mod logger;
pub mod scenario;
pub mod shared;

// Re-export базовых типов для удобства
pub use attachment::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel};
pub use shared::{ClockPlugin, SimulationTick};

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub attach_config: AttachConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(AttachmentPlugin::with_config(self.attach_config.clone()));

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (со всеми подсистемами)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin::default());

    app
}

/// Прогнать ровно `ticks` fixed шагов (без зависимости от wall-clock)
///
/// `app.update()` запускает FixedMain столько раз, сколько накопилось реального
/// времени — для тестов и replay нужен точный счёт.
pub fn run_ticks(app: &mut App, ticks: u64) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedMain);
    }
}

/// Snapshot attachment state для сравнения детерминизма
///
/// Формат: по entity (отсортировано по index) — replicated snapshot attachable
/// и occupancy anchor. Entity generation не включаем — между прогонами она стабильна,
/// но index нагляднее при диффе.
pub fn attachment_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut attachables = world.query::<(Entity, &Attachable)>();
    let mut entries: Vec<_> = attachables
        .iter(world)
        .map(|(entity, attachable)| (entity, AttachSnapshot::of(attachable)))
        .collect();
    entries.sort_by_key(|(entity, _)| entity.index());

    for (entity, state) in entries {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.push(state.attached as u8);
        snapshot.extend_from_slice(&state.anchor.unwrap_or(u64::MAX).to_le_bytes());
    }

    let mut anchors = world.query::<(Entity, &Anchor)>();
    let mut entries: Vec<_> = anchors
        .iter(world)
        .map(|(entity, anchor)| (entity, anchor.occupied(), anchor.members().len()))
        .collect();
    entries.sort_by_key(|(entity, _, _)| entity.index());

    for (entity, occupied, members) in entries {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&occupied.to_le_bytes());
        snapshot.extend_from_slice(&(members as u32).to_le_bytes());
    }

    snapshot
}
