//! Headless симуляция Strapwork
//!
//! Зал ожидания: пассажиры пристёгиваются / отстёгиваются 1000 тиков,
//! каждые 100 тиков печатаем occupancy и проверяем инварианты.

use strapwork_simulation::scenario::{spawn_seating, ScenarioPlugin, SeatingLayout};
use strapwork_simulation::{
    create_headless_app, log_error, log_info, run_ticks, set_log_level, verify_link_consistency,
    Anchor, LogLevel,
};

fn main() {
    let seed = 42;
    let layout = SeatingLayout::default();

    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Info);
    app.add_plugins(ScenarioPlugin { layout });

    log_info(&format!(
        "Starting Strapwork headless simulation (seed: {}, passengers: {})",
        seed, layout.passengers
    ));

    let anchors = spawn_seating(app.world_mut(), layout);

    for tick in 1..=10u64 {
        run_ticks(&mut app, 100);

        let world = app.world();
        let occupied: u32 = anchors
            .iter()
            .filter_map(|&anchor| world.get::<Anchor>(anchor))
            .map(Anchor::occupied)
            .sum();
        let seated: usize = anchors
            .iter()
            .filter_map(|&anchor| world.get::<Anchor>(anchor))
            .map(|anchor| anchor.members().len())
            .sum();

        log_info(&format!(
            "Tick {}: {} passengers seated, {} capacity occupied",
            tick * 100,
            seated,
            occupied
        ));

        let violations = verify_link_consistency(app.world_mut());
        if !violations.is_empty() {
            log_error(&format!("Link invariants broken: {:?}", violations));
        }
    }

    log_info("Simulation complete!");
}
