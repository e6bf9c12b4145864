//! Headless demo: a recycled list of swipeable rows.
//!
//! Usage: `swipereveal-demo [config.json]`. Set `RUST_LOG=debug` to follow
//! engine transitions.

mod list;

use std::process::ExitCode;

use swipereveal_core::{RevealConfig, RevealCoordinator, RevealResult, StateBundle};

use list::RecycledList;

fn load_config() -> RevealResult<RevealConfig> {
    match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => {
                log::info!("Loading config from {}", path);
                RevealConfig::from_json(&json)
            }
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path, e);
                Ok(RevealConfig::default())
            }
        },
        None => Ok(RevealConfig::default()),
    }
}

fn run() -> RevealResult<()> {
    let config = load_config()?;
    let items = (0..10).map(|i| format!("row{}", i)).collect();
    let mut list = RecycledList::new(&config, items, 3);
    list.coordinator().set_open_only_one(true);
    list.coordinator().lock_swipe(&["row2"]);

    list.scroll_to(0)?;
    log::info!("Visible: {:?}", list.visible());

    // Drag row0 open, then fling row1 open; only row1 stays open.
    list.swipe(0, 20.0, 140.0, 0.0)?;
    let frames = list.run_frames();
    log::info!(
        "Settled in {} frames after {} slide events: {:?}",
        frames,
        list.slide_count(0),
        list.visible()
    );

    list.swipe(1, 20.0, 40.0, 1200.0)?;
    list.run_frames();
    log::info!("After fling: {:?}", list.visible());

    // row2 is locked: the swipe is ignored.
    list.swipe(2, 20.0, 200.0, 0.0)?;
    list.run_frames();
    log::info!("After locked swipe: {:?}", list.visible());

    list.scroll_to(6)?;
    list.coordinator().open_layout("row8");
    list.run_frames();
    log::info!("Scrolled down: {:?}", list.visible());

    list.scroll_to(0)?;
    log::info!("Back at the top: {:?}", list.visible());

    let mut saved = StateBundle::new();
    list.coordinator().save_states(&mut saved);
    let json = saved.to_json()?;
    println!("{}", json);

    let restored = RevealCoordinator::new();
    restored.restore_states(&StateBundle::from_json(&json)?);
    log::info!(
        "Restored {} row states",
        restored.remembered_states().len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting SwipeReveal demo");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
