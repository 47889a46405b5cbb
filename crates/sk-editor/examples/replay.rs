//! Replay a recorded input script through an `Editor` and print the
//! resulting document.
//!
//! ```text
//! cargo run -p sk-editor --example replay -- [events.json] [snapshot.json]
//! ```
//!
//! With no arguments, replays `scripts/crop_drag.json` over the test photo
//! fixture. Set `RUST_LOG=debug` to watch the transitions.

use sk_core::{Store, StoreSnapshot};
use sk_editor::{Editor, EditorConfig, InputEvent};
use std::env;
use std::fs;

const DEFAULT_SCRIPT: &str = include_str!("scripts/crop_drag.json");
const DEFAULT_SNAPSHOT: &str = include_str!("../tests/fixtures/photo.json");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let script = match args.first() {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    let snapshot = match args.get(1) {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_SNAPSHOT.to_string(),
    };

    let events: Vec<InputEvent> = serde_json::from_str(&script)?;
    let config = EditorConfig::default();
    let store = Store::from_snapshot(StoreSnapshot::from_json(&snapshot)?, config.max_history)?;
    let mut editor = Editor::with_store(store, config)?;

    for (i, event) in events.into_iter().enumerate() {
        let kind = event.kind();
        if let Err(e) = editor.dispatch(event) {
            eprintln!("event {i} ({kind:?}): {e}");
            continue;
        }
        println!("{i:>3} {kind:?} -> {}", editor.current_path());
    }

    let marks = editor.store().history().marks();
    println!("\nUndo marks: {marks:?}");
    println!("{}", editor.store().snapshot().to_json()?);
    Ok(())
}
