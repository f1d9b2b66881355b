//! Headless session: drops a handful of fruits and prints HUD snapshots.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example headless_run
//! ```

use fruitbox_game::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut game = GameCore::new(PlayfieldConfig::classic(), Box::new(PcgRankSource::new(7)));
    game.set_state_listener(Box::new(|state| {
        println!("-- state: {state:?}");
    }));

    game.init();
    game.press_start();

    let center = game.config().game_width / 2.0;
    for i in 0..10 {
        game.pointer_move(center + f64::from(i - 5) * 20.0);
        game.request_drop();
        for _ in 0..60 {
            game.step();
        }
        match serde_json::to_string(&game.hud()) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("hud serialization failed: {err}"),
        }
        if game.state() == GameState::Gameover {
            break;
        }
    }
}
