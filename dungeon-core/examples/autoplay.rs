//! Let the autopilot play a run in the terminal.
//!
//! Uses Claude when ANTHROPIC_API_KEY is set, fixed content otherwise.
//!
//! ```text
//! RUST_LOG=dungeon_core=debug cargo run -p dungeon-core --example autoplay -- [seed] [turns]
//! ```

use dungeon_core::{Blocking, ClaudeProvider, ContentProvider, GameConfig, HeadlessGame, OfflineProvider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dungeon_core=info,claude=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(42);
    let turns: usize = args.next().map(|s| s.parse()).transpose()?.unwrap_or(60);

    let config = GameConfig::from_env()?;
    let provider: Box<dyn ContentProvider> = match ClaudeProvider::from_env(&config) {
        Ok(claude) => Box::new(Blocking::new(claude)?),
        Err(err) => {
            tracing::warn!(error = %err, "playing offline");
            Box::new(OfflineProvider)
        }
    };

    let mut game = HeadlessGame::new(provider, config, seed);
    println!("{}", game.session().room_text());
    for line in game.session().log() {
        println!("{line}");
    }

    for _ in 0..turns {
        let action = game.suggest();
        let response = game.act(action);
        println!("\n> {action:?}");
        for line in &response.lines {
            println!("{line}");
        }
        if game.is_over() {
            break;
        }
    }

    println!("\n{}", game.status_line());
    Ok(())
}
