//! AI Endless Dungeon - a Bevy front-end for the endless dungeon crawler.
//!
//! Rooms, monsters and bosses are written by Claude when ANTHROPIC_API_KEY is
//! set. Without a key the dungeon falls back to fixed content and stays
//! playable.

mod runtime;
mod state;
mod ui;

use anyhow::Context;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use dungeon_core::GameConfig;

use crate::state::{AppState, GamePhase};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = GameConfig::from_env().context("invalid DUNGEON_* settings")?;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "AI Endless Dungeon".into(),
                        resolution: (1100., 720.).into(),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn,dungeon_core=info,dungeon=info".into(),
                    ..default()
                }),
        )
        .add_plugins(EguiPlugin)
        // App state
        .init_state::<GamePhase>()
        .insert_resource(AppState::new(config))
        // Startup systems
        .add_systems(Startup, setup)
        // Update systems - UI
        .add_systems(Update, (ui::main_ui_system, ui::handle_keyboard_input))
        // Update systems - session worker
        .add_systems(
            Update,
            (state::handle_worker_responses, state::clear_old_status),
        )
        .run();

    Ok(())
}

/// Initial setup system.
fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
