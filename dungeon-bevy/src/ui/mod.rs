//! UI module - egui-based interface panels.

mod input;
mod overlays;
mod panels;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use dungeon_core::Mode;

use crate::state::{ActiveOverlay, AppState, GamePhase};

use input::{command_for_key, KeyCommand};

/// Main UI system - renders all egui panels.
pub fn main_ui_system(
    mut contexts: EguiContexts,
    mut app_state: ResMut<AppState>,
    game_phase: Res<State<GamePhase>>,
    mut next_phase: ResMut<NextState<GamePhase>>,
) {
    let ctx = contexts.ctx_mut();

    configure_style(ctx);

    match game_phase.get() {
        GamePhase::MainMenu => {
            panels::render_main_menu(ctx, &mut next_phase, &mut app_state);
        }
        GamePhase::Playing => {
            // Side and top/bottom panels claim space before the CentralPanel
            panels::render_top_bar(ctx, &mut app_state);
            panels::render_status_panel(ctx, &app_state);
            input::render_action_bar(ctx, &mut app_state);
            panels::render_room_panel(ctx, &app_state);
            panels::render_combat_panel(ctx, &app_state);

            match app_state.world.mode {
                Mode::Shop => overlays::render_shop(ctx, &mut app_state),
                Mode::Inventory => overlays::render_inventory(ctx, &mut app_state),
                Mode::HpShop => overlays::render_hp_shop(ctx, &mut app_state),
                Mode::GameOver => overlays::render_game_over(ctx, &mut app_state),
                Mode::Exploring | Mode::Combat => {}
            }

            if app_state.overlay == ActiveOverlay::Help {
                overlays::render_help(ctx);
            }
        }
    }

    if app_state.error_message.is_some() {
        render_error_popup(ctx, &mut app_state);
    }
}

/// Configure egui visual style.
fn configure_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    use egui::{FontId, TextStyle};
    style.text_styles = [
        (TextStyle::Small, FontId::proportional(14.0)),
        (TextStyle::Body, FontId::proportional(16.0)),
        (TextStyle::Monospace, FontId::monospace(15.0)),
        (TextStyle::Button, FontId::proportional(16.0)),
        (TextStyle::Heading, FontId::proportional(22.0)),
    ]
    .into();

    // Torchlit stone
    let visuals = &mut style.visuals;
    visuals.dark_mode = true;
    visuals.override_text_color = Some(egui::Color32::from_rgb(230, 220, 200));
    visuals.window_fill = egui::Color32::from_rgb(28, 24, 22);
    visuals.panel_fill = egui::Color32::from_rgb(36, 32, 30);
    visuals.faint_bg_color = egui::Color32::from_rgb(48, 44, 40);
    visuals.extreme_bg_color = egui::Color32::from_rgb(18, 14, 12);

    visuals.selection.bg_fill = egui::Color32::from_rgb(150, 60, 20);
    visuals.hyperlink_color = egui::Color32::from_rgb(218, 165, 32);

    visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(45, 40, 35);
    visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(55, 50, 45);

    visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(90, 70, 45);
    visuals.widgets.hovered.bg_stroke =
        egui::Stroke::new(1.0, egui::Color32::from_rgb(218, 165, 32));
    visuals.widgets.hovered.expansion = 1.0;

    visuals.widgets.active.bg_fill = egui::Color32::from_rgb(150, 60, 20);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 140, 0));

    ctx.set_style(style);
}

/// Render error popup.
fn render_error_popup(ctx: &egui::Context, app_state: &mut AppState) {
    let mut open = true;

    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                if let Some(ref msg) = app_state.error_message {
                    ui.colored_label(egui::Color32::RED, msg);
                }
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    app_state.error_message = None;
                }
            });
        });

    if !open {
        app_state.error_message = None;
    }
}

/// Handle keyboard input for game commands and shortcuts.
pub fn handle_keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut app_state: ResMut<AppState>,
    game_phase: Res<State<GamePhase>>,
) {
    // Ctrl+Q / Cmd+Q to quit (works anywhere)
    let ctrl_pressed = keys.pressed(KeyCode::ControlLeft)
        || keys.pressed(KeyCode::ControlRight)
        || keys.pressed(KeyCode::SuperLeft)
        || keys.pressed(KeyCode::SuperRight);

    if ctrl_pressed && keys.just_pressed(KeyCode::KeyQ) {
        std::process::exit(0);
    }

    if *game_phase.get() != GamePhase::Playing {
        return;
    }

    if keys.just_pressed(KeyCode::F1) {
        app_state.toggle_overlay(ActiveOverlay::Help);
        return;
    }
    if app_state.overlay == ActiveOverlay::Help {
        if keys.just_pressed(KeyCode::Escape) {
            app_state.overlay = ActiveOverlay::None;
        }
        return;
    }

    if ctrl_pressed || app_state.is_processing || !app_state.has_session() {
        return;
    }

    let mode = app_state.world.mode;
    let command = keys
        .get_just_pressed()
        .find_map(|key| command_for_key(*key, mode));

    match command {
        Some(KeyCommand::Act(action)) => app_state.send_action(action),
        Some(KeyCommand::Quit) => std::process::exit(0),
        None => {}
    }
}
