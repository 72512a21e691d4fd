//! Main UI panels for the game interface.

use bevy::prelude::*;
use bevy_egui::egui;
use dungeon_core::EffectKind;

use crate::state::{ActiveOverlay, AppState, GamePhase};

const GOLD: egui::Color32 = egui::Color32::from_rgb(218, 165, 32);
const EMBER: egui::Color32 = egui::Color32::from_rgb(255, 120, 40);
const FROST: egui::Color32 = egui::Color32::from_rgb(140, 200, 255);

fn effect_color(effect: EffectKind) -> egui::Color32 {
    match effect {
        EffectKind::Burn => EMBER,
        EffectKind::Freeze => FROST,
    }
}

fn hp_color(hp: i32, full: i32) -> egui::Color32 {
    if hp * 2 > full {
        egui::Color32::GREEN
    } else if hp * 5 > full {
        egui::Color32::YELLOW
    } else {
        egui::Color32::RED
    }
}

/// Render the main menu screen.
pub fn render_main_menu(
    ctx: &egui::Context,
    next_phase: &mut NextState<GamePhase>,
    app_state: &mut AppState,
) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading(
                egui::RichText::new("AI Endless Dungeon")
                    .size(48.0)
                    .color(GOLD),
            );

            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Every room is new. None of them are safe.")
                    .size(18.0)
                    .italics(),
            );

            ui.add_space(60.0);

            let button_size = egui::vec2(200.0, 40.0);

            if ui
                .add_sized(button_size, egui::Button::new("Enter the Dungeon"))
                .clicked()
            {
                app_state.start_session();
                next_phase.set(GamePhase::Playing);
            }

            ui.add_space(10.0);

            if ui
                .add_sized(button_size, egui::Button::new("Quit"))
                .clicked()
            {
                std::process::exit(0);
            }

            ui.add_space(40.0);

            ui.label(
                egui::RichText::new(&app_state.narrator)
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );
            ui.label(
                egui::RichText::new("Cmd+Q / Ctrl+Q to quit")
                    .size(12.0)
                    .color(egui::Color32::GRAY),
            );
        });
    });
}

/// Render the top bar with the room counter and status.
pub fn render_top_bar(ctx: &egui::Context, app_state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(
                egui::RichText::new(format!("Room {}", app_state.world.room)).color(GOLD),
            );

            ui.separator();

            let quest = if app_state.world.quest.is_empty() {
                "..."
            } else {
                app_state.world.quest.as_str()
            };
            ui.label(egui::RichText::new(format!("Quest: {quest}")).italics());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                if ui.button("?").on_hover_text("Help (F1)").clicked() {
                    app_state.toggle_overlay(ActiveOverlay::Help);
                }

                ui.add_space(10.0);

                if let Some(ref status) = app_state.status_message {
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgba_unmultiplied(218, 165, 32, 40))
                        .inner_margin(egui::Margin::symmetric(6.0, 2.0))
                        .rounding(egui::Rounding::same(3.0))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(status)
                                    .color(egui::Color32::from_rgb(255, 215, 0))
                                    .strong(),
                            );
                        });
                }

                if app_state.is_processing {
                    ui.spinner();
                }
            });
        });
    });
}

/// Render the player's stats on the left.
pub fn render_status_panel(ctx: &egui::Context, app_state: &AppState) {
    let world = &app_state.world;
    let full = app_state.config.starting_hp.max(1);

    egui::SidePanel::left("status_panel")
        .resizable(false)
        .default_width(190.0)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Adventurer");
            ui.separator();

            egui::Grid::new("player_stats")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("HP");
                    ui.label(
                        egui::RichText::new(world.hp.to_string())
                            .color(hp_color(world.hp, full))
                            .strong(),
                    );
                    ui.end_row();

                    ui.label("Gold");
                    ui.label(egui::RichText::new(world.gold.to_string()).color(GOLD));
                    ui.end_row();

                    ui.label("Attack bonus");
                    ui.label(format!("+{}", world.attack_bonus));
                    ui.end_row();

                    ui.label("Blocks");
                    ui.label(world.blocks.to_string());
                    ui.end_row();
                });

            ui.add_space(8.0);
            if world.special_ready() {
                ui.label(egui::RichText::new("Special attack ready").color(EMBER));
            } else {
                ui.label(
                    egui::RichText::new(format!(
                        "Special ready in {} room(s)",
                        world.special_rooms_left
                    ))
                    .color(egui::Color32::GRAY),
                );
            }

            if !world.effects.is_empty() {
                ui.add_space(8.0);
                ui.label(egui::RichText::new("Afflicted by").strong());
                for (effect, turns) in &world.effects {
                    ui.label(
                        egui::RichText::new(format!("{} ({turns} turns)", effect.name()))
                            .color(effect_color(*effect)),
                    );
                }
            }

            ui.add_space(8.0);
            ui.separator();
            ui.label(egui::RichText::new("Pack").strong());
            if world.inventory.is_empty() {
                ui.label(egui::RichText::new("Empty").italics().color(egui::Color32::GRAY));
            }
            for (item, count) in &world.inventory {
                ui.label(format!("{item} x{count}"));
            }
        });
}

/// Render the room description and the log (main area).
pub fn render_room_panel(ctx: &egui::Context, app_state: &AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let world = &app_state.world;

        if world.room_text.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label(egui::RichText::new("The dungeon takes shape...").italics());
            });
            return;
        }

        ui.add_space(6.0);
        ui.add(
            egui::Label::new(egui::RichText::new(&world.room_text).size(18.0).italics()).wrap(),
        );
        ui.add_space(12.0);
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &world.log {
                    let color = if line.starts_with("Quest:") {
                        GOLD
                    } else if line.contains("burn") || line.contains("flames") {
                        EMBER
                    } else if line.contains("froze") || line.contains("frozen") {
                        FROST
                    } else {
                        egui::Color32::from_rgb(230, 220, 200)
                    };
                    ui.add(egui::Label::new(egui::RichText::new(line).color(color)).wrap());
                    ui.add_space(4.0);
                }
            });
    });
}

/// Render the enemy window (shows while an enemy is present).
pub fn render_combat_panel(ctx: &egui::Context, app_state: &AppState) {
    let Some(ref enemy) = app_state.world.enemy else {
        return;
    };

    let screen = ctx.screen_rect();
    let width = (screen.width() * 0.3).clamp(180.0, 280.0);
    let title = if enemy.is_boss { "Boss" } else { "Enemy" };

    egui::Window::new(title)
        .collapsible(true)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 50.0])
        .default_width(width)
        .show(ctx, |ui| {
            let name_color = if enemy.is_boss {
                egui::Color32::from_rgb(200, 60, 200)
            } else {
                egui::Color32::RED
            };
            ui.label(egui::RichText::new(&enemy.name).color(name_color).strong().size(20.0));
            ui.add(
                egui::Label::new(
                    egui::RichText::new(&enemy.description)
                        .small()
                        .italics()
                        .color(egui::Color32::GRAY),
                )
                .wrap(),
            );
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("HP");
                ui.label(egui::RichText::new(enemy.hp.to_string()).strong());
                ui.add_space(12.0);
                ui.label("ATK");
                ui.label(egui::RichText::new(enemy.atk.to_string()).strong());
            });

            if let Some((ref name, effect)) = enemy.special {
                ui.label(
                    egui::RichText::new(format!("Special: {name} ({})", effect.name()))
                        .color(effect_color(effect)),
                );
            }

            for (effect, turns) in &enemy.effects {
                ui.label(
                    egui::RichText::new(format!("{} ({turns} turns)", effect.name()))
                        .color(effect_color(*effect))
                        .small(),
                );
            }
        });
}
