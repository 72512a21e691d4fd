//! Menu windows for the shop, the inventory, the HP trader and help.
//!
//! Shop, inventory and trader follow the session's mode: the worker opens
//! them and a click sends back a numbered selection.

use bevy_egui::egui;
use dungeon_core::economy::{HP_TRADES, SHOP_CATALOG};
use dungeon_core::Action;

use crate::state::{AppState, WorldUpdate};

const GOLD: egui::Color32 = egui::Color32::from_rgb(218, 165, 32);
const BLOOD: egui::Color32 = egui::Color32::from_rgb(180, 30, 30);

fn menu_window(title: &str, ctx: &egui::Context, add_contents: impl FnOnce(&mut egui::Ui)) {
    let screen = ctx.screen_rect();
    let width = (screen.width() * 0.8).clamp(300.0, 440.0);

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(width)
        .show(ctx, add_contents);
}

/// The latest message from the session, shown under a menu.
fn last_message(ui: &mut egui::Ui, world: &WorldUpdate) {
    if let Some(line) = world.log.last() {
        ui.separator();
        ui.label(egui::RichText::new(line).italics());
    }
}

fn close_hint(ui: &mut egui::Ui) {
    ui.label(
        egui::RichText::new("Press a number to choose, Escape to close")
            .small()
            .color(egui::Color32::GRAY),
    );
}

/// Render the shop.
pub fn render_shop(ctx: &egui::Context, app_state: &mut AppState) {
    let world = &app_state.world;
    let gold = world.gold;
    let enabled = !app_state.is_processing;
    let mut chosen = None;

    menu_window("Dungeon Shop", ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label("Gold:");
            ui.label(egui::RichText::new(gold.to_string()).color(GOLD).strong());
        });
        ui.separator();

        egui::Grid::new("shop_items")
            .num_columns(3)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (index, item) in SHOP_CATALOG.iter().enumerate() {
                    let affordable = gold >= item.cost();
                    let label = format!("[{}] {}", index + 1, item);
                    if ui
                        .add_enabled(enabled, egui::Button::new(label))
                        .on_hover_text(item.description())
                        .clicked()
                    {
                        chosen = Some(Action::Select(index + 1));
                    }
                    let price = egui::RichText::new(format!("{} gold", item.cost()));
                    ui.label(if affordable {
                        price.color(GOLD)
                    } else {
                        price.color(egui::Color32::GRAY)
                    });
                    ui.label(egui::RichText::new(item.description()).small());
                    ui.end_row();
                }
            });

        last_message(ui, world);
        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(enabled, egui::Button::new("Close")).clicked() {
                chosen = Some(Action::Close);
            }
            close_hint(ui);
        });
    });

    if let Some(action) = chosen {
        app_state.send_action(action);
    }
}

/// Render the inventory.
pub fn render_inventory(ctx: &egui::Context, app_state: &mut AppState) {
    let world = &app_state.world;
    let enabled = !app_state.is_processing;
    let mut chosen = None;

    menu_window("Inventory", ctx, |ui| {
        if world.inventory.is_empty() {
            ui.label(egui::RichText::new("Inventory is empty.").italics());
        } else {
            for (index, (item, count)) in world.inventory.iter().enumerate() {
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(enabled, egui::Button::new(format!("[{}] Use", index + 1)))
                        .clicked()
                    {
                        chosen = Some(Action::Select(index + 1));
                    }
                    ui.label(format!("{item} x{count}"));
                    ui.label(
                        egui::RichText::new(item.description())
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                });
            }
        }

        last_message(ui, world);
        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(enabled, egui::Button::new("Close")).clicked() {
                chosen = Some(Action::Close);
            }
            close_hint(ui);
        });
    });

    if let Some(action) = chosen {
        app_state.send_action(action);
    }
}

/// Render the shadowy shopkeeper's offers.
pub fn render_hp_shop(ctx: &egui::Context, app_state: &mut AppState) {
    let world = &app_state.world;
    let hp = world.hp;
    let enabled = !app_state.is_processing;
    let mut chosen = None;

    menu_window("A Shadowy Shopkeeper", ctx, |ui| {
        ui.label(
            egui::RichText::new("Trade your health for power.")
                .italics()
                .color(BLOOD),
        );
        ui.label(format!("You have {hp} HP."));
        ui.separator();

        for (index, trade) in HP_TRADES.iter().enumerate() {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(
                        enabled,
                        egui::Button::new(format!("[{}] {}", index + 1, trade.name())),
                    )
                    .clicked()
                {
                    chosen = Some(Action::Select(index + 1));
                }
                ui.label(egui::RichText::new(trade.description()).small());
            });
        }

        last_message(ui, world);
    });

    if let Some(action) = chosen {
        app_state.send_action(action);
    }
}

/// Render the game over banner.
pub fn render_game_over(ctx: &egui::Context, app_state: &mut AppState) {
    let enabled = !app_state.is_processing;
    let mut restart = false;

    egui::Window::new("Game Over")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.heading(egui::RichText::new("Game Over").size(40.0).color(BLOOD));
                ui.add_space(10.0);
                ui.label(format!("You fell in room {}.", app_state.world.room));
                ui.add_space(20.0);

                ui.horizontal(|ui| {
                    if ui.add_enabled(enabled, egui::Button::new("Restart")).clicked() {
                        restart = true;
                    }
                    if ui.button("Quit (X)").clicked() {
                        std::process::exit(0);
                    }
                });
                ui.add_space(10.0);
            });
        });

    if restart {
        app_state.send_action(Action::Restart);
    }
}

/// Render the help overlay.
pub fn render_help(ctx: &egui::Context) {
    let screen = ctx.screen_rect();
    let width = (screen.width() * 0.8).clamp(300.0, 450.0);

    egui::Window::new("Help")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(width)
        .show(ctx, |ui| {
            ui.heading("AI Endless Dungeon");
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("How to Play");
                ui.label("Walk from room to room. Most rooms hold a monster.");
                ui.label("Every tenth room holds a boss. Beat it to meet the shopkeeper.");
                ui.label("Gold buys potions, pills, shields and attack buffs.");
                ui.add_space(10.0);

                let section = |ui: &mut egui::Ui, title: &str| {
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new(title).strong().color(GOLD));
                };
                let row = |ui: &mut egui::Ui, key: &str, what: &str| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(key).strong());
                        ui.label(format!("- {what}"));
                    });
                };

                section(ui, "Exploring:");
                row(ui, "Any key", "Next room");
                section(ui, "Combat:");
                row(ui, "A", "Attack");
                row(ui, "S", "Special attack (burns or freezes, every 4 rooms)");
                row(ui, "R", "Try to run away");
                section(ui, "Menus:");
                row(ui, "1-9", "Choose an entry");
                row(ui, "Escape", "Close");
                section(ui, "Anywhere:");
                row(ui, "F1", "Help (this screen)");
                row(ui, "Ctrl+Q / Cmd+Q", "Quit");
                row(ui, "X", "Quit after dying");

                ui.add_space(10.0);
                ui.heading("Status Effects");
                ui.label("Burn deals 5 damage a turn for 3 turns.");
                ui.label("Freeze skips the victim's attacks for 2 turns.");
            });

            ui.separator();
            ui.label(
                egui::RichText::new("Press F1 or Escape to close")
                    .small()
                    .color(egui::Color32::GRAY),
            );
        });
}
