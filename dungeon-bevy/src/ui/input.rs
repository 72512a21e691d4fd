//! Action bar and key bindings for player commands.

use bevy::prelude::KeyCode;
use bevy_egui::egui;
use dungeon_core::{Action, Mode};

use crate::state::AppState;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Act(Action),
    Quit,
}

/// Map a key to a command for the current mode.
///
/// While exploring, any key that is not a modifier or shortcut walks on.
pub fn command_for_key(key: KeyCode, mode: Mode) -> Option<KeyCommand> {
    match mode {
        Mode::Exploring => (!is_reserved(key)).then_some(KeyCommand::Act(Action::Continue)),
        Mode::Combat => match key {
            KeyCode::KeyA => Some(KeyCommand::Act(Action::Attack)),
            KeyCode::KeyS => Some(KeyCommand::Act(Action::Special)),
            KeyCode::KeyR => Some(KeyCommand::Act(Action::Run)),
            _ => None,
        },
        Mode::Shop | Mode::Inventory | Mode::HpShop => match key {
            KeyCode::Escape => Some(KeyCommand::Act(Action::Close)),
            key => digit(key).map(|n| KeyCommand::Act(Action::Select(n))),
        },
        Mode::GameOver => (key == KeyCode::KeyX).then_some(KeyCommand::Quit),
    }
}

fn digit(key: KeyCode) -> Option<usize> {
    let n = match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        _ => return None,
    };
    Some(n)
}

fn is_reserved(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::ShiftLeft
            | KeyCode::ShiftRight
            | KeyCode::ControlLeft
            | KeyCode::ControlRight
            | KeyCode::AltLeft
            | KeyCode::AltRight
            | KeyCode::SuperLeft
            | KeyCode::SuperRight
            | KeyCode::CapsLock
            | KeyCode::Tab
            | KeyCode::F1
            | KeyCode::F11
    )
}

/// Render the action bar at the bottom of the screen.
pub fn render_action_bar(ctx: &egui::Context, app_state: &mut AppState) {
    let world = &app_state.world;
    let mode = world.mode;
    let special_label = if world.special_ready() {
        "Special (S)".to_string()
    } else {
        format!("Special ({} rooms)", world.special_rooms_left)
    };
    let can_open_menus = matches!(mode, Mode::Exploring | Mode::Combat);

    let mut chosen = None;

    egui::TopBottomPanel::bottom("action_bar")
        .min_height(48.0)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!app_state.is_processing, |ui| {
                    ui.spacing_mut().item_spacing.x = 6.0;

                    match mode {
                        Mode::Exploring => {
                            if ui
                                .button("Continue")
                                .on_hover_text("Any key walks on")
                                .clicked()
                            {
                                chosen = Some(Action::Continue);
                            }
                        }
                        Mode::Combat => {
                            if ui.button("Attack (A)").clicked() {
                                chosen = Some(Action::Attack);
                            }
                            if ui.button(special_label).clicked() {
                                chosen = Some(Action::Special);
                            }
                            if ui.button("Run (R)").clicked() {
                                chosen = Some(Action::Run);
                            }
                        }
                        _ => {}
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);

                    if ui
                        .add_enabled(can_open_menus, egui::Button::new("Open Shop"))
                        .clicked()
                    {
                        chosen = Some(Action::OpenShop);
                    }
                    if ui
                        .add_enabled(can_open_menus, egui::Button::new("Inventory"))
                        .clicked()
                    {
                        chosen = Some(Action::OpenInventory);
                    }
                });
            });
            ui.add_space(6.0);
        });

    if let Some(action) = chosen {
        app_state.send_action(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_key_continues_while_exploring() {
        assert_eq!(
            command_for_key(KeyCode::Space, Mode::Exploring),
            Some(KeyCommand::Act(Action::Continue))
        );
        assert_eq!(
            command_for_key(KeyCode::KeyQ, Mode::Exploring),
            Some(KeyCommand::Act(Action::Continue))
        );
        assert_eq!(command_for_key(KeyCode::ShiftLeft, Mode::Exploring), None);
        assert_eq!(command_for_key(KeyCode::F1, Mode::Exploring), None);
    }

    #[test]
    fn test_combat_keys() {
        assert_eq!(
            command_for_key(KeyCode::KeyA, Mode::Combat),
            Some(KeyCommand::Act(Action::Attack))
        );
        assert_eq!(
            command_for_key(KeyCode::KeyS, Mode::Combat),
            Some(KeyCommand::Act(Action::Special))
        );
        assert_eq!(
            command_for_key(KeyCode::KeyR, Mode::Combat),
            Some(KeyCommand::Act(Action::Run))
        );
        assert_eq!(command_for_key(KeyCode::Space, Mode::Combat), None);
    }

    #[test]
    fn test_menu_keys_select_and_close() {
        assert_eq!(
            command_for_key(KeyCode::Digit3, Mode::Shop),
            Some(KeyCommand::Act(Action::Select(3)))
        );
        assert_eq!(
            command_for_key(KeyCode::Numpad1, Mode::HpShop),
            Some(KeyCommand::Act(Action::Select(1)))
        );
        assert_eq!(
            command_for_key(KeyCode::Escape, Mode::Inventory),
            Some(KeyCommand::Act(Action::Close))
        );
        assert_eq!(command_for_key(KeyCode::Digit0, Mode::Shop), None);
    }

    #[test]
    fn test_only_x_quits_after_death() {
        assert_eq!(
            command_for_key(KeyCode::KeyX, Mode::GameOver),
            Some(KeyCommand::Quit)
        );
        assert_eq!(command_for_key(KeyCode::KeyA, Mode::GameOver), None);
    }
}
