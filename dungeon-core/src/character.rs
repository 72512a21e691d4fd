//! The player and the things they fight.

use crate::economy::Inventory;
use crate::status::{EffectKind, StatusEffects};

/// Starting hit points for a fresh adventurer.
pub const STARTING_HP: i32 = 100;

/// Starting gold for a fresh adventurer.
pub const STARTING_GOLD: i32 = 50;

/// Result of something trying to hurt the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A block charge absorbed the whole attack.
    Blocked { blocks_left: u32 },
    /// The damage went through to hit points.
    Damaged { amount: i32 },
}

impl Hit {
    pub fn message(&self) -> String {
        match self {
            Hit::Blocked { blocks_left } => {
                format!("You blocked the attack! ({blocks_left} blocks left)")
            }
            Hit::Damaged { amount } => format!("You took {amount} damage!"),
        }
    }
}

/// The adventurer.
///
/// Hit points are allowed to go negative; anything at or below zero is dead.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub hp: i32,
    pub gold: i32,
    pub inventory: Inventory,
    pub attack_bonus: i32,
    pub blocks: u32,
    pub status: StatusEffects,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(STARTING_HP, STARTING_GOLD)
    }
}

impl Player {
    pub fn new(hp: i32, gold: i32) -> Self {
        Self {
            hp,
            gold,
            inventory: Inventory::default(),
            attack_bonus: 0,
            blocks: 0,
            status: StatusEffects::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn heal(&mut self, amount: i32) -> String {
        self.hp += amount;
        format!("You healed for {amount} HP.")
    }

    /// Take an incoming attack. A block charge, if any, soaks all of it.
    pub fn take_damage(&mut self, damage: i32) -> Hit {
        if self.blocks > 0 {
            self.blocks -= 1;
            Hit::Blocked {
                blocks_left: self.blocks,
            }
        } else {
            self.hp -= damage;
            Hit::Damaged { amount: damage }
        }
    }
}

/// A signature move an enemy may use on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialAbility {
    pub name: String,
    pub effect: EffectKind,
    pub description: Option<String>,
}

impl SpecialAbility {
    pub fn new(name: impl Into<String>, effect: EffectKind) -> Self {
        Self {
            name: name.into(),
            effect,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The line shown when the ability lands on the player.
    pub fn flavor(&self, user: &str) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => match self.effect {
                EffectKind::Burn => format!("{user} scorches you! You are burning!"),
                EffectKind::Freeze => format!("{user} freezes you solid!"),
            },
        }
    }
}

/// A monster or boss occupying the current room.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub name: String,
    pub description: String,
    pub hp: i32,
    pub atk: i32,
    pub special: Option<SpecialAbility>,
    pub is_boss: bool,
    pub status: StatusEffects,
}

impl Enemy {
    pub fn new(name: impl Into<String>, description: impl Into<String>, hp: i32, atk: i32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            hp,
            atk: atk.max(1),
            special: None,
            is_boss: false,
            status: StatusEffects::new(),
        }
    }

    pub fn with_special(mut self, special: SpecialAbility) -> Self {
        self.special = Some(special);
        self
    }

    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// The two lines that announce the encounter.
    pub fn introduction(&self) -> [String; 2] {
        let headline = if self.is_boss {
            format!("BOSS ENCOUNTER: {}", self.name)
        } else {
            format!("You encounter: {}", self.name)
        };
        [
            headline,
            format!("{} (HP: {}, ATK: {})", self.description, self.hp, self.atk),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_absorbs_whole_hit() {
        let mut player = Player::default();
        player.blocks = 2;

        let hit = player.take_damage(40);
        assert_eq!(hit, Hit::Blocked { blocks_left: 1 });
        assert_eq!(player.hp, STARTING_HP);
        assert_eq!(player.blocks, 1);
        assert_eq!(hit.message(), "You blocked the attack! (1 blocks left)");
    }

    #[test]
    fn test_damage_without_blocks() {
        let mut player = Player::default();
        let hit = player.take_damage(12);
        assert_eq!(hit, Hit::Damaged { amount: 12 });
        assert_eq!(player.hp, STARTING_HP - 12);
        assert_eq!(player.blocks, 0);
    }

    #[test]
    fn test_hp_can_go_negative() {
        let mut player = Player::new(5, 0);
        player.take_damage(9);
        assert_eq!(player.hp, -4);
        assert!(player.is_dead());
    }

    #[test]
    fn test_special_flavor_falls_back() {
        let plain = SpecialAbility::new("Ember", EffectKind::Burn);
        assert_eq!(plain.flavor("Imp"), "Imp scorches you! You are burning!");

        let blank = SpecialAbility::new("Chill", EffectKind::Freeze).with_description("  ");
        assert_eq!(blank.flavor("Wisp"), "Wisp freezes you solid!");

        let told = SpecialAbility::new("Chill", EffectKind::Freeze).with_description("Frost bites!");
        assert_eq!(told.flavor("Wisp"), "Frost bites!");
    }

    #[test]
    fn test_enemy_attack_is_at_least_one() {
        let enemy = Enemy::new("Mote", "A speck of dust", 3, 0);
        assert_eq!(enemy.atk, 1);
    }
}
