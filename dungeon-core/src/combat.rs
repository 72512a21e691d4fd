//! Turn resolution: the player's strikes and the enemy's answer.

use crate::character::{Enemy, Player};
use crate::provider::{ask, ContentProvider, Prompt};
use crate::status::{EffectKind, BURN_DAMAGE};
use rand::Rng;

/// Rooms that must pass between two special attacks.
pub const SPECIAL_COOLDOWN: i64 = 4;

/// Chance an enemy with a special ability uses it on a given turn.
pub const ENEMY_SPECIAL_CHANCE: f64 = 0.4;

/// Chance that running away works.
pub const FLEE_CHANCE: f64 = 0.5;

/// Damage dealt by a player strike, with the line describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strike {
    pub damage: i32,
    pub message: String,
}

/// A plain attack: 5 to 15 plus the attacker's bonus.
pub fn basic_attack(bonus: i32, target: &mut Enemy, rng: &mut impl Rng) -> Strike {
    let damage = rng.gen_range(5..=15) + bonus;
    target.hp -= damage;
    Strike {
        damage,
        message: format!("You hit the {} for {damage} damage!", target.name),
    }
}

/// A special attack: 8 to 18 plus bonus, leaving `effect` on the target.
pub fn special_attack(
    bonus: i32,
    target: &mut Enemy,
    effect: EffectKind,
    rng: &mut impl Rng,
) -> Strike {
    let damage = rng.gen_range(8..=18) + bonus;
    target.hp -= damage;
    target.status.apply(effect);
    let message = match effect {
        EffectKind::Burn => format!(
            "You unleash a fire blast! The {} takes {damage} damage and is burning!",
            target.name
        ),
        EffectKind::Freeze => format!(
            "You freeze the enemy! The {} takes {damage} damage and may skip actions!",
            target.name
        ),
    };
    Strike { damage, message }
}

/// Tracks the room in which the special attack was last used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCooldown {
    last_used: i64,
}

impl Default for SpecialCooldown {
    fn default() -> Self {
        Self {
            last_used: -SPECIAL_COOLDOWN,
        }
    }
}

impl SpecialCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_used(&self) -> i64 {
        self.last_used
    }

    pub fn ready(&self, room: u32) -> bool {
        self.rooms_remaining(room) == 0
    }

    /// Rooms still to clear before the special is ready.
    pub fn rooms_remaining(&self, room: u32) -> i64 {
        (SPECIAL_COOLDOWN - (room as i64 - self.last_used)).max(0)
    }

    pub fn mark_used(&mut self, room: u32) {
        self.last_used = room as i64;
    }

    pub fn refusal(&self, room: u32) -> String {
        format!(
            "Special attack not ready! {} more room(s) needed",
            self.rooms_remaining(room)
        )
    }
}

/// The enemy's turn.
///
/// A frozen enemy loses the whole turn: it neither attacks, burns nor uses
/// its special. Boss narration is best effort and falls back to a fixed line.
pub fn enemy_attack<P: ContentProvider + ?Sized>(
    enemy: &mut Enemy,
    player: &mut Player,
    rng: &mut impl Rng,
    provider: &mut P,
    call_attempts: u32,
) -> Vec<String> {
    if enemy.status.is_active(EffectKind::Freeze) {
        enemy.status.decrement(EffectKind::Freeze);
        return vec![format!("{} is frozen and skips its turn!", enemy.name)];
    }

    let mut log = Vec::new();

    let damage = rng.gen_range(1..=enemy.atk.max(1));
    log.push(player.take_damage(damage).message());

    if enemy.status.is_active(EffectKind::Burn) {
        enemy.hp -= BURN_DAMAGE;
        log.push(format!("{} is burning! (-{BURN_DAMAGE} HP)", enemy.name));
        if enemy.status.decrement(EffectKind::Burn) {
            log.push(format!("The {} effect wears off.", EffectKind::Burn.name()));
        }
    }

    if let Some(special) = &enemy.special {
        if rng.gen_bool(ENEMY_SPECIAL_CHANCE) {
            player.status.apply(special.effect);
            log.push(special.flavor(&enemy.name));
        }
    }

    if enemy.is_boss {
        let prompt = Prompt::BossAttack {
            name: enemy.name.clone(),
            damage,
        };
        let narration = ask(provider, &prompt, call_attempts)
            .unwrap_or_else(|| format!("{} strikes fiercely for {damage} damage!", enemy.name));
        log.push(narration);
    }

    log
}

/// Try to run away.
pub fn flee(rng: &mut impl Rng) -> bool {
    rng.gen_bool(FLEE_CHANCE)
}
