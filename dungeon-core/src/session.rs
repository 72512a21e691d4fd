//! A running game.
//!
//! [`Session`] owns all mutable state and advances it one [`Action`] at a
//! time. Every action is fully resolved, generation calls included, before
//! `handle` returns.

use crate::character::{Enemy, Player};
use crate::combat::{basic_attack, enemy_attack, flee, special_attack, SpecialCooldown};
use crate::config::GameConfig;
use crate::economy::{loot_drop, use_item, HP_TRADES, SHOP_CATALOG};
use crate::encounter::{random_event, EncounterGenerator};
use crate::provider::ContentProvider;
use crate::status::EffectKind;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

/// Log lines shown outside the inventory.
pub const LOG_VIEW: usize = 6;
/// Log lines shown while the inventory is open.
pub const INVENTORY_LOG_VIEW: usize = 12;
/// Gold found in a golden room.
pub const GOLDEN_ROOM_GOLD: i32 = 50;

const GOLDEN_ROOM_CHANCE: f64 = 0.1;
const ENEMY_CHANCE: f64 = 0.7;

/// What the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Exploring,
    Combat,
    Shop,
    Inventory,
    HpShop,
    GameOver,
}

impl Mode {
    /// Whether a menu is covering the room.
    pub fn is_overlay(self) -> bool {
        matches!(self, Mode::Shop | Mode::Inventory | Mode::HpShop)
    }
}

/// One player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Attack,
    Special,
    Run,
    OpenShop,
    OpenInventory,
    /// Pick a menu entry, counting from 1.
    Select(usize),
    Close,
    Restart,
}

/// The whole game state.
pub struct Session<P, R> {
    provider: P,
    rng: R,
    config: GameConfig,
    generator: EncounterGenerator,
    player: Player,
    enemy: Option<Enemy>,
    room: u32,
    room_text: String,
    quest: String,
    log: Vec<String>,
    saved_log: Option<Vec<String>>,
    mode: Mode,
    cooldown: SpecialCooldown,
}

impl<P: ContentProvider, R: Rng> Session<P, R> {
    /// Start a new game. This generates the first room and the quest.
    pub fn new(provider: P, rng: R, mut config: GameConfig) -> Self {
        config.boss_interval = config.boss_interval.max(1);
        let mut session = Self {
            generator: EncounterGenerator::new(&config),
            player: Player::new(config.starting_hp, config.starting_gold),
            provider,
            rng,
            config,
            enemy: None,
            room: 1,
            room_text: String::new(),
            quest: String::new(),
            log: Vec::new(),
            saved_log: None,
            mode: Mode::Exploring,
            cooldown: SpecialCooldown::new(),
        };
        session.start();
        session
    }

    fn start(&mut self) {
        self.player = Player::new(self.config.starting_hp, self.config.starting_gold);
        self.enemy = None;
        self.room = 1;
        self.room_text = self.generator.room_text(&mut self.provider);
        self.quest = self.generator.quest_text(&mut self.provider);
        self.log = vec![format!("Quest: {}", self.quest)];
        self.saved_log = None;
        self.mode = Mode::Exploring;
        self.cooldown = SpecialCooldown::new();
        info!(quest = %self.quest, "new run started");
    }

    /// Apply one action. Returns false if it meant nothing in the current mode.
    pub fn handle(&mut self, action: Action) -> bool {
        debug!(?action, mode = ?self.mode, room = self.room, "handling action");

        let accepted = match (self.mode, action) {
            (Mode::GameOver, Action::Restart) => {
                self.start();
                true
            }
            (Mode::GameOver, _) => false,

            (Mode::Exploring | Mode::Combat, Action::OpenShop) => {
                self.open_shop();
                true
            }
            (Mode::Exploring | Mode::Combat, Action::OpenInventory) => {
                self.open_inventory();
                true
            }

            (Mode::Exploring, Action::Continue) => {
                self.next_room();
                true
            }

            (Mode::Combat, Action::Attack) => {
                self.player_turn(false);
                true
            }
            (Mode::Combat, Action::Special) => {
                self.player_turn(true);
                true
            }
            (Mode::Combat, Action::Run) => {
                self.run();
                true
            }

            (Mode::Shop, Action::Select(n)) => self.buy(n),
            (Mode::Shop, Action::Close) => {
                self.close_overlay("You exit the shop.");
                true
            }

            (Mode::Inventory, Action::Select(n)) => self.use_nth(n),
            (Mode::Inventory, Action::Close) => {
                self.close_overlay("You close the inventory.");
                true
            }

            (Mode::HpShop, Action::Select(n)) => self.trade(n),
            (Mode::HpShop, Action::Close) => self.trade(HP_TRADES.len()),

            _ => false,
        };

        if accepted && self.mode != Mode::GameOver && self.player.is_dead() {
            self.game_over();
        }
        accepted
    }

    /// Put `enemy` in the current room and start fighting it.
    pub fn begin_combat(&mut self, enemy: Enemy) {
        self.log.extend(enemy.introduction());
        info!(enemy = %enemy.name, boss = enemy.is_boss, hp = enemy.hp, atk = enemy.atk, "combat started");
        self.enemy = Some(enemy);
        self.mode = Mode::Combat;
    }

    fn next_room(&mut self) {
        self.room += 1;

        if self.rng.gen_bool(GOLDEN_ROOM_CHANCE) {
            self.room_text = "You find a Golden Room! The walls gleam with treasure!".to_string();
            self.player.gold += GOLDEN_ROOM_GOLD;
            self.log.push(format!(
                "You found a hidden cache and gained {GOLDEN_ROOM_GOLD} gold!"
            ));
            return;
        }

        self.room_text = self.generator.room_text(&mut self.provider);
        if self.room % self.config.boss_interval == 0 {
            let boss = self.generator.boss(&mut self.provider, self.room);
            self.begin_combat(boss);
        } else if self.rng.gen_bool(ENEMY_CHANCE) {
            let enemy = self.generator.enemy(&mut self.provider, self.room);
            self.begin_combat(enemy);
        } else {
            let lines = random_event(&mut self.player, &mut self.rng);
            self.log.extend(lines);
        }
    }

    fn player_turn(&mut self, special: bool) {
        let report = self.player.status.advance(&mut self.player.hp);
        self.log.extend(report.messages());
        if self.player.is_dead() {
            return;
        }

        let Some(enemy) = self.enemy.as_mut() else {
            return;
        };

        if report.frozen() {
            self.log.push("You're frozen and skip this turn!".to_string());
            return;
        }

        if !special {
            let strike = basic_attack(self.player.attack_bonus, enemy, &mut self.rng);
            self.log.push(strike.message);
        } else if self.cooldown.ready(self.room) {
            let effect = *EffectKind::ALL.choose(&mut self.rng).unwrap_or(&EffectKind::Burn);
            let strike = special_attack(self.player.attack_bonus, enemy, effect, &mut self.rng);
            self.cooldown.mark_used(self.room);
            self.log.push(strike.message);
        } else {
            self.log.push(self.cooldown.refusal(self.room));
        }

        self.enemy_turn();
    }

    fn run(&mut self) {
        if flee(&mut self.rng) {
            self.log.push("You successfully ran away!".to_string());
            self.enemy = None;
            self.mode = Mode::Exploring;
        } else {
            self.log.push("You failed to escape!".to_string());
            self.enemy_turn();
        }
    }

    /// The enemy answers if it is still standing; otherwise the fight ends.
    fn enemy_turn(&mut self) {
        let Some(enemy) = self.enemy.as_mut() else {
            return;
        };

        if enemy.is_alive() {
            let lines = enemy_attack(
                enemy,
                &mut self.player,
                &mut self.rng,
                &mut self.provider,
                self.config.call_attempts,
            );
            self.log.extend(lines);
        }

        // Burn may have finished it during its own turn.
        if !enemy.is_alive() {
            self.enemy_defeated();
        }
    }

    fn enemy_defeated(&mut self) {
        let Some(enemy) = self.enemy.take() else {
            return;
        };
        info!(enemy = %enemy.name, room = self.room, "enemy defeated");
        self.log.push(format!("The {} is defeated!", enemy.name));
        let loot = loot_drop(&mut self.player, &mut self.rng);
        self.log.push(loot);

        if enemy.is_boss {
            self.log.push("A shadowy shopkeeper appears...".to_string());
            self.log.push("Trade your health for power.".to_string());
            self.mode = Mode::HpShop;
        } else {
            self.mode = Mode::Exploring;
        }
    }

    fn open_shop(&mut self) {
        self.saved_log = Some(self.log.clone());
        self.log.push("Welcome to the Dungeon Shop!".to_string());
        self.log.push(format!("You have {} gold.", self.player.gold));
        self.mode = Mode::Shop;
    }

    fn open_inventory(&mut self) {
        self.saved_log = Some(self.log.clone());
        self.log.extend(self.player.inventory.listing());
        self.mode = Mode::Inventory;
    }

    fn close_overlay(&mut self, farewell: &str) {
        if let Some(saved) = self.saved_log.take() {
            self.log = saved;
        }
        self.log.push(farewell.to_string());
        self.mode = self.resume_mode();
    }

    fn resume_mode(&self) -> Mode {
        if self.enemy.is_some() {
            Mode::Combat
        } else {
            Mode::Exploring
        }
    }

    fn buy(&mut self, n: usize) -> bool {
        let Some(&item) = n.checked_sub(1).and_then(|i| SHOP_CATALOG.get(i)) else {
            return false;
        };
        let purchase = self.player.buy(item, item.cost());
        self.log.push(purchase.message());
        true
    }

    fn use_nth(&mut self, n: usize) -> bool {
        let Some(item) = n.checked_sub(1).and_then(|i| self.player.inventory.nth(i)) else {
            return false;
        };
        let lines = use_item(
            &mut self.player,
            item,
            &mut self.rng,
            &mut self.provider,
            self.config.call_attempts,
        );
        self.log.extend(lines);
        self.log.extend(self.player.inventory.listing());
        true
    }

    fn trade(&mut self, n: usize) -> bool {
        let Some(&trade) = n.checked_sub(1).and_then(|i| HP_TRADES.get(i)) else {
            return false;
        };
        let message = self.player.trade_hp(trade);
        self.log.push(message);
        self.mode = Mode::Exploring;
        true
    }

    fn game_over(&mut self) {
        info!(room = self.room, "player died");
        self.saved_log = None;
        self.mode = Mode::GameOver;
        self.log.push("Game over...".to_string());
        let epitaph = self.generator.death_text(&mut self.provider, self.room);
        self.log.push(epitaph);
    }
}

impl<P, R> Session<P, R> {
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Direct access to the player, for scripted setups.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.enemy.as_ref()
    }

    pub fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        self.enemy.as_mut()
    }

    pub fn room(&self) -> u32 {
        self.room
    }

    pub fn room_text(&self) -> &str {
        &self.room_text
    }

    pub fn quest(&self) -> &str {
        &self.quest
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn cooldown(&self) -> &SpecialCooldown {
        &self.cooldown
    }

    pub fn special_ready(&self) -> bool {
        self.cooldown.ready(self.room)
    }

    pub fn generator(&self) -> &EncounterGenerator {
        &self.generator
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Every line logged since the run started or the last overlay closed.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// The tail of the log that fits on screen.
    pub fn visible_log(&self) -> &[String] {
        let lines = if self.mode == Mode::Inventory {
            INVENTORY_LOG_VIEW
        } else {
            LOG_VIEW
        };
        &self.log[self.log.len().saturating_sub(lines)..]
    }

    pub fn last_line(&self) -> Option<&str> {
        self.log.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::ItemKind;
    use crate::testing::ScriptedProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(seed: u64) -> Session<ScriptedProvider, StdRng> {
        Session::new(
            ScriptedProvider::new(),
            StdRng::seed_from_u64(seed),
            GameConfig::default(),
        )
    }

    #[test]
    fn test_new_session() {
        let provider = ScriptedProvider::new()
            .then_text("A mossy vault.")
            .then_text("Recover the Ember Crown.");
        let session = Session::new(provider, StdRng::seed_from_u64(0), GameConfig::default());

        assert_eq!(session.room(), 1);
        assert_eq!(session.mode(), Mode::Exploring);
        assert_eq!(session.room_text(), "A mossy vault.");
        assert_eq!(session.log(), ["Quest: Recover the Ember Crown.".to_string()]);
        assert_eq!(session.player().hp, 100);
        assert_eq!(session.player().gold, 50);
        assert!(session.special_ready());
    }

    #[test]
    fn test_combat_actions_ignored_while_exploring() {
        let mut session = session(1);
        assert!(!session.handle(Action::Attack));
        assert!(!session.handle(Action::Run));
        assert!(!session.handle(Action::Select(1)));
        assert!(!session.handle(Action::Restart));
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn test_continue_advances_room() {
        let mut session = session(2);
        assert!(session.handle(Action::Continue));
        assert_eq!(session.room(), 2);
        assert!(session.log().len() > 1);
    }

    #[test]
    fn test_shop_restores_log() {
        let mut session = session(3);
        let before = session.log().to_vec();

        assert!(session.handle(Action::OpenShop));
        assert_eq!(session.mode(), Mode::Shop);
        assert_eq!(session.last_line(), Some("You have 50 gold."));
        assert!(!session.handle(Action::OpenInventory));

        session.handle(Action::Select(1));
        assert_eq!(session.last_line(), Some("You bought Healing Potion for 10 gold."));
        assert!(!session.handle(Action::Select(9)));

        session.handle(Action::Close);
        assert_eq!(session.mode(), Mode::Exploring);
        assert_eq!(&session.log()[..before.len()], &before[..]);
        assert_eq!(session.last_line(), Some("You exit the shop."));
        assert_eq!(session.player().inventory.count(ItemKind::HealingPotion), 1);
        assert_eq!(session.player().gold, 40);
    }

    #[test]
    fn test_inventory_uses_items() {
        let mut session = session(4);
        session.player_mut().hp = 50;
        session.player_mut().inventory.add(ItemKind::HealingPotion);

        session.handle(Action::OpenInventory);
        assert_eq!(session.last_line(), Some("[1] Healing Potion"));
        session.handle(Action::Select(1));
        assert_eq!(session.player().hp, 70);
        assert_eq!(session.last_line(), Some("Inventory is empty."));
        assert!(!session.handle(Action::Select(1)));

        session.handle(Action::Close);
        assert_eq!(session.last_line(), Some("You close the inventory."));
    }

    #[test]
    fn test_visible_log_window() {
        let mut session = session(5);
        for n in 0..20 {
            session.log.push(format!("line {n}"));
        }
        assert_eq!(session.visible_log().len(), LOG_VIEW);
        assert_eq!(session.visible_log()[5], "line 19");

        session.handle(Action::OpenInventory);
        assert_eq!(session.visible_log().len(), INVENTORY_LOG_VIEW);
    }

    #[test]
    fn test_boss_every_tenth_room() {
        let mut session = session(6);
        session.room = 9;
        // A golden room takes precedence over the boss
        session.handle(Action::Continue);
        assert_eq!(session.room(), 10);
        if session.mode() == Mode::Combat {
            let boss = session.enemy().unwrap();
            assert!(boss.is_boss);
            assert_eq!(boss.name, "Flame Wraith");
        } else {
            assert_eq!(session.player().gold, 50 + GOLDEN_ROOM_GOLD);
        }
    }

    #[test]
    fn test_game_over_only_accepts_restart() {
        let mut session = session(7);
        session.player_mut().hp = 1;
        session.player_mut().status.apply(EffectKind::Burn);
        session.begin_combat(Enemy::new("Rat", "Just a rat.", 5, 1));

        session.handle(Action::Attack);
        assert_eq!(session.mode(), Mode::GameOver);
        let n = session.log().len();
        assert_eq!(session.log()[n - 2], "Game over...");
        assert_eq!(
            session.log()[n - 1],
            crate::encounter::FALLBACK_DEATH
        );

        assert!(!session.handle(Action::Continue));
        assert!(!session.handle(Action::OpenShop));
        assert!(session.handle(Action::Restart));
        assert_eq!(session.mode(), Mode::Exploring);
        assert_eq!(session.player().hp, 100);
        assert_eq!(session.room(), 1);
        assert!(session.enemy().is_none());
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn test_seen_names_survive_restart() {
        let mut session = session(8);
        session
            .provider
            .push_text(crate::testing::monster_json("Mire Lurker", 30, 8));
        let enemy = session.generator.enemy(&mut session.provider, 3);
        assert_eq!(enemy.name, "Mire Lurker");

        session.player_mut().hp = 0;
        session.game_over();
        session.handle(Action::Restart);

        assert!(session.generator().has_seen("Mire Lurker"));
    }
}
