//! Gold, items, the shop and the post-boss HP trader.

use crate::character::Player;
use crate::provider::{ask, ContentProvider, Prompt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// Hit points restored by a Healing Potion.
pub const POTION_HEAL: i32 = 20;
/// Block charges granted by a Shield.
pub const SHIELD_BLOCKS: u32 = 2;
/// Attack bonus granted by an Attack Buff.
pub const ATTACK_BUFF_BONUS: i32 = 5;

/// Everything the shop sells, in menu order.
pub const SHOP_CATALOG: [ItemKind; 4] = [
    ItemKind::HealingPotion,
    ItemKind::AttackBuff,
    ItemKind::MysteriousPill,
    ItemKind::Shield,
];

/// Items that can turn up as loot.
pub const LOOT_TABLE: [ItemKind; 3] = [
    ItemKind::HealingPotion,
    ItemKind::MysteriousPill,
    ItemKind::Shield,
];

/// Offers made by the shadowy shopkeeper after a boss falls, in menu order.
pub const HP_TRADES: [HpTrade; 4] = [
    HpTrade::CursedBlade,
    HpTrade::SoulShield,
    HpTrade::BloodElixir,
    HpTrade::Leave,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    HealingPotion,
    AttackBuff,
    MysteriousPill,
    Shield,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::HealingPotion => "Healing Potion",
            ItemKind::AttackBuff => "Attack Buff",
            ItemKind::MysteriousPill => "Mysterious Pill",
            ItemKind::Shield => "Shield",
        }
    }

    /// Shop price in gold.
    pub fn cost(self) -> i32 {
        match self {
            ItemKind::HealingPotion => 10,
            ItemKind::AttackBuff => 25,
            ItemKind::MysteriousPill => 15,
            ItemKind::Shield => 20,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ItemKind::HealingPotion => "Restores 20 HP",
            ItemKind::AttackBuff => "+5 ATK",
            ItemKind::MysteriousPill => "???",
            ItemKind::Shield => "Grants 2 temporary blocks from damage",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Item counts. An item is only listed while its count is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    pub fn add(&mut self, item: ItemKind) {
        *self.counts.entry(item).or_insert(0) += 1;
    }

    /// Remove one of `item`. Returns false if there was none.
    pub fn take(&mut self, item: ItemKind) -> bool {
        let Some(count) = self.counts.get_mut(&item) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&item);
        }
        true
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.counts.iter().map(|(item, count)| (*item, *count))
    }

    /// The item shown at a 0-based position of the listing.
    pub fn nth(&self, index: usize) -> Option<ItemKind> {
        self.counts.keys().nth(index).copied()
    }

    /// Numbered lines as the inventory screen shows them.
    pub fn listing(&self) -> Vec<String> {
        if self.is_empty() {
            return vec!["Inventory is empty.".to_string()];
        }
        let mut lines = vec!["Inventory:".to_string()];
        lines.extend(self.iter().enumerate().map(|(i, (item, count))| {
            if count > 1 {
                format!("[{}] {item} x{count}", i + 1)
            } else {
                format!("[{}] {item}", i + 1)
            }
        }));
        lines
    }
}

/// Outcome of a shop purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Bought { item: ItemKind, cost: i32 },
    NotEnoughGold { item: ItemKind, cost: i32 },
}

impl Purchase {
    pub fn succeeded(&self) -> bool {
        matches!(self, Purchase::Bought { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Purchase::Bought {
                item: ItemKind::AttackBuff,
                cost,
            } => format!("You bought Attack Buff for {cost} gold. Attack +{ATTACK_BUFF_BONUS}!"),
            Purchase::Bought { item, cost } => format!("You bought {item} for {cost} gold."),
            Purchase::NotEnoughGold { .. } => "Not enough gold.".to_string(),
        }
    }
}

impl Player {
    /// Pay `cost` for `item`. Nothing changes when gold is short.
    pub fn buy(&mut self, item: ItemKind, cost: i32) -> Purchase {
        if self.gold < cost {
            return Purchase::NotEnoughGold { item, cost };
        }
        self.gold -= cost;
        match item {
            ItemKind::AttackBuff => self.attack_bonus += ATTACK_BUFF_BONUS,
            other => self.inventory.add(other),
        }
        Purchase::Bought { item, cost }
    }
}

/// Whether a Mysterious Pill helps or hurts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillOutcome {
    Good,
    Bad,
}

/// Which stat a Mysterious Pill touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillStat {
    Hp,
    Atk,
    Block,
}

impl PillStat {
    pub fn name(self) -> &'static str {
        match self {
            PillStat::Hp => "hp",
            PillStat::Atk => "atk",
            PillStat::Block => "block",
        }
    }
}

/// Roll and apply a pill's effect. Returns what was rolled.
pub fn swallow_pill(player: &mut Player, rng: &mut impl Rng) -> (PillOutcome, PillStat) {
    let outcome = *[PillOutcome::Good, PillOutcome::Bad]
        .choose(rng)
        .unwrap_or(&PillOutcome::Good);
    let stat = *[PillStat::Hp, PillStat::Atk, PillStat::Block]
        .choose(rng)
        .unwrap_or(&PillStat::Hp);

    match (outcome, stat) {
        (PillOutcome::Good, PillStat::Hp) => player.hp += rng.gen_range(10..=20),
        (PillOutcome::Good, PillStat::Atk) => player.attack_bonus += ATTACK_BUFF_BONUS,
        (PillOutcome::Good, PillStat::Block) => player.blocks += SHIELD_BLOCKS,
        (PillOutcome::Bad, PillStat::Hp) => player.hp -= rng.gen_range(5..=15),
        (PillOutcome::Bad, PillStat::Atk) => {
            if player.attack_bonus > 0 {
                player.attack_bonus -= ATTACK_BUFF_BONUS;
            }
        }
        (PillOutcome::Bad, PillStat::Block) => player.blocks = player.blocks.saturating_sub(1),
    }

    (outcome, stat)
}

/// Consume one `item` and apply it.
///
/// Only the Mysterious Pill talks to the provider, and only for flavor.
pub fn use_item<P: ContentProvider + ?Sized>(
    player: &mut Player,
    item: ItemKind,
    rng: &mut impl Rng,
    provider: &mut P,
    call_attempts: u32,
) -> Vec<String> {
    if !player.inventory.take(item) {
        return vec![format!("You have no {item} to use.")];
    }

    match item {
        ItemKind::HealingPotion => {
            player.hp += POTION_HEAL;
            vec![format!("You use a Healing Potion and heal {POTION_HEAL} HP.")]
        }
        ItemKind::Shield => {
            player.blocks += SHIELD_BLOCKS;
            vec![format!("You equip a Shield. Total blocks: {}", player.blocks)]
        }
        ItemKind::MysteriousPill => {
            let (outcome, stat) = swallow_pill(player, rng);
            let flavor = ask(provider, &Prompt::PillEffect { outcome, stat }, call_attempts)
                .unwrap_or_else(|| "Something strange happens.".to_string());
            vec!["You swallow the Mysterious Pill...".to_string(), flavor]
        }
        // Buffs are applied at purchase, but one could still be granted directly.
        ItemKind::AttackBuff => {
            player.attack_bonus += ATTACK_BUFF_BONUS;
            vec![format!("You feel stronger. Attack +{ATTACK_BUFF_BONUS}!")]
        }
    }
}

/// Spoils after a kill: an item half the time, otherwise 5 to 30 gold.
pub fn loot_drop(player: &mut Player, rng: &mut impl Rng) -> String {
    if rng.gen_bool(0.5) {
        if let Some(&item) = LOOT_TABLE.choose(rng) {
            player.inventory.add(item);
            return format!("You found a {item}!");
        }
    }
    let gold = rng.gen_range(5..=30);
    player.gold += gold;
    format!("You found {gold} gold coins!")
}

/// What the shadowy shopkeeper offers in exchange for blood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HpTrade {
    CursedBlade,
    SoulShield,
    BloodElixir,
    Leave,
}

impl HpTrade {
    pub fn name(self) -> &'static str {
        match self {
            HpTrade::CursedBlade => "Cursed Blade",
            HpTrade::SoulShield => "Soul Shield",
            HpTrade::BloodElixir => "Blood Elixir",
            HpTrade::Leave => "Leave",
        }
    }

    /// Hit points the trade costs up front.
    pub fn hp_cost(self) -> i32 {
        match self {
            HpTrade::CursedBlade => 10,
            HpTrade::SoulShield => 8,
            HpTrade::BloodElixir => 15,
            HpTrade::Leave => 0,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HpTrade::CursedBlade => "Trade 10 HP for +10 ATK",
            HpTrade::SoulShield => "Trade 8 HP for +4 blocks",
            HpTrade::BloodElixir => "Trade 15 HP for +40 HP",
            HpTrade::Leave => "Walk away",
        }
    }
}

impl Player {
    /// Accept one of the shopkeeper's offers. The player must have more HP
    /// than the offer costs.
    pub fn trade_hp(&mut self, trade: HpTrade) -> String {
        let cost = trade.hp_cost();
        if trade != HpTrade::Leave && self.hp <= cost {
            return match trade {
                HpTrade::CursedBlade => "You don't have enough HP for the Cursed Blade.",
                HpTrade::SoulShield => "Not enough HP for the Soul Shield.",
                _ => "Too little HP to survive the Blood Elixir.",
            }
            .to_string();
        }

        self.hp -= cost;
        match trade {
            HpTrade::CursedBlade => {
                self.attack_bonus += 10;
                "You grasp the Cursed Blade. Power surges through your veins.".to_string()
            }
            HpTrade::SoulShield => {
                self.blocks += 4;
                "The Soul Shield binds to your aura. You feel protected.".to_string()
            }
            HpTrade::BloodElixir => {
                self.hp += 40;
                "You drink the Blood Elixir. It burns... then heals.".to_string()
            }
            HpTrade::Leave => "You nod to the shopkeeper and walk on.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_buy_refused_when_short() {
        let mut player = Player::new(100, 10);
        let purchase = player.buy(ItemKind::AttackBuff, ItemKind::AttackBuff.cost());

        assert_eq!(purchase.message(), "Not enough gold.");
        assert!(!purchase.succeeded());
        assert_eq!(player.gold, 10);
        assert_eq!(player.attack_bonus, 0);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_buy_deducts_exact_cost() {
        let mut player = Player::new(100, 50);
        let purchase = player.buy(ItemKind::Shield, 20);
        assert!(purchase.succeeded());
        assert_eq!(player.gold, 30);
        assert_eq!(player.inventory.count(ItemKind::Shield), 1);

        // Exactly enough is enough
        let purchase = player.buy(ItemKind::Shield, 30);
        assert!(purchase.succeeded());
        assert_eq!(player.gold, 0);
        assert_eq!(player.inventory.count(ItemKind::Shield), 2);
    }

    #[test]
    fn test_attack_buff_is_not_stored() {
        let mut player = Player::new(100, 25);
        let purchase = player.buy(ItemKind::AttackBuff, 25);
        assert_eq!(purchase.message(), "You bought Attack Buff for 25 gold. Attack +5!");
        assert_eq!(player.attack_bonus, 5);
        assert_eq!(player.inventory.count(ItemKind::AttackBuff), 0);
    }

    #[test]
    fn test_use_item_without_any() {
        let mut player = Player::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut provider = ScriptedProvider::new();
        let lines = use_item(&mut player, ItemKind::Shield, &mut rng, &mut provider, 2);
        assert_eq!(lines, vec!["You have no Shield to use.".to_string()]);
        assert_eq!(player.blocks, 0);
    }

    #[test]
    fn test_potion_and_shield() {
        let mut player = Player::new(50, 0);
        player.inventory.add(ItemKind::HealingPotion);
        player.inventory.add(ItemKind::Shield);
        player.inventory.add(ItemKind::Shield);
        let mut rng = StdRng::seed_from_u64(2);
        let mut provider = ScriptedProvider::new();

        use_item(&mut player, ItemKind::HealingPotion, &mut rng, &mut provider, 2);
        assert_eq!(player.hp, 70);
        assert_eq!(player.inventory.count(ItemKind::HealingPotion), 0);
        assert_eq!(player.inventory.nth(0), Some(ItemKind::Shield));

        let lines = use_item(&mut player, ItemKind::Shield, &mut rng, &mut provider, 2);
        assert_eq!(lines, vec!["You equip a Shield. Total blocks: 2".to_string()]);
        assert_eq!(player.inventory.count(ItemKind::Shield), 1);
        assert!(provider.prompts().is_empty());
    }

    #[test]
    fn test_pill_uses_fallback_flavor() {
        let mut player = Player::default();
        player.inventory.add(ItemKind::MysteriousPill);
        let mut rng = StdRng::seed_from_u64(3);
        let mut provider = ScriptedProvider::new().then_fail().then_text("   ");

        let lines = use_item(&mut player, ItemKind::MysteriousPill, &mut rng, &mut provider, 2);
        assert_eq!(lines[0], "You swallow the Mysterious Pill...");
        assert_eq!(lines[1], "Something strange happens.");
        assert_eq!(provider.prompts().len(), 2);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_pill_effects_stay_bounded() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut player = Player::new(100, 0);
            let (outcome, stat) = swallow_pill(&mut player, &mut rng);
            match (outcome, stat) {
                (PillOutcome::Good, PillStat::Hp) => assert!((110..=120).contains(&player.hp)),
                (PillOutcome::Bad, PillStat::Hp) => assert!((85..=95).contains(&player.hp)),
                (PillOutcome::Good, PillStat::Atk) => assert_eq!(player.attack_bonus, 5),
                (PillOutcome::Good, PillStat::Block) => assert_eq!(player.blocks, 2),
                // Nothing to lose yet
                (PillOutcome::Bad, PillStat::Atk) => assert_eq!(player.attack_bonus, 0),
                (PillOutcome::Bad, PillStat::Block) => assert_eq!(player.blocks, 0),
            }
        }
    }

    #[test]
    fn test_loot_drop_gives_item_or_gold() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut player = Player::new(100, 0);
            let message = loot_drop(&mut player, &mut rng);
            if player.inventory.is_empty() {
                assert!((5..=30).contains(&player.gold), "{message}");
            } else {
                assert_eq!(player.gold, 0);
                assert_eq!(player.inventory.len(), 1);
                assert!(player.inventory.nth(0).is_some_and(|i| LOOT_TABLE.contains(&i)));
            }
        }
    }

    #[test]
    fn test_hp_trades() {
        let mut player = Player::new(30, 0);
        player.trade_hp(HpTrade::CursedBlade);
        assert_eq!((player.hp, player.attack_bonus), (20, 10));

        player.trade_hp(HpTrade::SoulShield);
        assert_eq!((player.hp, player.blocks), (12, 4));

        // 12 HP does not exceed the elixir's 15 HP price
        let refused = player.trade_hp(HpTrade::BloodElixir);
        assert_eq!(refused, "Too little HP to survive the Blood Elixir.");
        assert_eq!(player.hp, 12);

        player.hp = 16;
        player.trade_hp(HpTrade::BloodElixir);
        assert_eq!(player.hp, 41);

        player.trade_hp(HpTrade::Leave);
        assert_eq!(player.hp, 41);
    }

    #[test]
    fn test_trade_refused_at_exact_cost() {
        let mut player = Player::new(10, 0);
        player.trade_hp(HpTrade::CursedBlade);
        assert_eq!((player.hp, player.attack_bonus), (10, 0));
    }

    #[test]
    fn test_inventory_listing() {
        let mut inventory = Inventory::default();
        assert_eq!(inventory.listing(), vec!["Inventory is empty.".to_string()]);

        inventory.add(ItemKind::Shield);
        inventory.add(ItemKind::HealingPotion);
        inventory.add(ItemKind::HealingPotion);
        assert_eq!(
            inventory.listing(),
            vec![
                "Inventory:".to_string(),
                "[1] Healing Potion x2".to_string(),
                "[2] Shield".to_string(),
            ]
        );
    }
}
