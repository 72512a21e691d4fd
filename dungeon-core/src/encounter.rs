//! Rooms, monsters and bosses.
//!
//! Everything here asks a [`ContentProvider`] first and falls back to fixed
//! content when it can't get a usable answer, so a dead network never stalls
//! the game.

use crate::character::{Enemy, Player, SpecialAbility};
use crate::config::GameConfig;
use crate::provider::{ask, ContentProvider, GenerationError, Prompt};
use crate::status::EffectKind;
use crate::Tool;
use rand::Rng;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

pub const FALLBACK_ROOM: &str =
    "You step into a cold stone chamber. Somewhere in the dark, water drips.";
pub const FALLBACK_QUEST: &str = "Find the way out of the endless dungeon.";
pub const FALLBACK_DEATH: &str = "You died in the dungeon, your journey ending in silence.";

/// An inclusive range a generated stat must land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRange {
    pub low: i32,
    pub high: i32,
}

impl StatRange {
    /// A range whose low end exceeds its high end collapses to the high end.
    pub fn new(low: i32, high: i32) -> Self {
        Self {
            low: low.min(high),
            high,
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.low..=self.high).contains(&value)
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.low, self.high)
    }

    pub fn midpoint(&self) -> i32 {
        self.low + (self.high - self.low) / 2
    }
}

impl fmt::Display for StatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.low, self.high)
    }
}

/// HP and ATK ranges for a regular enemy at `tier`.
pub fn enemy_ranges(tier: u32) -> (StatRange, StatRange) {
    let t = tier as i32;
    (
        StatRange::new(20 + 2 * t, (30 + 4 * t).min(70)),
        StatRange::new(5 + t / 2, (10 + 2 * t).min(25)),
    )
}

/// HP and ATK ranges for a boss at `tier`.
pub fn boss_ranges(tier: u32) -> (StatRange, StatRange) {
    let t = tier as i32;
    (
        StatRange::new(100 + 3 * t, 200 + 4 * t),
        StatRange::new(15 + t / 2, 20 + t),
    )
}

/// Create a monster for an endless fantasy dungeon
#[derive(Debug, Clone, Tool, Deserialize)]
#[tool(name = "create_monster")]
pub struct MonsterBlueprint {
    /// A unique, evocative name
    pub name: String,
    /// One or two sentences describing the monster
    pub description: String,
    /// Hit points, inside the requested range
    #[serde(deserialize_with = "lenient_int")]
    pub hp: i32,
    /// Attack power, inside the requested range
    #[serde(deserialize_with = "lenient_int")]
    pub atk: i32,
    /// Signature move, if the monster has one
    #[serde(default)]
    pub special: Option<SpecialBlueprint>,
}

/// A monster's signature move
#[derive(Debug, Clone, Tool, Deserialize)]
pub struct SpecialBlueprint {
    /// Name of the move
    pub name: String,
    /// Status effect the move leaves on its target
    #[tool(one_of = "burn, freeze")]
    pub effect: String,
    /// Line shown when the move lands
    #[serde(default)]
    pub description: Option<String>,
}

/// Accept `42`, `42.0` or `"42"`.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
}

impl MonsterBlueprint {
    /// Parse the first JSON object found in `raw`.
    ///
    /// Prose or code fences around the object are ignored.
    pub fn parse(raw: &str) -> Result<Self, GenerationError> {
        let start = raw.find('{');
        let end = raw.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &raw[start..=end],
            _ => return Err(GenerationError::Malformed("no JSON object found".into())),
        };
        let blueprint: MonsterBlueprint =
            serde_json::from_str(json).map_err(|e| GenerationError::Malformed(e.to_string()))?;
        if blueprint.name.trim().is_empty() {
            return Err(GenerationError::Malformed("monster has no name".into()));
        }
        Ok(blueprint)
    }

    /// Turn the blueprint into an enemy with stats forced into range.
    pub fn into_enemy(self, hp: StatRange, atk: StatRange) -> Enemy {
        let special = self.special.and_then(|special| match special.effect.parse::<EffectKind>() {
            Ok(effect) => {
                let ability = SpecialAbility::new(special.name.trim(), effect);
                Some(match special.description {
                    Some(description) => ability.with_description(description),
                    None => ability,
                })
            }
            Err(err) => {
                debug!(error = %err, "dropping special ability");
                None
            }
        });

        let enemy = Enemy::new(
            self.name.trim(),
            self.description.trim(),
            hp.clamp(self.hp).max(1),
            atk.clamp(self.atk),
        );
        match special {
            Some(special) => enemy.with_special(special),
            None => enemy,
        }
    }
}

struct RosterEntry {
    name: &'static str,
    description: &'static str,
    special: Option<(&'static str, EffectKind, &'static str)>,
}

const ROSTER: [RosterEntry; 5] = [
    RosterEntry {
        name: "Goblin Scavenger",
        description: "A wiry goblin clutching a rusted knife.",
        special: None,
    },
    RosterEntry {
        name: "Cinder Imp",
        description: "A cackling imp trailing smoke and sparks.",
        special: Some((
            "Ember Spit",
            EffectKind::Burn,
            "The enemy channels flames to scorch you!",
        )),
    },
    RosterEntry {
        name: "Frost Wight",
        description: "A pale corpse rimed with frost, its breath a freezing fog.",
        special: Some((
            "Grave Chill",
            EffectKind::Freeze,
            "The enemy conjures ice to freeze your limbs!",
        )),
    },
    RosterEntry {
        name: "Cave Troll",
        description: "A hulking troll dragging a cracked stone club.",
        special: None,
    },
    RosterEntry {
        name: "Skeleton Warden",
        description: "Rattling bones in rusted plate, still guarding its post.",
        special: None,
    },
];

/// The enemy used when generation fails at `tier`.
pub fn fallback_enemy(tier: u32) -> Enemy {
    let (hp, atk) = enemy_ranges(tier);
    let entry = &ROSTER[tier as usize % ROSTER.len()];
    let enemy = Enemy::new(entry.name, entry.description, hp.midpoint(), atk.midpoint());
    match entry.special {
        Some((name, effect, line)) => {
            enemy.with_special(SpecialAbility::new(name, effect).with_description(line))
        }
        None => enemy,
    }
}

/// The boss used when generation fails.
pub fn fallback_boss() -> Enemy {
    Enemy::new("Flame Wraith", "A burning ghost with blazing eyes.", 180, 25)
        .with_special(
            SpecialAbility::new("Flame Burst", EffectKind::Burn)
                .with_description("You are engulfed in fire!"),
        )
        .boss()
}

/// Produces rooms and monsters, remembering every generated enemy name.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    seen: HashSet<String>,
    call_attempts: u32,
    generation_attempts: u32,
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl EncounterGenerator {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            seen: HashSet::new(),
            call_attempts: config.call_attempts.max(1),
            generation_attempts: config.generation_attempts.max(1),
        }
    }

    pub fn has_seen(&self, name: &str) -> bool {
        self.seen.contains(name.trim())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn room_text<P: ContentProvider + ?Sized>(&self, provider: &mut P) -> String {
        ask(provider, &Prompt::Room, self.call_attempts).unwrap_or_else(|| FALLBACK_ROOM.into())
    }

    pub fn quest_text<P: ContentProvider + ?Sized>(&self, provider: &mut P) -> String {
        ask(provider, &Prompt::Quest, self.call_attempts).unwrap_or_else(|| FALLBACK_QUEST.into())
    }

    pub fn death_text<P: ContentProvider + ?Sized>(&self, provider: &mut P, room: u32) -> String {
        ask(provider, &Prompt::Death { room }, self.call_attempts)
            .unwrap_or_else(|| FALLBACK_DEATH.into())
    }

    /// A fresh enemy whose name has never been seen before, or the roster
    /// fallback after too many misses.
    pub fn enemy<P: ContentProvider + ?Sized>(&mut self, provider: &mut P, tier: u32) -> Enemy {
        let (hp, atk) = enemy_ranges(tier);
        let prompt = Prompt::Enemy { room: tier, hp, atk };

        for attempt in 1..=self.generation_attempts {
            let Some(raw) = ask(provider, &prompt, self.call_attempts) else {
                continue;
            };
            let blueprint = match MonsterBlueprint::parse(&raw) {
                Ok(blueprint) => blueprint,
                Err(err) => {
                    warn!(attempt, error = %err, "unusable enemy");
                    continue;
                }
            };
            let name = blueprint.name.trim().to_string();
            if self.seen.contains(&name) {
                warn!(attempt, name = %name, "duplicate enemy name");
                continue;
            }
            self.seen.insert(name);
            return blueprint.into_enemy(hp, atk);
        }

        debug!(tier, "using fallback enemy");
        fallback_enemy(tier)
    }

    /// A boss for `tier`. Boss names are not checked against earlier ones.
    pub fn boss<P: ContentProvider + ?Sized>(&mut self, provider: &mut P, tier: u32) -> Enemy {
        let (hp, atk) = boss_ranges(tier);
        let prompt = Prompt::Boss { room: tier, hp, atk };

        for attempt in 1..=self.generation_attempts {
            let Some(raw) = ask(provider, &prompt, self.call_attempts) else {
                continue;
            };
            match MonsterBlueprint::parse(&raw) {
                Ok(blueprint) => return blueprint.into_enemy(hp, atk).boss(),
                Err(err) => warn!(attempt, error = %err, "unusable boss"),
            }
        }

        debug!(tier, "using fallback boss");
        fallback_boss()
    }
}

/// A room with no monster in it: either a trap or a blessing.
pub fn random_event(player: &mut Player, rng: &mut impl Rng) -> Vec<String> {
    let amount = rng.gen_range(5..=15);
    if rng.gen_bool(0.5) {
        let hit = player.take_damage(amount);
        vec!["A hidden trap springs!".to_string(), hit.message()]
    } else {
        vec![
            "A magical aura surrounds you.".to_string(),
            player.heal(amount),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tier_ranges() {
        let (hp, atk) = enemy_ranges(1);
        assert_eq!(hp, StatRange::new(22, 34));
        assert_eq!(atk, StatRange::new(5, 12));

        // Caps kick in deep down
        let (hp, atk) = enemy_ranges(20);
        assert_eq!(hp.high, 70);
        assert_eq!(atk.high, 25);

        let (hp, atk) = boss_ranges(10);
        assert_eq!(hp, StatRange::new(130, 240));
        assert_eq!(atk, StatRange::new(20, 30));
    }

    #[test]
    fn test_degenerate_range_collapses_to_high() {
        // 20 + 2*30 = 80 > 70
        let (hp, _) = enemy_ranges(30);
        assert_eq!(hp, StatRange { low: 70, high: 70 });
        assert_eq!(hp.clamp(5), 70);
    }

    #[test]
    fn test_parse_tolerates_fences() {
        let raw = "Here you go:\n```json\n{\"name\": \"Bog Hag\", \"description\": \"Muddy.\", \"hp\": \"30\", \"atk\": 8.0}\n```";
        let blueprint = MonsterBlueprint::parse(raw).unwrap();
        assert_eq!(blueprint.name, "Bog Hag");
        assert_eq!(blueprint.hp, 30);
        assert_eq!(blueprint.atk, 8);
        assert!(blueprint.special.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(MonsterBlueprint::parse("no monsters here").is_err());
        assert!(MonsterBlueprint::parse("{\"name\": \"Half\"}").is_err());
        assert!(MonsterBlueprint::parse(
            "{\"name\": \" \", \"description\": \"\", \"hp\": 1, \"atk\": 1}"
        )
        .is_err());
    }

    #[test]
    fn test_into_enemy_clamps_and_drops_unknown_special() {
        let raw = r#"{"name": "Venom Drake", "description": "Scaly.", "hp": 999, "atk": -3,
                      "special": {"name": "Poison Bite", "effect": "poison"}}"#;
        let (hp, atk) = enemy_ranges(2);
        let enemy = MonsterBlueprint::parse(raw).unwrap().into_enemy(hp, atk);
        assert_eq!(enemy.hp, hp.high);
        assert_eq!(enemy.atk, atk.low);
        assert!(enemy.special.is_none());
        assert!(!enemy.is_boss);
    }

    #[test]
    fn test_enemy_keeps_special() {
        let raw = r#"{"name": "Ash Hound", "description": "Smoldering.", "hp": 30, "atk": 9,
                      "special": {"name": "Ember Bite", "effect": "burn", "description": "Teeth of fire!"}}"#;
        let mut provider = ScriptedProvider::new().then_text(raw);
        let mut generator = EncounterGenerator::default();

        let enemy = generator.enemy(&mut provider, 3);
        assert_eq!(enemy.name, "Ash Hound");
        let special = enemy.special.unwrap();
        assert_eq!(special.effect, EffectKind::Burn);
        assert_eq!(special.flavor("Ash Hound"), "Teeth of fire!");
        assert!(generator.has_seen("Ash Hound"));
    }

    #[test]
    fn test_fallback_enemy_after_failures() {
        let mut provider = ScriptedProvider::new();
        let mut generator = EncounterGenerator::default();

        let enemy = generator.enemy(&mut provider, 7);
        assert_eq!(enemy, fallback_enemy(7));
        let (hp, atk) = enemy_ranges(7);
        assert!(hp.contains(enemy.hp));
        assert!(atk.contains(enemy.atk));
        assert_eq!(generator.seen_count(), 0);
        // Three attempts of two calls each
        assert_eq!(provider.prompts().len(), 6);
    }

    #[test]
    fn test_fallback_boss() {
        let mut provider = ScriptedProvider::new().then_text("not json");
        let mut generator = EncounterGenerator::default();
        let boss = generator.boss(&mut provider, 10);
        assert_eq!(boss.name, "Flame Wraith");
        assert_eq!((boss.hp, boss.atk), (180, 25));
        assert!(boss.is_boss);
        assert_eq!(
            boss.special.map(|s| s.effect),
            Some(EffectKind::Burn)
        );
    }

    #[test]
    fn test_generated_boss_is_flagged() {
        let raw = r#"{"name": "The Hollow King", "description": "Crowned in rust.", "hp": 150, "atk": 22}"#;
        let mut provider = ScriptedProvider::new().then_text(raw);
        let mut generator = EncounterGenerator::default();
        let boss = generator.boss(&mut provider, 10);
        assert!(boss.is_boss);
        assert_eq!(boss.name, "The Hollow King");
        // Bosses don't take up names
        assert!(!generator.has_seen("The Hollow King"));
    }

    #[test]
    fn test_text_fallbacks() {
        let mut provider = ScriptedProvider::new();
        let generator = EncounterGenerator::default();
        assert_eq!(generator.room_text(&mut provider), FALLBACK_ROOM);
        assert_eq!(generator.quest_text(&mut provider), FALLBACK_QUEST);
        assert_eq!(generator.death_text(&mut provider, 4), FALLBACK_DEATH);
    }

    #[test]
    fn test_random_event() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut player = Player::new(50, 0);
            let lines = random_event(&mut player, &mut rng);
            match lines[0].as_str() {
                "A hidden trap springs!" => assert!((35..=45).contains(&player.hp)),
                "A magical aura surrounds you." => assert!((55..=65).contains(&player.hp)),
                other => panic!("unexpected event: {other}"),
            }
        }
    }

    #[test]
    fn test_trap_respects_blocks() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut player = Player::new(50, 0);
            player.blocks = 1;
            random_event(&mut player, &mut rng);
            assert!(player.hp >= 50);
        }
    }

    #[test]
    fn test_schema_lists_effects() {
        let schema = MonsterBlueprint::input_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert_eq!(
            schema["properties"]["special"]["properties"]["effect"]["enum"],
            serde_json::json!(["burn", "freeze"])
        );
    }
}
