//! Timed status effects shared by the player and enemies.
//!
//! Each effect has a fixed duration in turns. An entry only exists while its
//! remaining duration is positive; the call that brings it to zero also
//! removes it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Damage dealt by one turn of burning.
pub const BURN_DAMAGE: i32 = 5;

/// An effect name that is neither burn nor freeze.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status effect: {0}")]
pub struct UnknownEffect(pub String);

/// The timed effects an attack can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectKind {
    /// Deals [`BURN_DAMAGE`] to its owner every turn.
    Burn,
    /// Costs its owner their attack.
    Freeze,
}

impl EffectKind {
    pub const ALL: [EffectKind; 2] = [EffectKind::Burn, EffectKind::Freeze];

    /// Turns the effect lasts when freshly applied.
    pub fn duration(self) -> u32 {
        match self {
            EffectKind::Burn => 3,
            EffectKind::Freeze => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Burn => "burn",
            EffectKind::Freeze => "freeze",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "burn" | "burning" | "fire" => Ok(EffectKind::Burn),
            "freeze" | "frozen" | "ice" => Ok(EffectKind::Freeze),
            other => Err(UnknownEffect(other.to_string())),
        }
    }
}

/// Something that happened while effects were advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Burned { damage: i32 },
    Frozen,
    WoreOff(EffectKind),
}

/// Outcome of one [`StatusEffects::advance`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: Vec<TickEvent>,
}

impl TickReport {
    /// Whether the owner loses their next attack.
    pub fn frozen(&self) -> bool {
        self.events.contains(&TickEvent::Frozen)
    }

    /// Total burn damage taken during the tick.
    pub fn burn_damage(&self) -> i32 {
        self.events
            .iter()
            .map(|event| match event {
                TickEvent::Burned { damage } => *damage,
                _ => 0,
            })
            .sum()
    }

    /// Log lines for the player, in the order the events happened.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|event| match event {
                TickEvent::Burned { damage } => format!("You are burning! (-{damage} HP)"),
                TickEvent::Frozen => "You are frozen and might skip your action!".to_string(),
                TickEvent::WoreOff(kind) => format!("The {kind} effect wears off."),
            })
            .collect()
    }
}

/// Remaining turns per active effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusEffects {
    remaining: BTreeMap<EffectKind, u32>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect at its full duration, resetting any running timer.
    pub fn apply(&mut self, kind: EffectKind) {
        self.set(kind, kind.duration());
    }

    /// Set an exact number of remaining turns. Zero removes the effect.
    pub fn set(&mut self, kind: EffectKind, turns: u32) {
        if turns == 0 {
            self.remaining.remove(&kind);
        } else {
            self.remaining.insert(kind, turns);
        }
    }

    /// Remaining turns, zero when the effect is absent.
    pub fn remaining(&self, kind: EffectKind) -> u32 {
        self.remaining.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.remaining.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, u32)> + '_ {
        self.remaining.iter().map(|(kind, turns)| (*kind, *turns))
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    /// Take one turn off an effect. Returns true if that expired it.
    pub fn decrement(&mut self, kind: EffectKind) -> bool {
        let Some(turns) = self.remaining.get_mut(&kind) else {
            return false;
        };
        *turns -= 1;
        if *turns == 0 {
            self.remaining.remove(&kind);
            true
        } else {
            false
        }
    }

    /// Run one turn of every active effect against its owner's hit points.
    ///
    /// Burn is resolved before freeze, so a frozen owner still burns.
    pub fn advance(&mut self, hp: &mut i32) -> TickReport {
        let mut report = TickReport::default();
        let active: Vec<EffectKind> = self.remaining.keys().copied().collect();

        for kind in active {
            match kind {
                EffectKind::Burn => {
                    *hp -= BURN_DAMAGE;
                    report.events.push(TickEvent::Burned {
                        damage: BURN_DAMAGE,
                    });
                }
                EffectKind::Freeze => report.events.push(TickEvent::Frozen),
            }
            if self.decrement(kind) {
                report.events.push(TickEvent::WoreOff(kind));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_are_fixed() {
        assert_eq!(EffectKind::Burn.duration(), 3);
        assert_eq!(EffectKind::Freeze.duration(), 2);
    }

    #[test]
    fn test_parse_effect_kind() {
        assert_eq!("Burn".parse::<EffectKind>(), Ok(EffectKind::Burn));
        assert_eq!(" freeze ".parse::<EffectKind>(), Ok(EffectKind::Freeze));
        assert!("poison".parse::<EffectKind>().is_err());
    }

    #[test]
    fn test_apply_resets_duration() {
        let mut effects = StatusEffects::new();
        effects.apply(EffectKind::Burn);
        let mut hp = 100;
        effects.advance(&mut hp);
        assert_eq!(effects.remaining(EffectKind::Burn), 2);

        effects.apply(EffectKind::Burn);
        assert_eq!(effects.remaining(EffectKind::Burn), 3);
    }

    #[test]
    fn test_burn_ticks_down_and_wears_off() {
        let mut effects = StatusEffects::new();
        effects.apply(EffectKind::Burn);
        let mut hp = 50;

        for expected in [2, 1] {
            let report = effects.advance(&mut hp);
            assert_eq!(report.burn_damage(), BURN_DAMAGE);
            assert_eq!(effects.remaining(EffectKind::Burn), expected);
            assert!(!report.events.contains(&TickEvent::WoreOff(EffectKind::Burn)));
        }

        let report = effects.advance(&mut hp);
        assert!(report.events.contains(&TickEvent::WoreOff(EffectKind::Burn)));
        assert!(!effects.is_active(EffectKind::Burn));
        assert_eq!(hp, 50 - 3 * BURN_DAMAGE);

        // Nothing left to tick
        let report = effects.advance(&mut hp);
        assert!(report.events.is_empty());
        assert_eq!(hp, 35);
    }

    #[test]
    fn test_frozen_owner_still_burns() {
        let mut effects = StatusEffects::new();
        effects.apply(EffectKind::Freeze);
        effects.apply(EffectKind::Burn);
        let mut hp = 20;

        let report = effects.advance(&mut hp);
        assert!(report.frozen());
        assert_eq!(hp, 15);
        assert_eq!(
            report.events[..2],
            [TickEvent::Burned { damage: 5 }, TickEvent::Frozen]
        );
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut effects = StatusEffects::new();
        effects.set(EffectKind::Freeze, 1);
        assert!(effects.decrement(EffectKind::Freeze));
        assert!(effects.is_empty());
        assert!(!effects.decrement(EffectKind::Freeze));
    }

    #[test]
    fn test_messages() {
        let mut effects = StatusEffects::new();
        effects.set(EffectKind::Freeze, 1);
        let mut hp = 10;
        let messages = effects.advance(&mut hp).messages();
        assert_eq!(
            messages,
            vec![
                "You are frozen and might skip your action!".to_string(),
                "The freeze effect wears off.".to_string(),
            ]
        );
    }
}
