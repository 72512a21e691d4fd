//! Testing utilities for the dungeon.
//!
//! This module provides tools for integration testing:
//! - `ScriptedProvider` for deterministic generation without API calls
//! - `TestHarness` for scripted game scenarios on a seeded RNG
//! - Assertion helpers for verifying game state

use crate::character::{Enemy, Player};
use crate::config::GameConfig;
use crate::provider::{ContentProvider, GenerationError, Prompt};
use crate::session::{Action, Mode, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// One scripted provider answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    Text(String),
    Fail,
}

/// A provider that replays scripted answers in order.
///
/// Once the script runs out every request fails, so the game falls back to
/// its fixed content.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: VecDeque<Scripted>,
    prompts: Vec<Prompt>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    pub fn then_fail(mut self) -> Self {
        self.script.push_back(Scripted::Fail);
        self
    }

    /// Queue another answer on a provider that is already in use.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.script.push_back(Scripted::Text(text.into()));
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Answers not yet handed out.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ContentProvider for ScriptedProvider {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError> {
        self.prompts.push(prompt.clone());
        match self.script.pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail) | None => Err(GenerationError::Unavailable),
        }
    }
}

/// JSON for a monster without a special ability, as a model would send it.
pub fn monster_json(name: &str, hp: i32, atk: i32) -> String {
    serde_json::json!({
        "name": name,
        "description": format!("The {name} glares at you."),
        "hp": hp,
        "atk": atk,
    })
    .to_string()
}

/// Test harness for running game scenarios.
pub struct TestHarness {
    pub session: Session<ScriptedProvider, StdRng>,
}

impl TestHarness {
    /// Fresh offline game on a seeded RNG.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, GameConfig::default())
    }

    pub fn with_config(seed: u64, config: GameConfig) -> Self {
        Self {
            session: Session::new(ScriptedProvider::new(), StdRng::seed_from_u64(seed), config),
        }
    }

    /// Start fighting a specific enemy.
    pub fn fight(&mut self, enemy: Enemy) -> &mut Self {
        self.session.begin_combat(enemy);
        self
    }

    pub fn press(&mut self, action: Action) -> bool {
        self.session.handle(action)
    }

    pub fn player(&self) -> &Player {
        self.session.player()
    }

    pub fn player_mut(&mut self) -> &mut Player {
        self.session.player_mut()
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.session.enemy()
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn logged(&self, line: &str) -> bool {
        self.session.log().iter().any(|l| l == line)
    }

    pub fn last_line(&self) -> Option<&str> {
        self.session.last_line()
    }
}

// Assertion helpers

pub fn assert_mode(harness: &TestHarness, mode: Mode) {
    assert_eq!(
        harness.mode(),
        mode,
        "unexpected mode; log: {:?}",
        harness.session.log()
    );
}

pub fn assert_logged(harness: &TestHarness, line: &str) {
    assert!(
        harness.logged(line),
        "expected {line:?} in log: {:?}",
        harness.session.log()
    );
}

pub fn assert_not_logged(harness: &TestHarness, line: &str) {
    assert!(
        !harness.logged(line),
        "did not expect {line:?} in log: {:?}",
        harness.session.log()
    );
}
