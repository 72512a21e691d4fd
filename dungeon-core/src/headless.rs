//! Headless game interface for programmatic use.
//!
//! This module drives a [`Session`] with typed-in commands instead of key
//! presses. It's designed for:
//! - Automated play with real AI responses
//! - Terminal play without a window
//! - Script-driven game sessions
//!
//! # Example
//!
//! ```ignore
//! use dungeon_core::{GameConfig, HeadlessGame, OfflineProvider};
//!
//! let mut game = HeadlessGame::new(OfflineProvider, GameConfig::default(), 42);
//! let response = game.send("continue")?;
//! for line in &response.lines {
//!     println!("{line}");
//! }
//! println!("HP: {}  Gold: {}", game.hp(), game.gold());
//! ```

use crate::config::GameConfig;
use crate::economy::HpTrade;
use crate::provider::ContentProvider;
use crate::session::{Action, Mode, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;
use thiserror::Error;

/// A command that doesn't map to any action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command: {0:?}")]
pub struct ParseCommandError(pub String);

impl FromStr for Action {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = s.trim().to_lowercase();
        if let Ok(n) = command.parse::<usize>() {
            return Ok(Action::Select(n));
        }
        match command.as_str() {
            "" | "c" | "continue" | "go" => Ok(Action::Continue),
            "a" | "attack" => Ok(Action::Attack),
            "s" | "special" => Ok(Action::Special),
            "r" | "run" | "flee" => Ok(Action::Run),
            "shop" => Ok(Action::OpenShop),
            "i" | "inv" | "inventory" => Ok(Action::OpenInventory),
            "close" | "esc" | "leave" => Ok(Action::Close),
            "restart" => Ok(Action::Restart),
            _ => Err(ParseCommandError(s.trim().to_string())),
        }
    }
}

/// What came back from one command.
#[derive(Debug, Clone)]
pub struct GameResponse {
    /// Whether the command did anything.
    pub accepted: bool,
    /// Log lines written by the command.
    pub lines: Vec<String>,
    pub mode: Mode,
    pub hp: i32,
    pub gold: i32,
    pub room: u32,
}

/// An entry in the game transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub action: Action,
    pub lines: Vec<String>,
    pub turn: usize,
}

/// A dungeon run controlled by text commands.
pub struct HeadlessGame<P> {
    session: Session<P, StdRng>,
    transcript: Vec<TranscriptEntry>,
}

impl<P: ContentProvider> HeadlessGame<P> {
    /// Start a run with a seeded RNG, so the same seed replays the same dice.
    pub fn new(provider: P, config: GameConfig, seed: u64) -> Self {
        Self {
            session: Session::new(provider, StdRng::seed_from_u64(seed), config),
            transcript: Vec::new(),
        }
    }

    /// Parse and apply a typed command.
    pub fn send(&mut self, input: &str) -> Result<GameResponse, ParseCommandError> {
        Ok(self.act(input.parse()?))
    }

    /// Apply an action directly.
    pub fn act(&mut self, action: Action) -> GameResponse {
        let before = self.session.log().to_vec();
        let accepted = self.session.handle(action);
        let log = self.session.log();

        // Closing an overlay rewinds the log, so fall back to what is on screen.
        let lines = if log.len() >= before.len() && log[..before.len()] == before[..] {
            log[before.len()..].to_vec()
        } else {
            self.session.visible_log().to_vec()
        };

        self.transcript.push(TranscriptEntry {
            action,
            lines: lines.clone(),
            turn: self.transcript.len() + 1,
        });

        GameResponse {
            accepted,
            lines,
            mode: self.session.mode(),
            hp: self.session.player().hp,
            gold: self.session.player().gold,
            room: self.session.room(),
        }
    }

    /// A reasonable next move, for unattended play.
    pub fn suggest(&self) -> Action {
        let player = self.session.player();
        match self.session.mode() {
            Mode::GameOver => Action::Restart,
            Mode::Exploring => Action::Continue,
            Mode::Combat if self.session.special_ready() => Action::Special,
            Mode::Combat => Action::Attack,
            Mode::Shop | Mode::Inventory => Action::Close,
            Mode::HpShop if player.hp > 60 => Action::Select(1),
            Mode::HpShop if player.hp > HpTrade::BloodElixir.hp_cost() => Action::Select(3),
            Mode::HpShop => Action::Close,
        }
    }

    /// One-line summary of the run.
    pub fn status_line(&self) -> String {
        let player = self.session.player();
        let mut line = format!(
            "Room {} | HP {} | Gold {} | ATK +{} | Blocks {}",
            self.session.room(),
            player.hp,
            player.gold,
            player.attack_bonus,
            player.blocks
        );
        if let Some(enemy) = self.session.enemy() {
            line.push_str(&format!(" | {} HP {}", enemy.name, enemy.hp));
        }
        line
    }
}

impl<P> HeadlessGame<P> {
    pub fn hp(&self) -> i32 {
        self.session.player().hp
    }

    pub fn gold(&self) -> i32 {
        self.session.player().gold
    }

    pub fn room(&self) -> u32 {
        self.session.room()
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn is_over(&self) -> bool {
        self.session.mode() == Mode::GameOver
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn session(&self) -> &Session<P, StdRng> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<P, StdRng> {
        &mut self.session
    }
}
