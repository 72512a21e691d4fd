//! Rules engine for an endless, AI-narrated dungeon crawler.
//!
//! This crate provides:
//! - Turn-based combat with burn and freeze status effects
//! - Gold, a shop, an inventory and a post-boss HP trader
//! - Rooms, enemies and bosses generated by Claude, with fixed fallbacks
//! - A synchronous `Session` that a front-end drives one action at a time
//!
//! # Quick Start
//!
//! ```ignore
//! use dungeon_core::{Action, Blocking, ClaudeProvider, GameConfig, Session};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::from_env()?;
//!     let provider = Blocking::new(ClaudeProvider::from_env(&config)?)?;
//!     let mut session = Session::new(provider, rand::thread_rng(), config);
//!
//!     session.handle(Action::Continue);
//!     for line in session.visible_log() {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod combat;
pub mod config;
pub mod economy;
pub mod encounter;
pub mod headless;
pub mod provider;
pub mod session;
pub mod status;
pub mod testing;

// Re-export for convenience
pub use dungeon_macros::Tool;

// Primary public API
pub use character::{Enemy, Hit, Player, SpecialAbility};
pub use config::{ConfigError, GameConfig};
pub use economy::{HpTrade, Inventory, ItemKind};
pub use encounter::{EncounterGenerator, MonsterBlueprint, StatRange};
pub use headless::{HeadlessGame, ParseCommandError};
pub use provider::{
    AsyncContentProvider, Blocking, ClaudeProvider, ContentProvider, GenerationError,
    OfflineProvider, Prompt,
};
pub use session::{Action, Mode, Session};
pub use status::{EffectKind, StatusEffects};
pub use testing::{ScriptedProvider, TestHarness};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    /// Name a treasure chest
    #[derive(Tool, Deserialize)]
    #[tool(name = "label_chest")]
    struct LabelChest {
        /// What is written on the lid
        label: String,
        /// Which metal the lock is made of
        #[tool(one_of = "iron, brass, gold")]
        lock: String,
        /// Optional warning scratched underneath
        warning: Option<String>,
    }

    #[test]
    fn test_tool_derive() {
        assert_eq!(LabelChest::tool_name(), "label_chest");
        assert_eq!(LabelChest::tool_description(), "Name a treasure chest");
    }

    #[test]
    fn test_tool_schema() {
        let schema = LabelChest::input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["label"]["type"], "string");
        assert_eq!(
            schema["properties"]["lock"]["enum"],
            serde_json::json!(["iron", "brass", "gold"])
        );
        assert_eq!(
            schema["properties"]["lock"]["description"],
            "Which metal the lock is made of"
        );

        // warning is an Option, so only label and lock are required
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "label"));
        assert!(required.iter().any(|v| v == "lock"));
        assert!(!required.iter().any(|v| v == "warning"));
    }

    #[test]
    fn test_tool_as_tool() {
        let tool = MonsterBlueprint::as_tool();
        assert_eq!(tool.name, "create_monster");
        assert!(!tool.description.is_empty());
        assert_eq!(tool.input_schema["type"], "object");
    }
}
