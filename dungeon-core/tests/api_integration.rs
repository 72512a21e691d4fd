//! Integration tests that call the real Claude API.
//!
//! These tests require ANTHROPIC_API_KEY to be set (via .env file or environment).
//! Run with: `cargo test -p dungeon-core --test api_integration -- --ignored --nocapture`
//!
//! These are marked #[ignore] by default to avoid:
//! - API costs in CI
//! - Test failures when no API key is available
//! - Slow test runs (API calls take seconds)

use dungeon_core::encounter::{enemy_ranges, fallback_boss};
use dungeon_core::{
    AsyncContentProvider, Blocking, ClaudeProvider, EncounterGenerator, GameConfig,
    HeadlessGame, MonsterBlueprint, Prompt,
};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("ANTHROPIC_API_KEY").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_room_text_is_generated() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let config = GameConfig::from_env().expect("Invalid DUNGEON_* settings");
    let provider = ClaudeProvider::from_env(&config).expect("Failed to create provider");

    let text = provider
        .generate(&Prompt::Room)
        .await
        .expect("Claude should describe a room");
    println!("Room: {text}");
    assert!(!text.trim().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_forced_tool_returns_monster_json() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let config = GameConfig::from_env().expect("Invalid DUNGEON_* settings");
    let provider = ClaudeProvider::from_env(&config).expect("Failed to create provider");
    let (hp, atk) = enemy_ranges(4);

    let raw = provider
        .generate(&Prompt::Enemy { room: 4, hp, atk })
        .await
        .expect("Claude should create a monster");
    println!("Monster JSON: {raw}");

    let blueprint = MonsterBlueprint::parse(&raw).expect("Tool input should be a monster");
    assert!(!blueprint.name.trim().is_empty());
}

// Blocking owns its own runtime, so these run as plain tests.

#[test]
#[ignore]
fn test_generator_with_blocking_provider() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let config = GameConfig::from_env().expect("Invalid DUNGEON_* settings");
    let claude = ClaudeProvider::from_env(&config).expect("Failed to create provider");
    let mut provider = Blocking::new(claude).expect("Failed to build runtime");
    let mut generator = EncounterGenerator::new(&config);

    let enemy = generator.enemy(&mut provider, 3);
    println!("Enemy: {} ({} HP, {} ATK)", enemy.name, enemy.hp, enemy.atk);
    let (hp, atk) = enemy_ranges(3);
    assert!(hp.contains(enemy.hp));
    assert!(atk.contains(enemy.atk));

    let boss = generator.boss(&mut provider, 10);
    println!("Boss: {} ({} HP, {} ATK)", boss.name, boss.hp, boss.atk);
    assert!(boss.is_boss);
    if boss == fallback_boss() {
        eprintln!("Warning: boss generation fell back");
    }
}

#[test]
#[ignore]
fn test_headless_run_with_claude() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let config = GameConfig::from_env().expect("Invalid DUNGEON_* settings");
    let claude = ClaudeProvider::from_env(&config).expect("Failed to create provider");
    let provider = Blocking::new(claude).expect("Failed to build runtime");
    let mut game = HeadlessGame::new(provider, config, 7);

    for _ in 0..5 {
        let action = game.suggest();
        let response = game.act(action);
        println!("> {action:?}");
        for line in &response.lines {
            println!("  {line}");
        }
    }
    println!("{}", game.status_line());
    assert!(game.room() > 1);
}
