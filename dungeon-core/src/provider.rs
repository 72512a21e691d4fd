//! Text generation behind a small trait.
//!
//! The game only ever needs "give me text for this prompt, or tell me you
//! couldn't". Every caller has a fallback, so a provider is free to fail.

use crate::config::GameConfig;
use crate::economy::{PillOutcome, PillStat};
use crate::encounter::{MonsterBlueprint, StatRange};
use claude::{Claude, Request};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Token budget for structured monster requests; JSON needs more room than flavor text.
const STRUCTURED_MAX_TOKENS: usize = 400;

/// Something the game wants written.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Room,
    Quest,
    Enemy {
        room: u32,
        hp: StatRange,
        atk: StatRange,
    },
    Boss {
        room: u32,
        hp: StatRange,
        atk: StatRange,
    },
    BossAttack {
        name: String,
        damage: i32,
    },
    PillEffect {
        outcome: PillOutcome,
        stat: PillStat,
    },
    Death {
        room: u32,
    },
}

impl Prompt {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Prompt::Room => "room",
            Prompt::Quest => "quest",
            Prompt::Enemy { .. } => "enemy",
            Prompt::Boss { .. } => "boss",
            Prompt::BossAttack { .. } => "boss_attack",
            Prompt::PillEffect { .. } => "pill",
            Prompt::Death { .. } => "death",
        }
    }

    /// Whether the answer must be a single JSON monster object.
    pub fn wants_json(&self) -> bool {
        matches!(self, Prompt::Enemy { .. } | Prompt::Boss { .. })
    }

    pub fn text(&self) -> String {
        match self {
            Prompt::Room => {
                "Describe a new room in an endless fantasy dungeon in one or two vivid sentences."
                    .to_string()
            }
            Prompt::Quest => {
                "Give the adventurer a short fantasy quest objective in one sentence.".to_string()
            }
            Prompt::Enemy { room, hp, atk } => format!(
                "Create a unique fantasy enemy for room {room} of a dungeon crawler. \
                 Respond ONLY with a JSON object with the fields \"name\", \"description\", \
                 \"hp\" (between {hp}), \"atk\" (between {atk}) and optionally \"special\": \
                 {{\"name\", \"effect\" (\"burn\" or \"freeze\"), \"description\"}}. \
                 No other text."
            ),
            Prompt::Boss { room, hp, atk } => format!(
                "Create a fearsome fantasy boss guarding room {room} of a dungeon crawler. \
                 Respond ONLY with a JSON object with the fields \"name\", \"description\", \
                 \"hp\" (between {hp}), \"atk\" (between {atk}) and \"special\": \
                 {{\"name\", \"effect\" (\"burn\" or \"freeze\"), \"description\"}}. \
                 No other text."
            ),
            Prompt::BossAttack { name, damage } => format!(
                "In one or two dramatic sentences, describe the boss {name} striking the \
                 adventurer for {damage} damage."
            ),
            Prompt::PillEffect { outcome, stat } => {
                let mood = match outcome {
                    PillOutcome::Good => "good",
                    PillOutcome::Bad => "bad",
                };
                format!(
                    "The adventurer swallowed a mysterious pill that had a {mood} effect on \
                     their {}. Describe what they feel in one short sentence.",
                    stat.name()
                )
            }
            Prompt::Death { room } => format!(
                "Describe the adventurer's death in room {room} of an endless dungeon in one \
                 or two somber sentences."
            ),
        }
    }
}

/// Why a provider produced nothing usable.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no generator is available")]
    Unavailable,

    #[error("API error: {0}")]
    Api(#[from] claude::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response")]
    Empty,
}

/// A blocking source of generated text.
pub trait ContentProvider {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError>;
}

impl<P: ContentProvider + ?Sized> ContentProvider for &mut P {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

impl<P: ContentProvider + ?Sized> ContentProvider for Box<P> {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

/// An async source of generated text.
pub trait AsyncContentProvider {
    fn generate(
        &self,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Runs an [`AsyncContentProvider`] to completion on its own runtime.
///
/// Must not be used from inside another tokio runtime.
pub struct Blocking<P> {
    provider: P,
    runtime: tokio::runtime::Runtime,
}

impl<P: AsyncContentProvider> Blocking<P> {
    pub fn new(provider: P) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { provider, runtime })
    }
}

impl<P: AsyncContentProvider> ContentProvider for Blocking<P> {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, GenerationError> {
        self.runtime.block_on(self.provider.generate(prompt))
    }
}

/// Ask up to `attempts` times, returning the first non-empty answer.
pub fn ask<P: ContentProvider + ?Sized>(
    provider: &mut P,
    prompt: &Prompt,
    attempts: u32,
) -> Option<String> {
    let kind = prompt.kind();
    for attempt in 1..=attempts.max(1) {
        debug!(kind, attempt, "requesting generated text");
        match provider.generate(prompt) {
            Ok(text) if !text.trim().is_empty() => return Some(text.trim().to_string()),
            Ok(_) => warn!(kind, attempt, "generator returned empty text"),
            Err(err) => warn!(kind, attempt, error = %err, "generation failed"),
        }
    }
    None
}

/// Generates content with Claude.
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Claude,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl ClaudeProvider {
    pub fn new(client: Claude, config: &GameConfig) -> Self {
        let client = match &config.model {
            Some(model) => client.with_model(model.clone()),
            None => client,
        };
        Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build a provider from `ANTHROPIC_API_KEY`.
    pub fn from_env(config: &GameConfig) -> Result<Self, GenerationError> {
        Ok(Self::new(Claude::from_env()?, config))
    }

    pub fn client(&self) -> &Claude {
        &self.client
    }

    fn request(&self, prompt: &Prompt) -> Request {
        let mut request = Request::prompt(prompt.text()).with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if prompt.wants_json() {
            request = request
                .with_max_tokens(self.max_tokens.max(STRUCTURED_MAX_TOKENS))
                .forcing_tool(MonsterBlueprint::as_tool());
        }
        request
    }
}

impl AsyncContentProvider for ClaudeProvider {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let response = self.client.complete(self.request(prompt)).await?;

        if prompt.wants_json() {
            if let Some(input) = response.tool_input(MonsterBlueprint::tool_name()) {
                return Ok(input.to_string());
            }
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

/// A provider that never answers. Every request takes its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProvider;

impl ContentProvider for OfflineProvider {
    fn generate(&mut self, _prompt: &Prompt) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    struct Echo;

    impl AsyncContentProvider for Echo {
        async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
            tokio::task::yield_now().await;
            Ok(prompt.kind().to_string())
        }
    }

    #[test]
    fn test_ask_returns_first_success() {
        let mut provider = ScriptedProvider::new().then_fail().then_text("  A damp cellar.  ");
        let text = ask(&mut provider, &Prompt::Room, 2);
        assert_eq!(text.as_deref(), Some("A damp cellar."));
        assert_eq!(provider.prompts().len(), 2);
    }

    #[test]
    fn test_ask_gives_up_after_attempts() {
        let mut provider = ScriptedProvider::new()
            .then_text("")
            .then_fail()
            .then_text("too late");
        assert_eq!(ask(&mut provider, &Prompt::Quest, 2), None);
        assert_eq!(provider.prompts().len(), 2);
    }

    #[test]
    fn test_ask_tries_at_least_once() {
        let mut provider = ScriptedProvider::new().then_text("Slay the lich.");
        assert_eq!(
            ask(&mut provider, &Prompt::Quest, 0).as_deref(),
            Some("Slay the lich.")
        );
    }

    #[test]
    fn test_offline_always_fails() {
        let mut provider = OfflineProvider;
        assert!(matches!(
            provider.generate(&Prompt::Room),
            Err(GenerationError::Unavailable)
        ));
        assert_eq!(ask(&mut provider, &Prompt::Death { room: 3 }, 5), None);
    }

    #[test]
    fn test_blocking_adapter() {
        let mut provider = Blocking::new(Echo).unwrap();
        assert_eq!(provider.generate(&Prompt::Room).unwrap(), "room");
        assert_eq!(ask(&mut provider, &Prompt::Death { room: 1 }, 1).as_deref(), Some("death"));
    }

    #[test]
    fn test_structured_prompts_mention_ranges() {
        let prompt = Prompt::Enemy {
            room: 4,
            hp: StatRange::new(28, 46),
            atk: StatRange::new(7, 18),
        };
        let text = prompt.text();
        assert!(prompt.wants_json());
        assert!(text.contains("28 and 46"));
        assert!(text.contains("7 and 18"));
        assert!(text.contains("JSON"));
        assert!(!Prompt::Room.wants_json());
    }

    #[test]
    fn test_claude_request_forces_monster_tool() {
        let client = Claude::new("test-key").unwrap();
        let provider = ClaudeProvider::new(client, &GameConfig::default().with_model("test-model"));
        assert_eq!(provider.client().model(), "test-model");

        let request = provider.request(&Prompt::Boss {
            room: 10,
            hp: StatRange::new(130, 240),
            atk: StatRange::new(20, 30),
        });
        assert_eq!(request.max_tokens, STRUCTURED_MAX_TOKENS);
        assert_eq!(request.temperature, Some(0.8));
        let tools = request.tools.unwrap();
        assert_eq!(tools[0].name, "create_monster");

        let plain = provider.request(&Prompt::Room);
        assert_eq!(plain.max_tokens, 150);
        assert!(plain.tools.is_none());
    }
}
