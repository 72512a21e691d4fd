//! Application state and the session worker.
//!
//! The [`Session`] lives on its own thread because every room may block on
//! Claude. The UI talks to it through a pair of channels and renders the
//! latest [`WorldUpdate`] snapshot it sent back.

use bevy::prelude::*;
use dungeon_core::economy::ItemKind;
use dungeon_core::{
    Action, ClaudeProvider, ContentProvider, EffectKind, GameConfig, Mode, OfflineProvider,
    Session,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::runtime::OnRuntime;

/// The provider type the worker drives.
pub type WorkerProvider = Box<dyn ContentProvider + Send>;

/// Game phase state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, States)]
pub enum GamePhase {
    /// Title screen
    #[default]
    MainMenu,
    /// A run is in progress (including its game over screen)
    Playing,
}

/// Request sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Feed one input to the session.
    Action(Action),
    /// Stop the worker.
    Shutdown,
}

/// Response sent from the worker to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    /// The session finished its opening room.
    Started(WorldUpdate),
    /// An action was handled.
    Updated {
        world: WorldUpdate,
        /// Whether the session accepted the action in its current mode.
        accepted: bool,
    },
}

/// What the UI needs to know about the current enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyView {
    pub name: String,
    pub description: String,
    pub hp: i32,
    pub atk: i32,
    pub is_boss: bool,
    /// Special ability name and effect.
    pub special: Option<(String, EffectKind)>,
    pub effects: Vec<(EffectKind, u32)>,
}

/// World state snapshot for UI rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldUpdate {
    pub hp: i32,
    pub gold: i32,
    pub attack_bonus: i32,
    pub blocks: u32,
    /// Active effects on the player with turns left.
    pub effects: Vec<(EffectKind, u32)>,
    /// Inventory in menu order.
    pub inventory: Vec<(ItemKind, u32)>,
    pub room: u32,
    pub room_text: String,
    pub quest: String,
    /// The log lines that fit on screen.
    pub log: Vec<String>,
    pub mode: Mode,
    pub enemy: Option<EnemyView>,
    /// Rooms until the special attack is ready again; zero or less means ready.
    pub special_rooms_left: i64,
}

impl Default for WorldUpdate {
    fn default() -> Self {
        let config = GameConfig::default();
        Self {
            hp: config.starting_hp,
            gold: config.starting_gold,
            attack_bonus: 0,
            blocks: 0,
            effects: Vec::new(),
            inventory: Vec::new(),
            room: 1,
            room_text: String::new(),
            quest: String::new(),
            log: Vec::new(),
            mode: Mode::Exploring,
            enemy: None,
            special_rooms_left: 0,
        }
    }
}

impl WorldUpdate {
    /// Snapshot a session.
    pub fn from_session<P, R>(session: &Session<P, R>) -> Self {
        let player = session.player();
        Self {
            hp: player.hp,
            gold: player.gold,
            attack_bonus: player.attack_bonus,
            blocks: player.blocks,
            effects: player.status.iter().collect(),
            inventory: player.inventory.iter().collect(),
            room: session.room(),
            room_text: session.room_text().to_string(),
            quest: session.quest().to_string(),
            log: session.visible_log().to_vec(),
            mode: session.mode(),
            enemy: session.enemy().map(|enemy| EnemyView {
                name: enemy.name.clone(),
                description: enemy.description.clone(),
                hp: enemy.hp,
                atk: enemy.atk,
                is_boss: enemy.is_boss,
                special: enemy
                    .special
                    .as_ref()
                    .map(|special| (special.name.clone(), special.effect)),
                effects: enemy.status.iter().collect(),
            }),
            special_rooms_left: session.cooldown().rooms_remaining(session.room()),
        }
    }

    pub fn special_ready(&self) -> bool {
        self.special_rooms_left <= 0
    }
}

/// Currently open help or dialog on top of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveOverlay {
    #[default]
    None,
    Help,
}

/// Main application state resource.
#[derive(Resource)]
pub struct AppState {
    /// Settings every new run starts from.
    pub config: GameConfig,
    /// Current world state snapshot.
    pub world: WorldUpdate,
    /// Whether the worker is busy with an action.
    pub is_processing: bool,
    /// Status bar message.
    pub status_message: Option<String>,
    /// When the status message was set (for auto-clear).
    pub status_set_time: Option<f64>,
    /// Current overlay.
    pub overlay: ActiveOverlay,
    /// Request channel sender.
    pub request_tx: Option<mpsc::Sender<WorkerRequest>>,
    /// Response channel receiver.
    pub response_rx: Option<mpsc::Receiver<WorkerResponse>>,
    /// Error message to display.
    pub error_message: Option<String>,
    /// Who is writing the dungeon, shown on the title screen.
    pub narrator: String,
}

impl AppState {
    pub fn new(config: GameConfig) -> Self {
        let narrator = if ClaudeProvider::from_env(&config).is_ok() {
            format!("Narrated by {}", config.model.as_deref().unwrap_or("Claude"))
        } else {
            "Offline: set ANTHROPIC_API_KEY for generated rooms and monsters".to_string()
        };
        Self {
            config,
            world: WorldUpdate::default(),
            is_processing: false,
            status_message: None,
            status_set_time: None,
            overlay: ActiveOverlay::None,
            request_tx: None,
            response_rx: None,
            error_message: None,
            narrator,
        }
    }

    /// Set a status message (with timestamp for auto-clear).
    pub fn set_status(&mut self, message: impl Into<String>, current_time: f64) {
        self.status_message = Some(message.into());
        self.status_set_time = Some(current_time);
    }

    /// Set a status message without timestamp (won't auto-clear).
    pub fn set_status_persistent(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_time = None;
    }

    /// Clear status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_set_time = None;
    }

    /// Toggle an overlay.
    pub fn toggle_overlay(&mut self, overlay: ActiveOverlay) {
        if self.overlay == overlay {
            self.overlay = ActiveOverlay::None;
        } else {
            self.overlay = overlay;
        }
    }

    /// Start a fresh run on a new worker, stopping any previous one.
    pub fn start_session(&mut self) {
        self.shutdown();
        let (request_tx, response_rx) =
            spawn_worker(make_provider(&self.config), self.config.clone());
        self.request_tx = Some(request_tx);
        self.response_rx = Some(response_rx);
        self.world = WorldUpdate::default();
        self.is_processing = true;
        self.set_status_persistent("Entering the dungeon...");
    }

    /// Send an action to the worker. Ignored while one is in flight.
    pub fn send_action(&mut self, action: Action) {
        if self.is_processing {
            return;
        }
        if let Some(tx) = &self.request_tx {
            if tx.try_send(WorkerRequest::Action(action)).is_ok() {
                self.is_processing = true;
                if matches!(action, Action::Continue) {
                    self.set_status_persistent("Exploring...");
                }
            }
        }
    }

    /// Check if the game session is active.
    pub fn has_session(&self) -> bool {
        self.request_tx.is_some()
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.request_tx.take() {
            let _ = tx.try_send(WorkerRequest::Shutdown);
        }
        self.response_rx = None;
    }
}

/// Pick Claude when a key is configured, fixed content otherwise.
pub fn make_provider(config: &GameConfig) -> WorkerProvider {
    match ClaudeProvider::from_env(config) {
        Ok(claude) => Box::new(OnRuntime(claude)),
        Err(err) => {
            warn!("playing offline: {err}");
            Box::new(OfflineProvider)
        }
    }
}

/// System to clear old status messages after 3 seconds.
pub fn clear_old_status(mut app_state: ResMut<AppState>, time: Res<Time>) {
    if let Some(set_time) = app_state.status_set_time {
        let elapsed = time.elapsed_secs_f64() - set_time;
        if elapsed > 3.0 {
            app_state.clear_status();
        }
    }
}

/// System to handle responses from the worker.
pub fn handle_worker_responses(mut app_state: ResMut<AppState>, time: Res<Time>) {
    let response = match &mut app_state.response_rx {
        Some(rx) => rx.try_recv(),
        None => return,
    };

    match response {
        Ok(WorkerResponse::Started(world)) => {
            app_state.world = world;
            app_state.is_processing = false;
            app_state.set_status("Your journey begins", time.elapsed_secs_f64());
        }
        Ok(WorkerResponse::Updated { world, accepted }) => {
            let room_changed = world.room != app_state.world.room;
            app_state.world = world;
            app_state.is_processing = false;
            if room_changed {
                let room = app_state.world.room;
                app_state.set_status(format!("Room {room}"), time.elapsed_secs_f64());
            } else if !accepted {
                app_state.set_status("You can't do that right now", time.elapsed_secs_f64());
            } else {
                app_state.clear_status();
            }
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            error!("session worker disconnected");
            app_state.error_message = Some("The dungeon worker stopped unexpectedly.".into());
            app_state.is_processing = false;
            app_state.request_tx = None;
            app_state.response_rx = None;
        }
    }
}

/// Spawn the session worker and return channel endpoints.
pub fn spawn_worker(
    provider: WorkerProvider,
    config: GameConfig,
) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, request_rx) = mpsc::channel(8);
    let (response_tx, response_rx) = mpsc::channel(64);

    std::thread::spawn(move || worker_loop(provider, config, request_rx, response_tx));

    (request_tx, response_rx)
}

/// The worker loop. Runs until the UI hangs up or asks it to stop.
fn worker_loop(
    provider: WorkerProvider,
    config: GameConfig,
    mut request_rx: mpsc::Receiver<WorkerRequest>,
    response_tx: mpsc::Sender<WorkerResponse>,
) {
    let mut session = Session::new(provider, StdRng::from_entropy(), config);
    info!(room = session.room(), "session started");
    if response_tx
        .blocking_send(WorkerResponse::Started(WorldUpdate::from_session(&session)))
        .is_err()
    {
        return;
    }

    while let Some(request) = request_rx.blocking_recv() {
        match request {
            WorkerRequest::Action(action) => {
                let accepted = session.handle(action);
                debug!(?action, accepted, mode = ?session.mode(), "action handled");
                let world = WorldUpdate::from_session(&session);
                if response_tx
                    .blocking_send(WorkerResponse::Updated { world, accepted })
                    .is_err()
                {
                    break;
                }
            }
            WorkerRequest::Shutdown => break,
        }
    }
    info!("session worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::testing::{ScriptedProvider, TestHarness};
    use dungeon_core::Enemy;

    #[test]
    fn test_snapshot_copies_player_and_enemy() {
        let mut harness = TestHarness::new(11);
        harness.player_mut().status.apply(EffectKind::Burn);
        harness.fight(Enemy::new("Mire Toad", "Warty.", 30, 4));

        let world = WorldUpdate::from_session(&harness.session);
        assert_eq!(world.mode, Mode::Combat);
        assert_eq!(world.effects, vec![(EffectKind::Burn, 3)]);
        let enemy = world.enemy.as_ref().unwrap();
        assert_eq!(enemy.name, "Mire Toad");
        assert_eq!((enemy.hp, enemy.atk), (30, 4));
        assert!(!enemy.is_boss);
        assert!(world.special_ready());
    }

    #[test]
    fn test_snapshot_tracks_cooldown() {
        let mut harness = TestHarness::new(12);
        harness.fight(Enemy::new("Dummy", "Straw.", 1000, 1));
        harness.press(Action::Special);

        let world = WorldUpdate::from_session(&harness.session);
        assert!(!world.special_ready());
        assert_eq!(world.special_rooms_left, 4);
    }

    #[test]
    fn test_worker_round_trip() {
        let provider = ScriptedProvider::new()
            .then_text("A hall of mirrors.")
            .then_text("Escape the mirror maze.");
        let (tx, mut rx) = spawn_worker(Box::new(provider), GameConfig::default());

        let Some(WorkerResponse::Started(world)) = rx.blocking_recv() else {
            panic!("expected the opening snapshot");
        };
        assert_eq!(world.room, 1);
        assert_eq!(world.room_text, "A hall of mirrors.");
        assert_eq!(world.quest, "Escape the mirror maze.");

        tx.blocking_send(WorkerRequest::Action(Action::OpenShop)).unwrap();
        let Some(WorkerResponse::Updated { world, accepted }) = rx.blocking_recv() else {
            panic!("expected an update");
        };
        assert!(accepted);
        assert_eq!(world.mode, Mode::Shop);

        tx.blocking_send(WorkerRequest::Action(Action::Attack)).unwrap();
        let Some(WorkerResponse::Updated { accepted, .. }) = rx.blocking_recv() else {
            panic!("expected an update");
        };
        assert!(!accepted);

        tx.blocking_send(WorkerRequest::Shutdown).unwrap();
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn test_send_action_waits_for_worker() {
        let mut app_state = AppState::new(GameConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        app_state.request_tx = Some(tx);

        app_state.send_action(Action::Continue);
        app_state.send_action(Action::Attack);

        assert!(app_state.is_processing);
        assert!(matches!(
            rx.try_recv(),
            Ok(WorkerRequest::Action(Action::Continue))
        ));
        assert!(rx.try_recv().is_err());
    }
}
