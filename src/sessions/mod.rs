//! Session store for running games
//!
//! Engines are synchronous; every command takes the write lock for one
//! transition. Progress is saved after the lock is released; a failed save
//! leaves the session flagged so the next command retries it.

use crate::error::ArcadeError;
use crate::games::chore_adventure::ChoreView;
use crate::games::treasure_hunt::{HuntView, RoundOutcome};
use crate::games::{ChoreAdventure, HuntConfig, TreasureHunt};
use crate::models::GameKey;
use crate::progress::{PlayerProgress, ProgressStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A command sent by the browser
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    Key { key: String },
    Tick,
    Answer { index: usize },
    Start,
    Reset,
    OpenShop,
    CloseShop,
    Buy { item: String },
    NextLevel,
}

impl GameCommand {
    fn name(&self) -> &'static str {
        match self {
            GameCommand::Key { .. } => "key",
            GameCommand::Tick => "tick",
            GameCommand::Answer { .. } => "answer",
            GameCommand::Start => "start",
            GameCommand::Reset => "reset",
            GameCommand::OpenShop => "open_shop",
            GameCommand::CloseShop => "close_shop",
            GameCommand::Buy { .. } => "buy",
            GameCommand::NextLevel => "next_level",
        }
    }
}

pub enum GameSession {
    TreasureHunt {
        profile: Option<String>,
        game: TreasureHunt,
        recorded: bool,
    },
    ChoreAdventure {
        profile: String,
        game: ChoreAdventure,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum SessionView {
    TreasureHunt(HuntView),
    ChoreAdventure(ChoreView),
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandReply {
    pub event: serde_json::Value,
    pub view: SessionView,
}

impl GameSession {
    pub fn view(&self) -> SessionView {
        match self {
            GameSession::TreasureHunt { game, .. } => SessionView::TreasureHunt(game.view()),
            GameSession::ChoreAdventure { game, .. } => SessionView::ChoreAdventure(game.view()),
        }
    }

    /// Apply one command. Returns the event plus any progress to persist.
    fn apply(
        &mut self,
        command: &GameCommand,
    ) -> Result<(serde_json::Value, Option<(String, PendingSave)>)> {
        match self {
            GameSession::TreasureHunt { profile, game, recorded } => {
                let event = match command {
                    GameCommand::Key { key } => {
                        let key: GameKey = key.parse()?;
                        serde_json::to_value(game.handle_key(key))?
                    }
                    GameCommand::Tick => serde_json::to_value(game.tick())?,
                    GameCommand::Answer { index } => serde_json::to_value(game.answer(*index)?)?,
                    GameCommand::Start => serde_json::to_value(game.start())?,
                    GameCommand::Reset => {
                        game.reset();
                        *recorded = false;
                        serde_json::json!({ "outcome": "reset" })
                    }
                    other => return Err(ArcadeError::transition(game.phase(), other.name())),
                };

                let save = match profile {
                    Some(profile) if !*recorded && game.outcome() == RoundOutcome::Won => {
                        *recorded = true;
                        Some((profile.clone(), PendingSave::HuntWon))
                    }
                    _ => None,
                };
                Ok((event, save))
            }
            GameSession::ChoreAdventure { profile, game } => {
                let event = match command {
                    GameCommand::Key { key } => {
                        let key: GameKey = key.parse()?;
                        game.handle_key(key)
                    }
                    GameCommand::Start => game.start(),
                    GameCommand::OpenShop => game.open_shop()?,
                    GameCommand::CloseShop => game.close_shop()?,
                    GameCommand::Buy { item } => game.buy(item)?,
                    GameCommand::NextLevel => game.next_level()?,
                    other => return Err(ArcadeError::transition(game.phase(), other.name())),
                };

                let save = game
                    .take_dirty_progress()
                    .map(|p| (profile.clone(), PendingSave::Progress(p)));
                Ok((serde_json::to_value(event)?, save))
            }
        }
    }
}

enum PendingSave {
    Progress(PlayerProgress),
    HuntWon,
}

/// A session plus the last time a client touched it
struct SessionEntry {
    session: GameSession,
    touched: Instant,
}

impl SessionEntry {
    fn new(session: GameSession) -> Self {
        Self { session, touched: Instant::now() }
    }
}

/// In-memory registry of running sessions
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    progress: Arc<dyn ProgressStore>,
}

impl SessionStore {
    pub fn new(progress: Arc<dyn ProgressStore>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            progress,
        }
    }

    pub fn progress_store(&self) -> Arc<dyn ProgressStore> {
        self.progress.clone()
    }

    pub async fn create_treasure_hunt(
        &self,
        config: HuntConfig,
        seed: Option<u64>,
        profile: Option<String>,
    ) -> Result<(Uuid, SessionView)> {
        config.validate()?;
        if let Some(profile) = &profile {
            // Rejects malformed profile names before the round starts
            self.progress.load(profile).await?;
        }

        let seed = seed.unwrap_or_else(rand::random);
        let game = TreasureHunt::new(config, seed);
        let session = GameSession::TreasureHunt { profile, game, recorded: false };
        let view = session.view();
        let id = self.insert(session).await;
        info!(session_id = %id, seed, "Treasure hunt session created");
        Ok((id, view))
    }

    pub async fn create_chore_adventure(&self, profile: &str) -> Result<(Uuid, SessionView)> {
        let progress = self.progress.load(profile).await?;
        let session = GameSession::ChoreAdventure {
            profile: profile.to_string(),
            game: ChoreAdventure::new(progress),
        };
        let view = session.view();
        let id = self.insert(session).await;
        info!(session_id = %id, profile, "Chore adventure session created");
        Ok((id, view))
    }

    async fn insert(&self, session: GameSession) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, SessionEntry::new(session));
        id
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|entry| entry.session.view())
            .ok_or(ArcadeError::SessionNotFound(id))
    }

    pub async fn apply(&self, id: Uuid, command: GameCommand) -> Result<CommandReply> {
        let (event, view, save) = {
            let mut sessions = self.sessions.write().await;
            let entry = sessions.get_mut(&id).ok_or(ArcadeError::SessionNotFound(id))?;
            entry.touched = Instant::now();
            let (event, save) = entry.session.apply(&command)?;
            (event, entry.session.view(), save)
        };
        debug!(session_id = %id, command = command.name(), "Command applied");

        if let Some((profile, pending)) = save {
            if let Err(e) = self.persist(id, &profile, pending).await {
                warn!(session_id = %id, %profile, error = %e, "Progress save failed, will retry");
                self.mark_unsaved(id).await;
                return Err(e);
            }
        }

        Ok(CommandReply { event, view })
    }

    async fn persist(&self, id: Uuid, profile: &str, pending: PendingSave) -> Result<()> {
        let progress = match pending {
            PendingSave::Progress(progress) => progress,
            PendingSave::HuntWon => {
                let mut progress = self.progress.load(profile).await?;
                let sessions = self.sessions.read().await;
                match sessions.get(&id).map(|entry| &entry.session) {
                    Some(GameSession::TreasureHunt { game, .. })
                        if game.record_completion(&mut progress) =>
                    {
                        progress
                    }
                    // Reset or ended since the win
                    _ => return Ok(()),
                }
            }
        };
        self.progress.save(profile, &progress).await?;
        debug!(session_id = %id, profile, "Progress saved");
        Ok(())
    }

    /// Re-flag a session so the next command saves its progress again.
    async fn mark_unsaved(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id).map(|entry| &mut entry.session) {
            Some(GameSession::TreasureHunt { recorded, .. }) => *recorded = false,
            Some(GameSession::ChoreAdventure { game, .. }) => game.mark_unsaved(),
            None => {}
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session ended"))
            .ok_or(ArcadeError::SessionNotFound(id))
    }

    /// Drop sessions untouched for longer than `max_idle`. Returns how many went.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::catalog::GOAL_ITEMS;
    use crate::games::treasure_hunt::{Collectible, CollectibleKind, RoundSetup};
    use crate::games::WallLayout;
    use crate::models::Position;
    use crate::progress::InMemoryProgressStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(InMemoryProgressStore::new()))
    }

    /// In-memory store whose next `failures` saves return an IO error
    struct FlakyStore {
        inner: InMemoryProgressStore,
        failures: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: InMemoryProgressStore::new(),
                failures: AtomicUsize::new(0),
            })
        }

        fn fail_next_save(&self) {
            self.failures.store(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl ProgressStore for FlakyStore {
        async fn load(&self, profile: &str) -> Result<PlayerProgress> {
            self.inner.load(profile).await
        }

        async fn save(&self, profile: &str, progress: &PlayerProgress) -> Result<()> {
            let pending = self.failures.load(Ordering::SeqCst);
            if pending > 0 {
                self.failures.store(pending - 1, Ordering::SeqCst);
                return Err(ArcadeError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.save(profile, progress).await
        }
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: GameCommand = serde_json::from_str(r#"{"type":"key","key":"ArrowUp"}"#).unwrap();
        assert_eq!(cmd, GameCommand::Key { key: "ArrowUp".to_string() });

        let cmd: GameCommand = serde_json::from_str(r#"{"type":"next_level"}"#).unwrap();
        assert_eq!(cmd, GameCommand::NextLevel);

        let cmd: GameCommand = serde_json::from_str(r#"{"type":"answer","index":2}"#).unwrap();
        assert_eq!(cmd, GameCommand::Answer { index: 2 });
    }

    #[tokio::test]
    async fn test_treasure_hunt_session_lifecycle() {
        let store = store();
        let (id, view) = store
            .create_treasure_hunt(HuntConfig::default(), Some(7), None)
            .await
            .unwrap();
        assert!(matches!(view, SessionView::TreasureHunt(_)));
        assert_eq!(store.len().await, 1);

        let reply = store.apply(id, GameCommand::Tick).await.unwrap();
        assert_eq!(reply.event["outcome"], "counting");

        store.remove(id).await.unwrap();
        assert!(matches!(store.view(id).await, Err(ArcadeError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_wrong_game_command_is_rejected() {
        let store = store();
        let (id, _) = store
            .create_treasure_hunt(HuntConfig::default(), Some(1), None)
            .await
            .unwrap();

        let result = store.apply(id, GameCommand::OpenShop).await;
        assert!(matches!(result, Err(ArcadeError::InvalidTransition { .. })));

        let result = store
            .apply(id, GameCommand::Key { key: "Escape".to_string() })
            .await;
        assert!(matches!(result, Err(ArcadeError::UnknownKey(_))));
    }

    #[tokio::test]
    async fn test_chore_progress_is_saved() {
        let progress = Arc::new(InMemoryProgressStore::new());
        let mut saved = PlayerProgress::default();
        saved.chore_coins = 12;
        progress.save("sam", &saved).await.unwrap();

        let store = SessionStore::new(progress.clone());
        let (id, _) = store.create_chore_adventure("sam").await.unwrap();

        store.apply(id, GameCommand::Start).await.unwrap();
        store.apply(id, GameCommand::OpenShop).await.unwrap();
        let reply = store
            .apply(id, GameCommand::Buy { item: "hat".to_string() })
            .await
            .unwrap();
        assert_eq!(reply.event["outcome"], "bought");

        let reloaded = progress.load("sam").await.unwrap();
        assert_eq!(reloaded.chore_coins, 2);
        assert!(reloaded.owns("hat"));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.apply(id, GameCommand::Tick).await,
            Err(ArcadeError::SessionNotFound(_))
        ));
        assert!(store.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_hunt_config_is_rejected() {
        let store = store();

        let no_lives = HuntConfig { start_lives: 0, ..HuntConfig::default() };
        assert!(matches!(
            store.create_treasure_hunt(no_lives, Some(1), None).await,
            Err(ArcadeError::InvalidConfig(_))
        ));

        let walled = HuntConfig {
            wall_layout: WallLayout::Random { count: usize::MAX },
            ..HuntConfig::default()
        };
        assert!(matches!(
            store.create_treasure_hunt(walled, Some(1), None).await,
            Err(ArcadeError::InvalidConfig(_))
        ));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_chore_save_is_retried() {
        let progress = FlakyStore::new();
        let mut saved = PlayerProgress::default();
        saved.chore_coins = 12;
        progress.save("sam", &saved).await.unwrap();

        let store = SessionStore::new(progress.clone());
        let (id, _) = store.create_chore_adventure("sam").await.unwrap();
        store.apply(id, GameCommand::Start).await.unwrap();
        store.apply(id, GameCommand::OpenShop).await.unwrap();

        progress.fail_next_save();
        let result = store.apply(id, GameCommand::Buy { item: "hat".to_string() }).await;
        assert!(matches!(result, Err(ArcadeError::IoError(_))));
        assert_eq!(progress.load("sam").await.unwrap().chore_coins, 12);

        // Any later command flushes the pending purchase
        store.apply(id, GameCommand::CloseShop).await.unwrap();
        let reloaded = progress.load("sam").await.unwrap();
        assert_eq!(reloaded.chore_coins, 2);
        assert!(reloaded.owns("hat"));
    }

    #[tokio::test]
    async fn test_failed_hunt_completion_save_is_retried() {
        let progress = FlakyStore::new();
        let store = SessionStore::new(progress.clone());

        let setup = RoundSetup {
            target: GOAL_ITEMS[3],
            walls: Vec::new(),
            collectibles: vec![Collectible::new(
                0,
                Position::new(140.0, 500.0),
                20,
                CollectibleKind::Note,
            )],
        };
        let game = TreasureHunt::with_setup(HuntConfig::default(), 1, setup);
        let id = store
            .insert(GameSession::TreasureHunt {
                profile: Some("ana".to_string()),
                game,
                recorded: false,
            })
            .await;

        let reply = store
            .apply(id, GameCommand::Key { key: "ArrowRight".to_string() })
            .await
            .unwrap();
        assert_eq!(reply.event["outcome"], "challenge_opened");

        let SessionView::TreasureHunt(view) = store.view(id).await.unwrap() else {
            panic!("treasure hunt session expected");
        };
        let challenge = view.challenge.expect("challenge open");
        let index = challenge
            .options
            .iter()
            .position(|o| o.price <= challenge.value)
            .unwrap();

        progress.fail_next_save();
        assert!(store.apply(id, GameCommand::Answer { index }).await.is_err());
        assert_eq!(progress.load("ana").await.unwrap().kid_zone_completed, 0);

        store.apply(id, GameCommand::Tick).await.unwrap();
        assert_eq!(progress.load("ana").await.unwrap().kid_zone_completed, 1);
    }

    #[tokio::test]
    async fn test_sweep_evicts_idle_sessions() {
        let store = store();
        let (idle, _) = store.create_chore_adventure("a").await.unwrap();
        store.create_chore_adventure("b").await.unwrap();

        assert_eq!(store.sweep_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 2);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.sweep_idle(Duration::ZERO).await, 2);
        assert!(matches!(store.view(idle).await, Err(ArcadeError::SessionNotFound(_))));
    }
}
