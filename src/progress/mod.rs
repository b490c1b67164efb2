//! Player progress persistence
//!
//! Progress is loaded once when a session starts and written back after every
//! mutating action. Two stores: in-memory for development, JSON files on disk.

use crate::error::ArcadeError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub const CHORE_ADVENTURE_KEY: &str = "choreAdventure";

/// Counters that outlive a single game session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProgress {
    #[serde(default)]
    pub chore_coins: u32,
    #[serde(default = "first_level")]
    pub chore_level: u32,
    /// Unlock keys of items bought in the chore shop
    #[serde(default)]
    pub chore_items: Vec<String>,
    #[serde(default)]
    pub kid_zone_completed: u32,
    /// Completion percentage per game, 0..=100
    #[serde(default)]
    pub kid_zone_progress: BTreeMap<String, u32>,
}

fn first_level() -> u32 {
    1
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            chore_coins: 0,
            chore_level: first_level(),
            chore_items: Vec::new(),
            kid_zone_completed: 0,
            kid_zone_progress: BTreeMap::new(),
        }
    }
}

impl PlayerProgress {
    pub fn owns(&self, unlock_key: &str) -> bool {
        self.chore_items.iter().any(|k| k == unlock_key)
    }

    /// Add `percent` to a game's progress, capped at 100.
    pub fn add_game_progress(&mut self, game: &str, percent: u32) -> u32 {
        let entry = self.kid_zone_progress.entry(game.to_string()).or_insert(0);
        *entry = (*entry + percent).min(100);
        *entry
    }

    /// Kid zone games completed is a high-water mark.
    pub fn mark_kid_zone_completed(&mut self, games: u32) {
        self.kid_zone_completed = self.kid_zone_completed.max(games);
    }
}

/// Trait for progress persistence
#[async_trait::async_trait]
pub trait ProgressStore: Send + Sync {
    /// Missing profiles load as [`PlayerProgress::default`].
    async fn load(&self, profile: &str) -> Result<PlayerProgress>;
    async fn save(&self, profile: &str, progress: &PlayerProgress) -> Result<()>;
}

/// In-memory progress store for development
pub struct InMemoryProgressStore {
    profiles: Arc<RwLock<HashMap<String, PlayerProgress>>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self, profile: &str) -> Result<PlayerProgress> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(profile).cloned().unwrap_or_default())
    }

    async fn save(&self, profile: &str, progress: &PlayerProgress) -> Result<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.to_string(), progress.clone());
        Ok(())
    }
}

/// One JSON file per profile under a directory
pub struct FileProgressStore {
    dir: PathBuf,
}

impl FileProgressStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, profile: &str) -> Result<PathBuf> {
        let valid = !profile.is_empty()
            && profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ArcadeError::ProgressError(format!(
                "invalid profile name: {:?}",
                profile
            )));
        }
        Ok(self.dir.join(format!("{}.json", profile)))
    }
}

#[async_trait::async_trait]
impl ProgressStore for FileProgressStore {
    async fn load(&self, profile: &str) -> Result<PlayerProgress> {
        let path = self.path_for(profile)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(profile, "No saved progress, starting fresh");
                Ok(PlayerProgress::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, profile: &str, progress: &PlayerProgress) -> Result<()> {
        let path = self.path_for(profile)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(progress)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(profile, path = %path.display(), "Progress saved");
        Ok(())
    }
}
