//! Desktop game launcher
//!
//! Validates a game id against the allow-list, runs the dependency install
//! step, then spawns the game detached. One install per request; nothing is
//! queued or retried.

use crate::config::LauncherConfig;
use crate::error::ArcadeError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info};

pub const TREASURE_COIN_HUNT: &str = "treasure_coin_hunt";

/// A program plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// An allow-listed game and how to install and start it
#[derive(Debug, Clone)]
pub struct GameSpec {
    pub id: &'static str,
    pub dependency: &'static str,
    pub install: CommandSpec,
    pub launch: CommandSpec,
}

/// Trait for running external processes
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and report whether it exited with status 0.
    async fn run(&self, cmd: &CommandSpec) -> Result<bool>;

    /// Start without waiting; the process outlives the request.
    fn spawn_detached(&self, cmd: &CommandSpec) -> Result<()>;
}

pub struct TokioProcessRunner;

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, cmd: &CommandSpec) -> Result<bool> {
        let status = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?
            .status;
        Ok(status.success())
    }

    fn spawn_detached(&self, cmd: &CommandSpec) -> Result<()> {
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        #[cfg(unix)]
        command.process_group(0);

        // Dropping the handle leaves the child running
        let child = command
            .spawn()
            .map_err(|e| ArcadeError::SpawnFailed(e.to_string()))?;
        info!(pid = ?child.id(), program = %cmd.program, "Game process spawned");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    pub game: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchResponse {
    pub success: bool,
    pub message: String,
}

pub struct GameLauncher {
    games: Vec<GameSpec>,
    runner: Arc<dyn ProcessRunner>,
}

impl GameLauncher {
    pub fn new(games: Vec<GameSpec>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { games, runner }
    }

    pub fn allowed_games(&self) -> Vec<&'static str> {
        self.games.iter().map(|g| g.id).collect()
    }

    /// Install the game's dependency, then start it detached.
    pub async fn launch(&self, game_id: &str) -> Result<LaunchResponse> {
        let spec = self
            .games
            .iter()
            .find(|g| g.id == game_id)
            .ok_or_else(|| ArcadeError::UnknownGame(game_id.to_string()))?;

        info!(game = spec.id, dependency = spec.dependency, "Installing game dependency");
        let installed = self.runner.run(&spec.install).await.map_err(|e| {
            error!(game = spec.id, error = %e, "Install step could not run");
            ArcadeError::InstallError(spec.dependency.to_string())
        })?;
        if !installed {
            error!(game = spec.id, "Install step exited with failure");
            return Err(ArcadeError::InstallFailed(spec.dependency.to_string()));
        }

        info!(game = spec.id, "Dependency installed, launching game");
        self.runner.spawn_detached(&spec.launch)?;

        Ok(LaunchResponse {
            success: true,
            message: "Game launched successfully!".to_string(),
        })
    }
}

/// The allow-list: only the treasure coin hunt desktop game.
pub fn default_games(config: &LauncherConfig) -> Vec<GameSpec> {
    let script = config
        .games_dir
        .join("Treasure_Coin_Hunt.py")
        .to_string_lossy()
        .into_owned();
    vec![GameSpec {
        id: TREASURE_COIN_HUNT,
        dependency: "pygame",
        install: CommandSpec::new(config.pip.clone(), &["install", "pygame"]),
        launch: CommandSpec::new(config.python.clone(), &[script.as_str()]),
    }]
}

pub fn create_default_launcher(config: &LauncherConfig) -> GameLauncher {
    GameLauncher::new(default_games(config), Arc::new(TokioProcessRunner))
}
