//! Error types for the financial literacy arcade

use thiserror::Error;

/// Result type alias for arcade operations
pub type Result<T> = std::result::Result<T, ArcadeError>;

#[derive(Error, Debug)]
pub enum ArcadeError {

    // =============================
    // Game Engine Errors
    // =============================

    #[error("Invalid action in phase {phase}: {action}")]
    InvalidTransition { phase: String, action: String },

    #[error("Invalid option: {0}")]
    InvalidOption(usize),

    #[error("Unknown shop item: {0}")]
    UnknownShopItem(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Invalid game config: {0}")]
    InvalidConfig(String),

    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    // =============================
    // Currency Errors
    // =============================

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Rate source error: {0}")]
    RateSource(String),

    #[error("No exchange rate available for {from} -> {to}")]
    RateUnavailable { from: String, to: String },

    // =============================
    // Launcher Errors
    // =============================

    #[error("Unknown game")]
    UnknownGame(String),

    #[error("Failed to install {0}")]
    InstallFailed(String),

    #[error("Error installing {0}")]
    InstallError(String),

    #[error("Failed to launch game: {0}")]
    SpawnFailed(String),

    // =============================
    // Persistence / Config
    // =============================

    #[error("Progress store error: {0}")]
    ProgressError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("UUID parse error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ArcadeError {
    pub(crate) fn transition(phase: impl std::fmt::Debug, action: &str) -> Self {
        ArcadeError::InvalidTransition {
            phase: format!("{:?}", phase),
            action: action.to_string(),
        }
    }
}
