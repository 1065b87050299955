//! Error types for aule-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuleError {
    /// The building is missing from the campus catalog (coordinates or opening hours).
    #[error("Unknown building: {0}")]
    UnknownBuilding(String),

    #[error("Invalid lesson in {building}/{room}: {reason}")]
    InvalidLesson {
        building: String,
        room: String,
        reason: String,
    },

    #[error("Room registry error: {0}")]
    Registry(String),

    #[error("Lesson source error: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuleError>;
