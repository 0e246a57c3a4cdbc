//! The module contains the error the engine can throw.
//!
//! Variants fall in four groups, which the HTTP layer maps to distinct
//! statuses:
//!
//! - validation: [`InvalidAmount`], [`InvalidName`], [`InvalidKind`],
//!   [`CategoryMismatch`], [`EmptyPatch`], [`InvalidId`], [`InvalidFilter`]
//! - not found: [`KeyNotFound`] (also used when a row exists but belongs to
//!   someone else)
//! - conflict: [`Immutable`], [`ExistingKey`]
//! - storage: [`Database`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidKind`]: EngineError::InvalidKind
//!  [`CategoryMismatch`]: EngineError::CategoryMismatch
//!  [`EmptyPatch`]: EngineError::EmptyPatch
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidFilter`]: EngineError::InvalidFilter
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Immutable`]: EngineError::Immutable
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Category mismatch: {0}")]
    CategoryMismatch(String),
    #[error("Nothing to update: {0}")]
    EmptyPatch(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Immutable: {0}")]
    Immutable(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// True for errors caused by the caller's input rather than by state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidName(_)
                | Self::InvalidKind(_)
                | Self::CategoryMismatch(_)
                | Self::EmptyPatch(_)
                | Self::InvalidId(_)
                | Self::InvalidFilter(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::CategoryMismatch(a), Self::CategoryMismatch(b)) => a == b,
            (Self::EmptyPatch(a), Self::EmptyPatch(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidFilter(a), Self::InvalidFilter(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Immutable(a), Self::Immutable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
