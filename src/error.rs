//! Error types for the entity tree

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EntityError>;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("Entity not found: {0}")]
    EntityNotFound(usize),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Cannot rename field, '{0}' already exists")]
    NameCollision(String),

    #[error("Empty value rejected")]
    EmptyValue,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Column {0} is not editable")]
    ColumnNotEditable(usize),

    #[error("Entity store is borrowed elsewhere")]
    StoreBusy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid entity lump: {0}")]
    InvalidFormat(String),

    #[error("Cannot encode field '{key}' of entity {entity}: {reason}")]
    Unencodable {
        entity: usize,
        key: String,
        reason: &'static str,
    },
}

impl EntityError {
    /// Stable error code for callers that surface refusals
    pub fn code(&self) -> &'static str {
        match self {
            EntityError::EntityNotFound(_) => "ENTITY_NOT_FOUND",
            EntityError::FieldNotFound(_) => "FIELD_NOT_FOUND",
            EntityError::NameCollision(_) => "NAME_COLLISION",
            EntityError::EmptyValue => "EMPTY_VALUE",
            EntityError::InvalidAddress(_) => "INVALID_ADDRESS",
            EntityError::ColumnNotEditable(_) => "COLUMN_NOT_EDITABLE",
            EntityError::StoreBusy => "STORE_BUSY",
            EntityError::InvalidFormat(_) => "INVALID_FORMAT",
            EntityError::Unencodable { .. } => "UNENCODABLE",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Whether a presentation layer should show this refusal to the user.
    ///
    /// Lookup misses and stale addresses are steady-state conditions and stay
    /// silent; collisions and empty input are actionable.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, EntityError::NameCollision(_) | EntityError::EmptyValue)
    }
}
