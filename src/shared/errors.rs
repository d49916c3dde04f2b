use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn user_not_found(field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "User",
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::Storage(err.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = DomainError::user_not_found("username", "alice");
        assert_eq!(err.to_string(), "Not found: User with username=alice");
    }

    #[test]
    fn infra_errors_become_storage_errors() {
        let err: DomainError = InfraError::Crypto("bad salt".into()).into();
        assert!(matches!(err, DomainError::Storage(msg) if msg == "Crypto error: bad salt"));
    }
}
