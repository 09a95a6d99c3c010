use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlidecraftError>;

#[derive(Debug, Error)]
pub enum SlidecraftError {
    #[error("Incomplete idea {idea_id}: missing {}", missing.join(", "))]
    IncompleteIdea {
        idea_id: String,
        missing: Vec<String>,
    },

    #[error("Out-of-order enrichment of {field}: {reason}")]
    OutOfOrderEnrichment { field: String, reason: String },

    #[error("No template for type={template_type}, value_subtype={}", value_subtype.as_deref().unwrap_or("none"))]
    NoTemplateForType {
        template_type: String,
        value_subtype: Option<String>,
    },

    #[error("Validation gate failed in {phase}: {}", reasons.join("; "))]
    ValidationGate { phase: String, reasons: Vec<String> },

    #[error("Transient provider error: {0}")]
    TransientProvider(String),

    #[error("Timeout in {phase} after {seconds}s")]
    Timeout { phase: String, seconds: u64 },

    #[error("Cancelled before {phase}")]
    Cancelled { phase: String },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage operation error: {0}")]
    StorageOperation(#[from] redb::StorageError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl SlidecraftError {
    /// Gate failures, provider hiccups and timeouts are absorbed by the retry
    /// budget. Everything else aborts the post.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SlidecraftError::ValidationGate { .. }
                | SlidecraftError::TransientProvider(_)
                | SlidecraftError::Timeout { .. }
        )
    }

    /// Provider-side failures back off before the next attempt.
    pub fn needs_backoff(&self) -> bool {
        matches!(
            self,
            SlidecraftError::TransientProvider(_) | SlidecraftError::Timeout { .. }
        )
    }
}
