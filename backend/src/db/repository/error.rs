//! Failures raised by research opportunity storage.
//!
//! The HTTP layer only separates [`RepositoryError::NotFound`] from the rest.
//! The Postgres backend also asks [`RepositoryError::is_retryable`] before
//! replaying an operation on a fresh connection.

use std::fmt;

use crate::api::OpportunityId;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a repository failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Repository or service operation, e.g. `get_research_opportunity`.
    pub operation: Option<&'static str>,
    /// Record the operation was working on.
    pub opportunity: Option<OpportunityId>,
    /// Fixture path, database error kind and the like.
    pub detail: Option<String>,
    /// Set for failures a retry on a new connection may clear.
    pub retryable: bool,
}

impl ErrorContext {
    /// True when there is nothing worth printing.
    pub fn is_empty(&self) -> bool {
        self.operation.is_none() && self.opportunity.is_none() && self.detail.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(op) = self.operation {
            write!(f, "in {}", op)?;
            sep = "; ";
        }
        if let Some(id) = self.opportunity {
            write!(f, "{}opportunity {}", sep, id)?;
            sep = "; ";
        }
        if let Some(detail) = &self.detail {
            write!(f, "{}{}", sep, detail)?;
        }
        Ok(())
    }
}

fn suffix(context: &ErrorContext) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({})", context)
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The database could not be reached or the pool had no connection.
    #[error("storage unavailable: {message}{}", suffix(.context))]
    Connection {
        message: String,
        context: ErrorContext,
    },

    /// The database rejected a statement.
    #[error("query failed: {message}{}", suffix(.context))]
    Query {
        message: String,
        context: ErrorContext,
    },

    /// No record has the requested id.
    #[error("{message}{}", suffix(.context))]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A record or fixture is malformed.
    #[error("invalid research opportunity data: {message}{}", suffix(.context))]
    Invalid {
        message: String,
        context: ErrorContext,
    },

    /// Backend selection or settings are unusable.
    #[error("repository misconfigured: {message}{}", suffix(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Anything else: migrations, worker panics, row encoding.
    #[error("internal repository failure: {message}{}", suffix(.context))]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    /// Unreachable database or exhausted pool. Always retryable.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            context: ErrorContext {
                retryable: true,
                ..ErrorContext::default()
            },
        }
    }

    /// No record stored under `id`.
    pub fn not_found(id: OpportunityId) -> Self {
        Self::NotFound {
            message: format!("research opportunity {} not found", id),
            context: ErrorContext {
                opportunity: Some(id),
                ..ErrorContext::default()
            },
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Record the operation that failed, replacing any earlier one.
    pub fn during(mut self, operation: &'static str) -> Self {
        self.context_mut().operation = Some(operation);
        self
    }

    /// Record the opportunity the operation was working on.
    pub fn for_opportunity(mut self, id: OpportunityId) -> Self {
        self.context_mut().opportunity = Some(id);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.context_mut().detail = Some(detail.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.context().retryable
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The bare message, without the context suffix.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Query { message, .. }
            | Self::NotFound { message, .. }
            | Self::Invalid { message, .. }
            | Self::Configuration { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Invalid { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Connection { context, .. }
            | Self::Query { context, .. }
            | Self::NotFound { context, .. }
            | Self::Invalid { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => Self::NotFound {
                message: "no matching research opportunity row".to_string(),
                context: ErrorContext::default(),
            },
            Error::DatabaseError(kind, info) => Self::Query {
                message: info.message().to_string(),
                context: ErrorContext {
                    detail: Some(format!("{:?}", kind)),
                    // the transaction lost a serialization race and can be replayed
                    retryable: matches!(kind, DatabaseErrorKind::SerializationFailure),
                    ..ErrorContext::default()
                },
            },
            Error::DeserializationError(e) | Error::SerializationError(e) => {
                Self::internal(format!("row encoding: {}", e))
            }
            other => Self::Query {
                message: other.to_string(),
                context: ErrorContext::default(),
            },
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::connection(err.to_string())
    }
}
