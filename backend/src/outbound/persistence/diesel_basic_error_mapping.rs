//! Shared Diesel error mapping for the greeting repository.

use std::error::Error as StdError;

use tracing::error;

use crate::domain::ports::GreetingRepositoryError;

/// Classify a Diesel failure for the log line.
pub(crate) fn diesel_error_kind(error: &diesel::result::Error) -> &'static str {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::NotFound => "record not found",
        DieselError::QueryBuilderError(_) => "database query error",
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            "database connection error"
        }
        DieselError::DeserializationError(_) => "row decode error",
        _ => "database error",
    }
}

/// Wrap `cause` into a database error carrying `message`, logging the cause
/// at `error` level. The cause never reaches clients.
pub(crate) fn database_failure<C>(message: &'static str, kind: &'static str, cause: C) -> GreetingRepositoryError
where
    C: StdError + Send + Sync + 'static,
{
    error!(error_kind = kind, cause = %cause, "{message}");
    GreetingRepositoryError::database(message).with_cause(cause)
}

/// Map a Diesel failure into a database error carrying `message`.
pub(crate) fn map_diesel_error(
    message: &'static str,
) -> impl FnOnce(diesel::result::Error) -> GreetingRepositoryError {
    move |err| database_failure(message, diesel_error_kind(&err), err)
}
